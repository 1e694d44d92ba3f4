use std::{fmt, sync::Arc};

use log::{debug, error, warn};
use serde_json::Value;
use uuid::Uuid;

use super::{error::EntityError, kind::DatablockKind, state::DatablockState};
use crate::{
    chunk,
    constants::ENTITY_METADATA_PARTS,
    registry::DatablockKinds,
    transport::{Transport, TransportError},
    types::{DiffMethod, LiveHandle, LiveRef},
};

/// The replicated unit of state: mirrors one live application object,
/// identified by a uuid that is assigned exactly once at construction.
#[derive(Clone)]
pub struct Datablock {
    uuid: Uuid,
    owner: String,
    type_name: String,
    live: Option<LiveHandle>,
    data: Option<Value>,
    buffer: Option<Vec<u8>>,
    dependencies: Vec<Uuid>,
    state: DatablockState,
    sender: Option<Vec<u8>>,
    kind: Option<Arc<dyn DatablockKind>>,
}

impl Datablock {
    /// Author a datablock for a live object. Starts at `Added`.
    pub fn from_live(owner: &str, live: &LiveRef, kind: Arc<dyn DatablockKind>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            owner: owner.to_string(),
            type_name: kind.type_name().to_string(),
            live: Some(Arc::downgrade(live)),
            data: None,
            buffer: None,
            dependencies: Vec::new(),
            state: DatablockState::Added,
            sender: None,
            kind: Some(kind),
        }
    }

    /// Construct from pre-dumped snapshot data. Starts at `Committed`.
    pub fn from_data(owner: &str, data: Value, kind: Arc<dyn DatablockKind>) -> Self {
        let dependencies = kind.dependencies(&data);
        Self {
            uuid: Uuid::new_v4(),
            owner: owner.to_string(),
            type_name: kind.type_name().to_string(),
            live: None,
            data: Some(data),
            buffer: None,
            dependencies,
            state: DatablockState::Committed,
            sender: None,
            kind: Some(kind),
        }
    }

    /// Construct from wire bytes with a resolved implementation.
    ///
    /// Decode failure does not raise: the datablock is returned in state
    /// `Error` and the caller inspects the state afterward.
    pub fn from_typed_bytes(
        uuid: Uuid,
        owner: String,
        bytes: Vec<u8>,
        dependencies: Vec<Uuid>,
        sender: Option<Vec<u8>>,
        kind: Arc<dyn DatablockKind>,
    ) -> Self {
        let (data, state) = match decode_snapshot(&bytes) {
            Ok(value) => (Some(value), DatablockState::Fetched),
            Err(e) => {
                error!("datablock {uuid}: {e}");
                (None, DatablockState::Error)
            }
        };
        Self {
            uuid,
            owner,
            type_name: kind.type_name().to_string(),
            live: None,
            data,
            buffer: Some(bytes),
            dependencies,
            state,
            sender,
            kind: Some(kind),
        }
    }

    /// Construct a relay datablock from wire bytes, kept undecoded. A relay
    /// only stores and re-pushes; it never needs to understand the payload.
    pub fn from_relay_bytes(
        uuid: Uuid,
        owner: String,
        type_name: String,
        bytes: Vec<u8>,
        dependencies: Vec<Uuid>,
        sender: Option<Vec<u8>>,
    ) -> Self {
        Self {
            uuid,
            owner,
            type_name,
            live: None,
            data: None,
            buffer: Some(bytes),
            dependencies,
            state: DatablockState::Up,
            sender,
            kind: None,
        }
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn set_owner(&mut self, owner: &str) {
        self.owner = owner.to_string();
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn state(&self) -> DatablockState {
        self.state
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    pub fn dependencies(&self) -> &[Uuid] {
        &self.dependencies
    }

    /// Transport identity of the peer this datablock arrived from.
    pub fn sender(&self) -> Option<&[u8]> {
        self.sender.as_deref()
    }

    pub fn kind(&self) -> Option<&Arc<dyn DatablockKind>> {
        self.kind.as_ref()
    }

    /// Idempotent append: a uuid already listed is not added again.
    pub fn add_dependency(&mut self, uuid: Uuid) {
        if !self.dependencies.contains(&uuid) {
            self.dependencies.push(uuid);
        }
    }

    pub(crate) fn remove_dependency(&mut self, uuid: &Uuid) {
        self.dependencies.retain(|dep| dep != uuid);
    }

    /// Overwrite policy for a repeated `store` of the same uuid: snapshot
    /// payload, state and dependencies are last-store-wins, everything else
    /// keeps the existing entry's values.
    pub(crate) fn absorb(&mut self, incoming: Datablock) {
        self.data = incoming.data;
        self.buffer = incoming.buffer;
        self.state = incoming.state;
        self.dependencies = incoming.dependencies;
    }

    /// Upsert into the shared graph under this datablock's uuid.
    pub fn store(self, graph: &crate::graph::SharedGraph) {
        graph.store(self);
    }

    fn upgrade_live(&self) -> Option<LiveRef> {
        self.live.as_ref().and_then(LiveHandle::upgrade)
    }

    fn reacquire_live(&mut self, kind: &Arc<dyn DatablockKind>) -> Option<LiveRef> {
        if let Some(live) = self.upgrade_live() {
            return Some(live);
        }
        let live = kind.resolve(&self.uuid)?;
        self.live = Some(Arc::downgrade(&live));
        Some(live)
    }

    /// Snapshot the live object. No-op unless the state allows a commit.
    ///
    /// A dead live handle triggers one `resolve()` attempt; if that fails
    /// the commit no-ops with the state unchanged, to be retried on the
    /// next pass. Any other dump failure parks the datablock at `Error`.
    pub fn try_commit(&mut self) -> Result<(), EntityError> {
        if !self.state.can_commit() {
            return Ok(());
        }
        let kind = self.kind.clone().ok_or(EntityError::KindMissing {
            uuid: self.uuid,
        })?;
        let live = self
            .reacquire_live(&kind)
            .ok_or(EntityError::ReferenceLost { uuid: self.uuid })?;
        let dumped = match live.read() {
            Ok(guard) => kind.dump(&*guard),
            Err(_) => Err(EntityError::LivePoisoned),
        };
        match dumped {
            Ok(value) => {
                for dep in kind.dependencies(&value) {
                    self.add_dependency(dep);
                }
                self.data = Some(value);
                self.buffer = None;
                self.state = DatablockState::Committed;
                Ok(())
            }
            Err(e) => {
                self.state = DatablockState::Error;
                Err(e)
            }
        }
    }

    /// Logging variant of [`try_commit`](Self::try_commit): a single bad
    /// datablock must never raise out of a batch commit loop.
    pub fn commit(&mut self) {
        match self.try_commit() {
            Ok(()) => {}
            Err(EntityError::ReferenceLost { uuid }) => {
                warn!("datablock {uuid}: live reference lost, commit deferred");
            }
            Err(e) => error!("datablock {}: commit failed: {e}", self.uuid),
        }
    }

    /// Recompute a dump of the live object and compare it to the stored
    /// snapshot. Returns true and moves to `Modified` iff they differ;
    /// otherwise the state is left untouched. A detected change refreshes
    /// the stored snapshot, so each drift is reported exactly once.
    ///
    /// This is the sole dirtiness mechanism: it is polled by the owning
    /// process, never triggered by mutation.
    pub fn try_diff(&mut self, method: DiffMethod) -> Result<bool, EntityError> {
        let kind = self.kind.clone().ok_or(EntityError::KindMissing {
            uuid: self.uuid,
        })?;
        let live = self
            .upgrade_live()
            .ok_or(EntityError::ReferenceLost { uuid: self.uuid })?;
        let fresh = {
            let guard = live.read().map_err(|_| EntityError::LivePoisoned)?;
            kind.dump(&*guard)?
        };
        let changed = match method {
            DiffMethod::Structural => self.data.as_ref() != Some(&fresh),
            DiffMethod::Binary => {
                let fresh_bytes = encode_snapshot(&fresh)?;
                match &self.buffer {
                    Some(buffer) => *buffer != fresh_bytes,
                    None => match &self.data {
                        Some(data) => encode_snapshot(data)? != fresh_bytes,
                        None => true,
                    },
                }
            }
        };
        if changed {
            self.data = Some(fresh);
            self.buffer = None;
            self.state = DatablockState::Modified;
        }
        Ok(changed)
    }

    /// Logging variant of [`try_diff`](Self::try_diff); reports no change
    /// when the comparison itself is impossible.
    pub fn diff(&mut self, method: DiffMethod) -> bool {
        match self.try_diff(method) {
            Ok(changed) => changed,
            Err(e) => {
                warn!("datablock {}: diff skipped: {e}", self.uuid);
                false
            }
        }
    }

    /// Stream the committed snapshot to the peer: one metadata message,
    /// then exactly `chunk_count` chunk frames. Moves to `Up` once the
    /// full sequence is sent.
    pub fn try_push(
        &mut self,
        transport: &dyn Transport,
        recipient: Option<&[u8]>,
        chunk_size: usize,
    ) -> Result<(), EntityError> {
        if !self.state.can_push() {
            return Err(EntityError::WrongState {
                uuid: self.uuid,
                operation: "push",
                state: self.state,
            });
        }
        if self.buffer.is_none() {
            let data = self.data.as_ref().ok_or(EntityError::DataMissing {
                uuid: self.uuid,
            })?;
            self.buffer = Some(encode_snapshot(data)?);
        }
        let payload = self.buffer.as_deref().unwrap_or_default();
        let chunks = chunk::split(payload, chunk_size);

        let deps: Vec<String> = self.dependencies.iter().map(Uuid::to_string).collect();
        let metadata = vec![
            self.uuid.to_string().into_bytes(),
            self.owner.clone().into_bytes(),
            self.type_name.clone().into_bytes(),
            encode_field(&(chunks.len() as u64))?,
            encode_field(&deps)?,
        ];
        transport.send_multipart(recipient, metadata)?;
        for chunk in &chunks {
            transport.send(recipient, chunk)?;
        }
        self.state = DatablockState::Up;
        Ok(())
    }

    /// Logging variant of [`try_push`](Self::try_push). Pushing an
    /// uncommitted datablock is a caller bug: it logs and sends nothing.
    pub fn push(&mut self, transport: &dyn Transport, chunk_size: usize) {
        if let Err(e) = self.try_push(transport, None, chunk_size) {
            error!("datablock {}: push refused: {e}", self.uuid);
        }
    }

    /// Receive one datablock off the transport: a 6-part metadata message
    /// followed by exactly `chunk_count` chunk frames.
    ///
    /// Without a registry this builds a relay datablock holding the bytes
    /// undecoded. With a registry it resolves the named implementation and
    /// builds a typed datablock, which may itself land at `Error` on decode
    /// failure.
    pub fn fetch(
        transport: &mut dyn Transport,
        kinds: Option<&DatablockKinds>,
    ) -> Result<Self, EntityError> {
        let frames = transport.recv_multipart()?;
        Self::fetch_frames(frames, transport, kinds)
    }

    /// Reconstruct from an already-received metadata message, reading the
    /// chunk frames off the transport. Used by receive loops that poll.
    pub fn fetch_frames(
        frames: Vec<Vec<u8>>,
        transport: &mut dyn Transport,
        kinds: Option<&DatablockKinds>,
    ) -> Result<Self, EntityError> {
        if frames.len() != ENTITY_METADATA_PARTS {
            return Err(TransportError::MalformedFrame {
                expected: ENTITY_METADATA_PARTS,
                actual: frames.len(),
            }
            .into());
        }
        let mut frames = frames.into_iter();
        let sender = frames.next().unwrap_or_default();
        let uuid = parse_uuid(&frames.next().unwrap_or_default())?;
        let owner = parse_text(&frames.next().unwrap_or_default())?;
        let type_name = parse_text(&frames.next().unwrap_or_default())?;
        let chunk_count: u64 = decode_field(&frames.next().unwrap_or_default())?;
        let dep_names: Vec<String> = decode_field(&frames.next().unwrap_or_default())?;
        let dependencies = dep_names
            .iter()
            .map(|name| parse_uuid(name.as_bytes()))
            .collect::<Result<Vec<_>, _>>()?;

        let bytes = chunk::read_chunks(transport, chunk_count as usize)?;

        let kind = match kinds {
            None => None,
            Some(kinds) => match kinds.kind_from_name(&type_name) {
                Ok(kind) => Some(kind.clone()),
                Err(e) => {
                    // configuration gap, not a protocol error: keep the
                    // bytes undecoded rather than poisoning the message
                    warn!("datablock {uuid}: {e}");
                    None
                }
            },
        };
        match kind {
            Some(kind) => Ok(Self::from_typed_bytes(
                uuid,
                owner,
                bytes,
                dependencies,
                Some(sender),
                kind,
            )),
            None => Ok(Self::from_relay_bytes(
                uuid,
                owner,
                type_name,
                bytes,
                dependencies,
                Some(sender),
            )),
        }
    }

    /// Write the snapshot into the live object, resolving one first if the
    /// handle is dead or was never set. Moves to `Up` on success.
    ///
    /// `ReparentNeeded` from the kind is an ordering signal, not an error:
    /// the datablock parks at `Reparent` for a later pass, after its
    /// dependencies have been applied.
    pub fn try_apply(&mut self) -> Result<(), EntityError> {
        if !self.state.can_apply() {
            return Err(EntityError::WrongState {
                uuid: self.uuid,
                operation: "apply",
                state: self.state,
            });
        }
        let kind = self.kind.clone().ok_or(EntityError::KindMissing {
            uuid: self.uuid,
        })?;
        let live = self
            .reacquire_live(&kind)
            .ok_or(EntityError::ReferenceLost { uuid: self.uuid })?;
        let data = self.data.as_ref().ok_or(EntityError::DataMissing {
            uuid: self.uuid,
        })?;
        let loaded = {
            let mut guard = live.write().map_err(|_| EntityError::LivePoisoned)?;
            kind.load(data, &mut *guard)
        };
        match loaded {
            Ok(()) => {
                self.state = DatablockState::Up;
                Ok(())
            }
            Err(EntityError::ReparentNeeded) => {
                self.state = DatablockState::Reparent;
                Err(EntityError::ReparentNeeded)
            }
            // soft failure: state untouched, stale until the next attempt
            Err(e) => Err(e),
        }
    }

    /// Logging variant of [`try_apply`](Self::try_apply).
    pub fn apply(&mut self) {
        match self.try_apply() {
            Ok(()) => {}
            Err(EntityError::ReparentNeeded) => {
                debug!("datablock {}: apply deferred for reparenting", self.uuid);
            }
            Err(e) => error!("datablock {}: apply failed: {e}", self.uuid),
        }
    }
}

impl fmt::Debug for Datablock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Datablock")
            .field("uuid", &self.uuid)
            .field("owner", &self.owner)
            .field("type_name", &self.type_name)
            .field("state", &self.state)
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

fn encode_snapshot(data: &Value) -> Result<Vec<u8>, EntityError> {
    rmp_serde::to_vec(data).map_err(|e| EntityError::EncodeFailed {
        reason: e.to_string(),
    })
}

fn decode_snapshot(bytes: &[u8]) -> Result<Value, EntityError> {
    rmp_serde::from_slice(bytes).map_err(|e| EntityError::DecodeFailed {
        reason: e.to_string(),
    })
}

fn encode_field<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, EntityError> {
    rmp_serde::to_vec(value).map_err(|e| EntityError::EncodeFailed {
        reason: e.to_string(),
    })
}

fn decode_field<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, EntityError> {
    rmp_serde::from_slice(bytes).map_err(|e| EntityError::DecodeFailed {
        reason: e.to_string(),
    })
}

fn parse_text(bytes: &[u8]) -> Result<String, EntityError> {
    String::from_utf8(bytes.to_vec()).map_err(|e| EntityError::DecodeFailed {
        reason: e.to_string(),
    })
}

fn parse_uuid(bytes: &[u8]) -> Result<Uuid, EntityError> {
    let text = parse_text(bytes)?;
    Uuid::parse_str(&text).map_err(|e| EntityError::DecodeFailed {
        reason: e.to_string(),
    })
}
