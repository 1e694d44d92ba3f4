use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use uuid::Uuid;

use crate::entity::Datablock;

/// The uuid-keyed map of all known datablocks on an endpoint, shared between
/// a network-receive loop and a local authoring loop. Clones share the same
/// underlying map.
///
/// Dangling dependency uuids are tolerated while delivery is out of order;
/// they are never dereferenced, and a delete scrubs them everywhere.
#[derive(Clone, Default)]
pub struct SharedGraph {
    inner: Arc<Mutex<HashMap<Uuid, Datablock>>>,
}

impl SharedGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_map(&self) -> MutexGuard<'_, HashMap<Uuid, Datablock>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Idempotent upsert. An existing entry keeps its identity and
    /// implementation-specific fields; only the snapshot payload, state and
    /// dependencies are overwritten (last-store-wins).
    pub fn store(&self, block: Datablock) {
        let mut map = self.lock_map();
        match map.entry(block.uuid()) {
            std::collections::hash_map::Entry::Occupied(mut entry) => {
                entry.get_mut().absorb(block);
            }
            std::collections::hash_map::Entry::Vacant(entry) => {
                entry.insert(block);
            }
        }
    }

    /// Remove a datablock and scrub its uuid out of every other datablock's
    /// dependency list.
    pub fn remove(&self, uuid: &Uuid) -> Option<Datablock> {
        let mut map = self.lock_map();
        let removed = map.remove(uuid);
        if removed.is_some() {
            for block in map.values_mut() {
                block.remove_dependency(uuid);
            }
        }
        removed
    }

    /// Run a closure against one datablock while holding the graph lock.
    pub fn with_block<R>(&self, uuid: &Uuid, f: impl FnOnce(&mut Datablock) -> R) -> Option<R> {
        let mut map = self.lock_map();
        map.get_mut(uuid).map(f)
    }

    /// Clone of a stored datablock.
    pub fn get(&self, uuid: &Uuid) -> Option<Datablock> {
        self.lock_map().get(uuid).cloned()
    }

    pub fn set_owner(&self, uuid: &Uuid, owner: &str) -> bool {
        self.with_block(uuid, |block| block.set_owner(owner))
            .is_some()
    }

    pub fn contains(&self, uuid: &Uuid) -> bool {
        self.lock_map().contains_key(uuid)
    }

    pub fn uuids(&self) -> Vec<Uuid> {
        self.lock_map().keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.lock_map().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_map().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use uuid::Uuid;

    use super::*;
    use crate::entity::{DatablockKind, DatablockState, EntityError};
    use crate::types::LiveObject;

    struct MarkerKind;

    impl DatablockKind for MarkerKind {
        fn type_name(&self) -> &'static str {
            "Marker"
        }

        fn matches(&self, live: &LiveObject) -> bool {
            live.downcast_ref::<u32>().is_some()
        }

        fn dump(&self, live: &LiveObject) -> Result<serde_json::Value, EntityError> {
            let value = live
                .downcast_ref::<u32>()
                .ok_or(EntityError::LiveTypeMismatch { type_name: "Marker" })?;
            Ok(json!(value))
        }
    }

    fn block_with_data(owner: &str, data: serde_json::Value) -> Datablock {
        Datablock::from_data(owner, data, Arc::new(MarkerKind))
    }

    #[test]
    fn store_twice_preserves_identity_and_fields() {
        let graph = SharedGraph::new();
        let block = block_with_data("alice", json!({"n": 1}));
        let uuid = block.uuid();
        block.store(&graph);

        let copy = graph.get(&uuid).expect("stored");
        copy.store(&graph);

        assert_eq!(graph.len(), 1);
        let after = graph.get(&uuid).expect("still stored");
        assert_eq!(after.uuid(), uuid);
        assert_eq!(after.owner(), "alice");
        assert_eq!(after.state(), DatablockState::Committed);
        assert_eq!(after.data(), Some(&json!({"n": 1})));
        assert!(after.dependencies().is_empty());
    }

    #[test]
    fn restore_overwrites_data_state_and_dependencies_only() {
        let graph = SharedGraph::new();
        let block = block_with_data("alice", json!({"n": 1}));
        let uuid = block.uuid();
        block.store(&graph);

        let mut incoming = graph.get(&uuid).expect("stored");
        incoming.set_owner("mallory");
        incoming.add_dependency(Uuid::new_v4());
        let dep = incoming.dependencies()[0];
        incoming.store(&graph);

        let after = graph.get(&uuid).expect("still stored");
        // owner is identity, first-store-wins
        assert_eq!(after.owner(), "alice");
        assert_eq!(after.dependencies(), &[dep]);
    }

    #[test]
    fn remove_scrubs_dependents() {
        let graph = SharedGraph::new();
        let b = block_with_data("alice", json!({"n": 2}));
        let b_uuid = b.uuid();
        let mut a = block_with_data("alice", json!({"n": 1}));
        a.add_dependency(b_uuid);
        let a_uuid = a.uuid();
        a.store(&graph);
        b.store(&graph);

        assert!(graph.remove(&b_uuid).is_some());
        assert!(!graph.contains(&b_uuid));
        let a_after = graph.get(&a_uuid).expect("dependent survives");
        assert!(a_after.dependencies().is_empty());
    }

    #[test]
    fn remove_missing_uuid_is_noop() {
        let graph = SharedGraph::new();
        block_with_data("alice", json!(1)).store(&graph);
        assert!(graph.remove(&Uuid::new_v4()).is_none());
        assert_eq!(graph.len(), 1);
    }
}
