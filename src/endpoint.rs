use log::debug;
use uuid::Uuid;

use crate::{
    entity::{Datablock, DatablockState, EntityError},
    graph::SharedGraph,
    protocol::Protocol,
    registry::DatablockKinds,
    transport::Transport,
    types::DiffMethod,
};

/// Bulk outcome of one batch pass. A single failing datablock never aborts
/// a batch; its error lands here instead, keyed by uuid (nil when the
/// failure happened before a uuid could be read off the wire).
#[derive(Debug, Default)]
pub struct BatchReport {
    pub pushed: usize,
    pub fetched: usize,
    pub applied: usize,
    /// Datablocks still parked at `Reparent` after the retry pass
    pub deferred: Vec<Uuid>,
    pub errors: Vec<(Uuid, EntityError)>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Drives the per-datablock operations over a shared graph and a transport:
/// "for each dirty datablock: diff, commit, push" on the owning side,
/// "while messages pending: fetch, store" then "apply, retry reparents" on
/// the receiving side. All calls are blocking and cooperative; the only
/// concurrency primitive involved is the graph's lock.
pub struct ReplicationEndpoint {
    identity: String,
    graph: SharedGraph,
    chunk_size: usize,
    diff_method: DiffMethod,
}

impl ReplicationEndpoint {
    pub fn new(identity: &str, protocol: &Protocol) -> Self {
        Self::with_graph(identity, protocol, SharedGraph::new())
    }

    pub fn with_graph(identity: &str, protocol: &Protocol, graph: SharedGraph) -> Self {
        Self {
            identity: identity.to_string(),
            graph,
            chunk_size: protocol.chunk_size,
            diff_method: protocol.diff_method,
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn graph(&self) -> &SharedGraph {
        &self.graph
    }

    /// One owner-side pass: every datablock owned by this endpoint is
    /// diffed, committed and pushed as needed. Only the owner of a
    /// datablock may commit or push it.
    pub fn sync_owned(&self, transport: &dyn Transport) -> BatchReport {
        let mut report = BatchReport::default();
        for uuid in self.graph.uuids() {
            let outcome = self.graph.with_block(&uuid, |block| {
                if block.owner() != self.identity {
                    return Ok(false);
                }
                match block.state() {
                    DatablockState::Up => {
                        if !block.try_diff(self.diff_method)? {
                            return Ok(false);
                        }
                    }
                    // Committed is already snapshot-current; commit no-ops
                    // and it goes straight to push
                    DatablockState::Added
                    | DatablockState::Modified
                    | DatablockState::Committed => {}
                    _ => return Ok(false),
                }
                block.try_commit()?;
                block.try_push(transport, None, self.chunk_size)?;
                Ok(true)
            });
            match outcome {
                Some(Ok(true)) => report.pushed += 1,
                Some(Ok(false)) | None => {}
                Some(Err(e)) => report.errors.push((uuid, e)),
            }
        }
        report
    }

    /// Drain pending datablock messages off the transport into the graph.
    /// With a registry this is the typed client path; without one it is the
    /// relay path, storing bytes undecoded.
    pub fn receive_pending(
        &self,
        transport: &mut dyn Transport,
        kinds: Option<&DatablockKinds>,
    ) -> BatchReport {
        let mut report = BatchReport::default();
        loop {
            let frames = match transport.try_recv_multipart() {
                Ok(Some(frames)) => frames,
                Ok(None) => break,
                Err(e) => {
                    report.errors.push((Uuid::nil(), e.into()));
                    break;
                }
            };
            match Datablock::fetch_frames(frames, transport, kinds) {
                Ok(block) => {
                    report.fetched += 1;
                    block.store(&self.graph);
                }
                // fatal for that one message; skip to the next
                Err(e) => report.errors.push((Uuid::nil(), e)),
            }
        }
        report
    }

    /// Apply every fetched datablock to its live object. Datablocks that
    /// signal a reparent are retried once after the rest of the batch, so
    /// their dependencies get a chance to land first.
    pub fn apply_ready(&self) -> BatchReport {
        let mut report = BatchReport::default();
        let mut retry = Vec::new();
        for uuid in self.graph.uuids() {
            let outcome = self.graph.with_block(&uuid, |block| match block.state() {
                DatablockState::Fetched => Some(block.try_apply()),
                DatablockState::Reparent => {
                    retry.push(block.uuid());
                    None
                }
                _ => None,
            });
            match outcome.flatten() {
                Some(Ok(())) => report.applied += 1,
                Some(Err(EntityError::ReparentNeeded)) => retry.push(uuid),
                Some(Err(e)) => report.errors.push((uuid, e)),
                None => {}
            }
        }
        for uuid in retry {
            debug!("datablock {uuid}: reparent retry");
            let outcome = self
                .graph
                .with_block(&uuid, |block| block.try_apply());
            match outcome {
                Some(Ok(())) => report.applied += 1,
                Some(Err(EntityError::ReparentNeeded)) => report.deferred.push(uuid),
                Some(Err(e)) => report.errors.push((uuid, e)),
                None => {}
            }
        }
        report
    }
}
