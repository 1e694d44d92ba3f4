use serde_json::Value;

use super::error::CommandError;
use crate::{graph::SharedGraph, transport::Transport};

/// A small, stateless, one-shot control message: no uuid, no lifecycle.
/// Executed against the shared graph immediately on receipt, then discarded.
pub trait ReplicatedCommand: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn owner(&self) -> &str;

    fn payload(&self) -> &Value;

    /// Mutate the shared graph. Synchronous and atomic from the caller's
    /// point of view: no partial application.
    fn execute(&self, graph: &SharedGraph) -> Result<(), CommandError>;

    /// Send as a single 3-part message: owner, type name, payload.
    /// Commands are assumed small; there is no chunking here.
    fn push(&self, transport: &dyn Transport) -> Result<(), CommandError> {
        let payload = rmp_serde::to_vec(self.payload()).map_err(|e| CommandError::EncodeFailed {
            reason: e.to_string(),
        })?;
        transport.send_multipart(
            None,
            vec![
                self.owner().as_bytes().to_vec(),
                self.type_name().as_bytes().to_vec(),
                payload,
            ],
        )?;
        Ok(())
    }
}

/// Registration contract for a command type: a stable wire name and a
/// constructor from wire parts.
pub trait CommandKind: ReplicatedCommand + Sized + 'static {
    const TYPE_NAME: &'static str;

    fn from_parts(owner: String, payload: Value) -> Self;
}
