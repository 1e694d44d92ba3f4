use thiserror::Error;
use uuid::Uuid;

use crate::transport::TransportError;

/// Errors that can occur on the command channel
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The command payload does not carry the fields the command needs
    #[error("Malformed command payload: {reason}")]
    MalformedPayload { reason: String },

    /// The command names a datablock that is not in the graph
    #[error("Command targets unknown datablock {uuid}")]
    TargetMissing { uuid: Uuid },

    /// The payload could not be encoded for transmission
    #[error("Failed to encode command payload: {reason}")]
    EncodeFailed { reason: String },

    /// Transport failure on the command channel
    #[error("Transport failure on the command channel: {0}")]
    Transport(#[from] TransportError),
}
