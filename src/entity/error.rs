use thiserror::Error;
use uuid::Uuid;

use super::state::DatablockState;
use crate::transport::TransportError;

/// Errors that can occur during datablock operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntityError {
    /// Operation refused because the datablock is in the wrong lifecycle
    /// state. A caller bug, not a retryable condition
    #[error("Datablock {uuid} refused `{operation}` in state {state:?}")]
    WrongState {
        uuid: Uuid,
        operation: &'static str,
        state: DatablockState,
    },

    /// The live object behind the datablock is gone and the kind's
    /// `resolve()` hook could not reacquire it. Retried on the next pass
    #[error("Live object for datablock {uuid} is gone and could not be resolved")]
    ReferenceLost { uuid: Uuid },

    /// The datablock has no snapshot to operate on
    #[error("Datablock {uuid} has no snapshot data")]
    DataMissing { uuid: Uuid },

    /// The datablock carries no implementation (relay datablocks never do)
    #[error("Datablock {uuid} has no registered implementation attached")]
    KindMissing { uuid: Uuid },

    /// The live object's runtime type does not match the kind
    #[error("Live object has an unexpected runtime type for kind '{type_name}'")]
    LiveTypeMismatch { type_name: &'static str },

    /// A kind with no load strategy is a configuration error, not a
    /// runtime condition
    #[error("Datablock kind '{type_name}' does not implement `load`")]
    LoadNotImplemented { type_name: &'static str },

    /// Loading the snapshot into the live object failed
    #[error("Failed to load snapshot into live object: {reason}")]
    LoadFailed { reason: String },

    /// Dumping the live object into a snapshot failed
    #[error("Failed to dump live object: {reason}")]
    DumpFailed { reason: String },

    /// Received bytes do not decode as a snapshot. Recorded as state
    /// `Error` on construction, never raised out of it
    #[error("Failed to decode datablock payload: {reason}")]
    DecodeFailed { reason: String },

    /// The snapshot could not be encoded for transmission
    #[error("Failed to encode datablock snapshot: {reason}")]
    EncodeFailed { reason: String },

    /// Control-flow signal, not a failure: dependencies are not yet
    /// satisfied, the apply is deferred for a later pass
    #[error("Datablock dependencies are not yet satisfied; apply deferred")]
    ReparentNeeded,

    /// The lock guarding the live object is poisoned
    #[error("Lock on the live object is poisoned")]
    LivePoisoned,

    /// Transport failure while exchanging the datablock
    #[error("Transport failure during datablock exchange: {0}")]
    Transport(#[from] TransportError),
}
