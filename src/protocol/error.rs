use thiserror::Error;

/// Errors that can occur while building a Protocol
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// The protocol was already locked and can no longer be modified
    #[error("Protocol already locked")]
    AlreadyLocked,

    /// Chunk size must be at least one byte
    #[error("Invalid chunk size {size}: must be non-zero")]
    InvalidChunkSize { size: usize },
}
