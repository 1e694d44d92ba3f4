use thiserror::Error;

/// Errors that can occur on the message transport
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The peer end of the channel is gone
    #[error("Failed to send message: peer disconnected")]
    SendFailed,

    /// The peer end of the channel is gone
    #[error("Failed to receive message: peer disconnected")]
    RecvFailed,

    /// A metadata message arrived with the wrong number of parts.
    /// Fatal for that single message; the caller decides whether to
    /// abort or skip to the next one
    #[error("Malformed frame: expected {expected} parts, received {actual}")]
    MalformedFrame { expected: usize, actual: usize },

    /// A chunk read expected a single-frame message
    #[error("Expected a single-frame chunk message, received {actual} frames")]
    UnexpectedMultipart { actual: usize },
}
