mod channel;
pub mod error;

pub use channel::ChannelTransport;
pub use error::TransportError;

/// A message-oriented socket in the router/dealer mold: ordered, reliable,
/// message-framed delivery per logical exchange.
///
/// Every `recv_multipart` surfaces the sending peer's identity as the leading
/// frame, the way a router socket does. Chunk frames travel as single-frame
/// messages read back with `recv`. `recv` and `recv_multipart` block until a
/// message arrives; there is no timeout or cancellation, so a fetch whose
/// peer never sends will block its loop indefinitely.
pub trait Transport: Send {
    /// This endpoint's transport-level identity.
    fn identity(&self) -> &[u8];

    /// Send a single-frame message. `recipient` routes on a multi-peer
    /// transport; `None` uses the default route.
    fn send(&self, recipient: Option<&[u8]>, payload: &[u8]) -> Result<(), TransportError>;

    /// Send one multipart message.
    fn send_multipart(
        &self,
        recipient: Option<&[u8]>,
        frames: Vec<Vec<u8>>,
    ) -> Result<(), TransportError>;

    /// Block until a single-frame message arrives and return its payload.
    fn recv(&mut self) -> Result<Vec<u8>, TransportError>;

    /// Block until a message arrives; the first frame is the sender identity.
    fn recv_multipart(&mut self) -> Result<Vec<Vec<u8>>, TransportError>;

    /// Non-blocking poll used by receive loops draining pending messages.
    fn try_recv_multipart(&mut self) -> Result<Option<Vec<Vec<u8>>>, TransportError>;
}
