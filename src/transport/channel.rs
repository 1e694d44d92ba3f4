use smol::{
    channel,
    channel::{Receiver, Sender, TryRecvError},
};

use super::{error::TransportError, Transport};

type Message = (Vec<u8>, Vec<Vec<u8>>);

/// In-process transport pair built on unbounded channels. Each end stamps
/// outgoing messages with its own identity, so the receiving end sees the
/// peer identity as the leading frame of every multipart receive.
pub struct ChannelTransport {
    identity: Vec<u8>,
    to_peer: Sender<Message>,
    from_peer: Receiver<Message>,
}

impl ChannelTransport {
    pub fn pair(left_identity: &str, right_identity: &str) -> (Self, Self) {
        let (left_sender, right_receiver) = channel::unbounded();
        let (right_sender, left_receiver) = channel::unbounded();
        (
            Self {
                identity: left_identity.as_bytes().to_vec(),
                to_peer: left_sender,
                from_peer: left_receiver,
            },
            Self {
                identity: right_identity.as_bytes().to_vec(),
                to_peer: right_sender,
                from_peer: right_receiver,
            },
        )
    }
}

impl Transport for ChannelTransport {
    fn identity(&self) -> &[u8] {
        &self.identity
    }

    // a pair has exactly one route, so `recipient` does not select anything
    fn send(&self, _recipient: Option<&[u8]>, payload: &[u8]) -> Result<(), TransportError> {
        self.to_peer
            .send_blocking((self.identity.clone(), vec![payload.to_vec()]))
            .map_err(|_| TransportError::SendFailed)
    }

    fn send_multipart(
        &self,
        _recipient: Option<&[u8]>,
        frames: Vec<Vec<u8>>,
    ) -> Result<(), TransportError> {
        self.to_peer
            .send_blocking((self.identity.clone(), frames))
            .map_err(|_| TransportError::SendFailed)
    }

    fn recv(&mut self) -> Result<Vec<u8>, TransportError> {
        let (_sender, mut frames) = self
            .from_peer
            .recv_blocking()
            .map_err(|_| TransportError::RecvFailed)?;
        if frames.len() != 1 {
            return Err(TransportError::UnexpectedMultipart {
                actual: frames.len(),
            });
        }
        Ok(frames.pop().unwrap_or_default())
    }

    fn recv_multipart(&mut self) -> Result<Vec<Vec<u8>>, TransportError> {
        let (sender, frames) = self
            .from_peer
            .recv_blocking()
            .map_err(|_| TransportError::RecvFailed)?;
        let mut parts = Vec::with_capacity(frames.len() + 1);
        parts.push(sender);
        parts.extend(frames);
        Ok(parts)
    }

    fn try_recv_multipart(&mut self) -> Result<Option<Vec<Vec<u8>>>, TransportError> {
        match self.from_peer.try_recv() {
            Ok((sender, frames)) => {
                let mut parts = Vec::with_capacity(frames.len() + 1);
                parts.push(sender);
                parts.extend(frames);
                Ok(Some(parts))
            }
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Closed) => Err(TransportError::RecvFailed),
        }
    }
}
