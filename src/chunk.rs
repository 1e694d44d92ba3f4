//! Chunked payload codec: splits arbitrarily large byte payloads into
//! bounded-size frames and reassembles them on the far side.
//!
//! There are no per-chunk sequence numbers. Reassembly is correct only
//! because the transport is a single ordered stream per logical message;
//! a transport without that guarantee cannot carry this framing.

use crate::transport::{Transport, TransportError};

/// Number of chunk frames needed for a payload: `ceil(len / chunk_size)`.
/// An empty payload produces zero chunks. `chunk_size` must be non-zero
/// (enforced by the `Protocol` builder).
pub fn chunk_count(payload_len: usize, chunk_size: usize) -> usize {
    debug_assert!(chunk_size > 0);
    payload_len.div_ceil(chunk_size)
}

/// Split a payload into `chunk_count` frames of at most `chunk_size` bytes.
/// The last chunk may be shorter.
pub fn split(payload: &[u8], chunk_size: usize) -> Vec<Vec<u8>> {
    debug_assert!(chunk_size > 0);
    payload.chunks(chunk_size).map(<[u8]>::to_vec).collect()
}

/// Concatenate chunks in arrival order back into the original payload.
pub fn reassemble(chunks: Vec<Vec<u8>>) -> Vec<u8> {
    chunks.concat()
}

/// Read exactly `count` chunk frames off the transport and concatenate them.
pub fn read_chunks(transport: &mut dyn Transport, count: usize) -> Result<Vec<u8>, TransportError> {
    let mut payload = Vec::new();
    for _ in 0..count {
        payload.extend_from_slice(&transport.recv()?);
    }
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(payload: &[u8], chunk_size: usize) {
        let chunks = split(payload, chunk_size);
        assert_eq!(chunks.len(), chunk_count(payload.len(), chunk_size));
        for chunk in &chunks {
            assert!(chunk.len() <= chunk_size);
        }
        assert_eq!(reassemble(chunks), payload.to_vec());
    }

    #[test]
    fn empty_payload_produces_no_chunks() {
        assert_eq!(chunk_count(0, 16), 0);
        round_trip(&[], 16);
    }

    #[test]
    fn payload_smaller_than_chunk() {
        assert_eq!(chunk_count(5, 16), 1);
        round_trip(&[1, 2, 3, 4, 5], 16);
    }

    #[test]
    fn payload_equal_to_chunk() {
        let payload: Vec<u8> = (0..16).collect();
        assert_eq!(chunk_count(payload.len(), 16), 1);
        round_trip(&payload, 16);
    }

    #[test]
    fn payload_one_byte_over_chunk() {
        let payload: Vec<u8> = (0..17).collect();
        assert_eq!(chunk_count(payload.len(), 16), 2);
        let chunks = split(&payload, 16);
        assert_eq!(chunks[1].len(), 1);
        round_trip(&payload, 16);
    }

    #[test]
    fn payload_much_larger_than_chunk() {
        let payload: Vec<u8> = (0..10_000u32).map(|n| (n % 251) as u8).collect();
        assert_eq!(chunk_count(payload.len(), 16), 625);
        round_trip(&payload, 16);
    }
}
