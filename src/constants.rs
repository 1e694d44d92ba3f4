/// Maximum number of payload bytes carried by a single chunk frame.
///
/// Large enough that realistic payloads travel as a single chunk; the framing
/// still supports the general multi-chunk case for anything bigger.
pub const DEFAULT_CHUNK_SIZE: usize = 2_500_000_000;

/// Part count of a datablock metadata message as seen by the receiver:
/// sender identity (prepended by the transport), uuid, owner, type name,
/// chunk count, dependencies.
pub const ENTITY_METADATA_PARTS: usize = 6;

/// Part count of a command message as seen by the receiver: sender identity
/// (prepended by the transport), owner, type name, payload.
pub const COMMAND_FRAME_PARTS: usize = 4;
