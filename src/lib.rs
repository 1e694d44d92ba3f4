//! # Datablock
//! Replicated datablock transport & synchronization protocol.
//!
//! A datablock mirrors one live application object: `commit()` snapshots the
//! object, `push()` streams the encoded snapshot in chunks to a peer,
//! `fetch()` reassembles and reconstructs it, `apply()` writes it back into a
//! local live object. A parallel command channel carries small one-shot
//! control messages that mutate the shared uuid-keyed graph directly.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod chunk;
mod commands;
mod constants;
mod endpoint;
mod entity;
mod graph;
mod protocol;
mod registry;
mod transport;
mod types;

pub use chunk::{chunk_count, read_chunks, reassemble, split};
pub use commands::{
    fetch_command, server_fetch_command, AuthCommand, ClientsStateCommand, CommandError,
    CommandKind, ConfigCommand, DeleteCommand, DisconnectCommand, FetchedCommand, KickCommand,
    ReplicatedCommand, RightCommand, ServerSnapshotCommand, SnapshotCommand, UserMetadataCommand,
};
pub use constants::{COMMAND_FRAME_PARTS, DEFAULT_CHUNK_SIZE, ENTITY_METADATA_PARTS};
pub use endpoint::{BatchReport, ReplicationEndpoint};
pub use entity::{Datablock, DatablockKind, DatablockState, EntityError};
pub use graph::SharedGraph;
pub use protocol::{Protocol, ProtocolError};
pub use registry::{CommandKinds, DatablockKinds, KindSettings, RegistryError};
pub use transport::{ChannelTransport, Transport, TransportError};
pub use types::{live_ref, DiffMethod, LiveHandle, LiveObject, LiveRef};
