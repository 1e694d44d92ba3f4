mod builtin;
mod command;
pub mod error;

use log::{error, warn};
use serde_json::Value;

pub use builtin::{
    AuthCommand, ClientsStateCommand, ConfigCommand, DeleteCommand, DisconnectCommand,
    KickCommand, RightCommand, ServerSnapshotCommand, SnapshotCommand, UserMetadataCommand,
};
pub use command::{CommandKind, ReplicatedCommand};
pub use error::CommandError;

use crate::{constants::COMMAND_FRAME_PARTS, registry::CommandKinds, transport::Transport};

/// A command received on the server side, with the transport identity of
/// the peer that sent it.
pub struct FetchedCommand {
    pub sender: Vec<u8>,
    pub command: Box<dyn ReplicatedCommand>,
}

/// Receive one command (client side). The sender identity the transport
/// prepends is discarded.
///
/// Malformation is non-fatal to the channel: a bad message logs an error
/// and yields `None` so the receive loop can continue.
pub fn fetch_command(
    transport: &mut dyn Transport,
    kinds: &CommandKinds,
) -> Result<Option<Box<dyn ReplicatedCommand>>, CommandError> {
    let frames = transport.recv_multipart()?;
    Ok(decode_frames(frames, kinds).map(|fetched| fetched.command))
}

/// Receive one command (server side), capturing the sender identity.
/// Same non-fatal malformation contract as [`fetch_command`].
pub fn server_fetch_command(
    transport: &mut dyn Transport,
    kinds: &CommandKinds,
) -> Result<Option<FetchedCommand>, CommandError> {
    let frames = transport.recv_multipart()?;
    Ok(decode_frames(frames, kinds))
}

fn decode_frames(frames: Vec<Vec<u8>>, kinds: &CommandKinds) -> Option<FetchedCommand> {
    if frames.len() != COMMAND_FRAME_PARTS {
        error!(
            "discarding malformed command frame: expected {COMMAND_FRAME_PARTS} parts, received {}",
            frames.len()
        );
        return None;
    }
    let mut frames = frames.into_iter();
    let sender = frames.next().unwrap_or_default();
    let owner = match String::from_utf8(frames.next().unwrap_or_default()) {
        Ok(owner) => owner,
        Err(e) => {
            error!("discarding command with non-utf8 owner: {e}");
            return None;
        }
    };
    let type_name = match String::from_utf8(frames.next().unwrap_or_default()) {
        Ok(name) => name,
        Err(e) => {
            error!("discarding command with non-utf8 type name: {e}");
            return None;
        }
    };
    let payload: Value = match rmp_serde::from_slice(&frames.next().unwrap_or_default()) {
        Ok(payload) => payload,
        Err(e) => {
            error!("discarding command '{type_name}' with undecodable payload: {e}");
            return None;
        }
    };
    match kinds.command_from_name(&type_name, owner, payload) {
        Ok(command) => Some(FetchedCommand { sender, command }),
        Err(e) => {
            warn!("{e}");
            None
        }
    }
}
