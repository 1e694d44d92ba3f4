use serde_json::{json, Value};
use uuid::Uuid;

use super::{
    command::{CommandKind, ReplicatedCommand},
    error::CommandError,
};
use crate::graph::SharedGraph;

fn parse_target(payload: &Value, field: &str) -> Result<Uuid, CommandError> {
    let text = payload
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| CommandError::MalformedPayload {
            reason: format!("missing '{field}' field"),
        })?;
    Uuid::parse_str(text).map_err(|e| CommandError::MalformedPayload {
        reason: e.to_string(),
    })
}

/// Removes the named datablock from the graph and scrubs its uuid out of
/// every other datablock's dependency list.
pub struct DeleteCommand {
    owner: String,
    payload: Value,
}

impl DeleteCommand {
    pub fn for_uuid(owner: &str, uuid: Uuid) -> Self {
        Self {
            owner: owner.to_string(),
            payload: json!({ "uuid": uuid.to_string() }),
        }
    }
}

impl ReplicatedCommand for DeleteCommand {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn owner(&self) -> &str {
        &self.owner
    }

    fn payload(&self) -> &Value {
        &self.payload
    }

    fn execute(&self, graph: &SharedGraph) -> Result<(), CommandError> {
        let uuid = parse_target(&self.payload, "uuid")?;
        graph
            .remove(&uuid)
            .map(|_| ())
            .ok_or(CommandError::TargetMissing { uuid })
    }
}

impl CommandKind for DeleteCommand {
    const TYPE_NAME: &'static str = "DeleteCommand";

    fn from_parts(owner: String, payload: Value) -> Self {
        Self { owner, payload }
    }
}

/// Transfers write authority: updates only the `owner` field of the named
/// datablock. The sanctioned way to move ownership between peers.
pub struct RightCommand {
    owner: String,
    payload: Value,
}

impl RightCommand {
    pub fn transfer(owner: &str, uuid: Uuid, new_owner: &str) -> Self {
        Self {
            owner: owner.to_string(),
            payload: json!({ "uuid": uuid.to_string(), "owner": new_owner }),
        }
    }
}

impl ReplicatedCommand for RightCommand {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn owner(&self) -> &str {
        &self.owner
    }

    fn payload(&self) -> &Value {
        &self.payload
    }

    fn execute(&self, graph: &SharedGraph) -> Result<(), CommandError> {
        let uuid = parse_target(&self.payload, "uuid")?;
        let new_owner = self
            .payload
            .get("owner")
            .and_then(Value::as_str)
            .ok_or_else(|| CommandError::MalformedPayload {
                reason: "missing 'owner' field".to_string(),
            })?;
        if graph.set_owner(&uuid, new_owner) {
            Ok(())
        } else {
            Err(CommandError::TargetMissing { uuid })
        }
    }
}

impl CommandKind for RightCommand {
    const TYPE_NAME: &'static str = "RightCommand";

    fn from_parts(owner: String, payload: Value) -> Self {
        Self { owner, payload }
    }
}

// The remaining command types carry opaque payloads and are extension
// points: no default graph mutation.
macro_rules! passthrough_command {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        pub struct $name {
            owner: String,
            payload: Value,
        }

        impl $name {
            pub fn new(owner: &str, payload: Value) -> Self {
                Self {
                    owner: owner.to_string(),
                    payload,
                }
            }
        }

        impl ReplicatedCommand for $name {
            fn type_name(&self) -> &'static str {
                Self::TYPE_NAME
            }

            fn owner(&self) -> &str {
                &self.owner
            }

            fn payload(&self) -> &Value {
                &self.payload
            }

            fn execute(&self, _graph: &SharedGraph) -> Result<(), CommandError> {
                Ok(())
            }
        }

        impl CommandKind for $name {
            const TYPE_NAME: &'static str = stringify!($name);

            fn from_parts(owner: String, payload: Value) -> Self {
                Self { owner, payload }
            }
        }
    };
}

passthrough_command!(
    /// Session configuration broadcast.
    ConfigCommand
);
passthrough_command!(
    /// Request a snapshot of the peer's graph.
    SnapshotCommand
);
passthrough_command!(
    /// Server-driven snapshot progress notification.
    ServerSnapshotCommand
);
passthrough_command!(
    /// Authentication exchange.
    AuthCommand
);
passthrough_command!(
    /// Orderly disconnect notification.
    DisconnectCommand
);
passthrough_command!(
    /// Server-initiated eviction of a peer.
    KickCommand
);
passthrough_command!(
    /// Presence/state fan-out for connected clients.
    ClientsStateCommand
);
passthrough_command!(
    /// Per-user metadata update.
    UserMetadataCommand
);
