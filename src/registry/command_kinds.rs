use std::collections::HashMap;

use serde_json::Value;

use super::error::RegistryError;
use crate::commands::{
    AuthCommand, ClientsStateCommand, CommandKind, ConfigCommand, DeleteCommand,
    DisconnectCommand, KickCommand, ReplicatedCommand, RightCommand, ServerSnapshotCommand,
    SnapshotCommand, UserMetadataCommand,
};

type CommandConstructor = Box<dyn Fn(String, Value) -> Box<dyn ReplicatedCommand> + Send + Sync>;

/// Name-keyed registry of command constructors. The built-in command set is
/// registered at construction; consumers may add their own on top.
pub struct CommandKinds {
    kinds: HashMap<&'static str, CommandConstructor>,
}

impl Default for CommandKinds {
    fn default() -> Self {
        let mut kinds = Self {
            kinds: HashMap::new(),
        };
        kinds.add_command::<DeleteCommand>();
        kinds.add_command::<RightCommand>();
        kinds.add_command::<ConfigCommand>();
        kinds.add_command::<SnapshotCommand>();
        kinds.add_command::<ServerSnapshotCommand>();
        kinds.add_command::<AuthCommand>();
        kinds.add_command::<DisconnectCommand>();
        kinds.add_command::<KickCommand>();
        kinds.add_command::<ClientsStateCommand>();
        kinds.add_command::<UserMetadataCommand>();
        kinds
    }
}

impl CommandKinds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_command<C: CommandKind>(&mut self) {
        let constructor: CommandConstructor =
            Box::new(|owner, payload| Box::new(C::from_parts(owner, payload)));
        self.kinds.insert(C::TYPE_NAME, constructor);
    }

    /// Build a command instance from its wire parts.
    pub fn command_from_name(
        &self,
        type_name: &str,
        owner: String,
        payload: Value,
    ) -> Result<Box<dyn ReplicatedCommand>, RegistryError> {
        let constructor = self
            .kinds
            .get(type_name)
            .ok_or_else(|| RegistryError::CommandNotFound {
                type_name: type_name.to_string(),
            })?;
        Ok(constructor(owner, payload))
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.kinds.contains_key(type_name)
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}
