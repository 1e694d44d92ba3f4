use std::sync::Arc;

use crate::{
    constants::DEFAULT_CHUNK_SIZE,
    entity::DatablockKind,
    registry::{CommandKinds, DatablockKinds, KindSettings},
    types::DiffMethod,
};

pub mod error;
pub use error::ProtocolError;

/// Protocol configuration: owns the two type registries plus the transport
/// and diffing knobs, built once at process start and passed by reference
/// to everything that needs type resolution.
///
/// The built-in command set is registered by `default()`; datablock kinds
/// are supplied by the consumer. `lock()` freezes the configuration.
pub struct Protocol {
    pub datablock_kinds: DatablockKinds,
    pub command_kinds: CommandKinds,
    /// Maximum payload bytes per chunk frame
    pub chunk_size: usize,
    /// How `diff()` detects a stale snapshot
    pub diff_method: DiffMethod,
    locked: bool,
}

impl Default for Protocol {
    fn default() -> Self {
        Self {
            datablock_kinds: DatablockKinds::new(),
            command_kinds: CommandKinds::new(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            diff_method: DiffMethod::Structural,
            locked: false,
        }
    }
}

impl Protocol {
    pub fn builder() -> Self {
        Self::default()
    }

    pub fn add_datablock_kind(&mut self, kind: Arc<dyn DatablockKind>) -> &mut Self {
        self.check_lock();
        self.datablock_kinds.add_kind(kind);
        self
    }

    pub fn add_datablock_kind_with_settings(
        &mut self,
        kind: Arc<dyn DatablockKind>,
        settings: KindSettings,
    ) -> &mut Self {
        self.check_lock();
        self.datablock_kinds.add_kind_with_settings(kind, settings);
        self
    }

    pub fn add_command<C: crate::commands::CommandKind>(&mut self) -> &mut Self {
        self.check_lock();
        self.command_kinds.add_command::<C>();
        self
    }

    pub fn chunk_size(&mut self, size: usize) -> &mut Self {
        self.check_lock();
        if size == 0 {
            panic!("Invalid chunk size 0: must be non-zero");
        }
        self.chunk_size = size;
        self
    }

    pub fn diff_method(&mut self, method: DiffMethod) -> &mut Self {
        self.check_lock();
        self.diff_method = method;
        self
    }

    // Non-panicking builder methods

    pub fn try_add_datablock_kind(
        &mut self,
        kind: Arc<dyn DatablockKind>,
    ) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        self.datablock_kinds.add_kind(kind);
        Ok(self)
    }

    pub fn try_add_command<C: crate::commands::CommandKind>(
        &mut self,
    ) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        self.command_kinds.add_command::<C>();
        Ok(self)
    }

    pub fn try_chunk_size(&mut self, size: usize) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        if size == 0 {
            return Err(ProtocolError::InvalidChunkSize { size });
        }
        self.chunk_size = size;
        Ok(self)
    }

    pub fn try_diff_method(&mut self, method: DiffMethod) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        self.diff_method = method;
        Ok(self)
    }

    pub fn try_lock(&mut self) -> Result<(), ProtocolError> {
        self.try_check_lock()?;
        self.locked = true;
        Ok(())
    }

    pub fn lock(&mut self) {
        self.check_lock();
        self.locked = true;
    }

    /// Checks if the protocol is locked without panicking
    pub fn try_check_lock(&self) -> Result<(), ProtocolError> {
        if self.locked {
            Err(ProtocolError::AlreadyLocked)
        } else {
            Ok(())
        }
    }

    /// Checks if the protocol is locked, panics if it is
    pub fn check_lock(&self) {
        if self.locked {
            panic!("Protocol already locked!");
        }
    }

    pub fn build(&mut self) -> Self {
        std::mem::take(self)
    }
}
