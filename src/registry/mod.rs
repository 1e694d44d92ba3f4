mod command_kinds;
mod datablock_kinds;
pub mod error;

pub use command_kinds::CommandKinds;
pub use datablock_kinds::{DatablockKinds, KindSettings};
pub use error::RegistryError;
