mod datablock;
pub mod error;
mod kind;
mod state;

pub use datablock::Datablock;
pub use error::EntityError;
pub use kind::DatablockKind;
pub use state::DatablockState;
