use std::{
    any::Any,
    sync::{Arc, RwLock, Weak},
};

/// The live in-process application object a datablock mirrors.
pub type LiveObject = dyn Any + Send + Sync;

/// Owning handle to a live object, held by the hosting application.
pub type LiveRef = Arc<RwLock<LiveObject>>;

/// Non-owning handle held by a datablock; goes dead when the application
/// drops the object, which is what triggers the `resolve()` retry path.
pub type LiveHandle = Weak<RwLock<LiveObject>>;

/// Wrap an application value into a shareable live object handle.
pub fn live_ref<T: Any + Send + Sync>(value: T) -> LiveRef {
    Arc::new(RwLock::new(value))
}

/// How `diff()` decides that a committed snapshot is stale.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DiffMethod {
    /// Structural equality of the freshly dumped snapshot tree.
    #[default]
    Structural,
    /// Byte equality of the binary encoding.
    Binary,
}
