use serde_json::Value;
use uuid::Uuid;

use super::error::EntityError;
use crate::types::{LiveObject, LiveRef};

/// Implementation of one replicated datablock type.
///
/// `dump` and `load` are the two methods a concrete kind must supply: how to
/// snapshot a live object into a JSON-compatible tree, and how to write such
/// a tree back. Everything else has a usable default.
pub trait DatablockKind: Send + Sync {
    /// Wire type name, also used for `kind_from_name` resolution.
    fn type_name(&self) -> &'static str;

    /// Whether a live instance belongs to this kind. Used for
    /// `kind_from_instance` resolution; first registered match wins.
    fn matches(&self, live: &LiveObject) -> bool;

    /// Snapshot the live object into a serializable tree.
    fn dump(&self, live: &LiveObject) -> Result<Value, EntityError>;

    /// Write a snapshot back into the live object.
    ///
    /// The default fails loudly: a kind that can be fetched but never
    /// applied is a configuration error.
    fn load(&self, data: &Value, target: &mut LiveObject) -> Result<(), EntityError> {
        let _ = (data, target);
        Err(EntityError::LoadNotImplemented {
            type_name: self.type_name(),
        })
    }

    /// Reacquire a live object for a datablock whose handle went dead (or
    /// that never had one, e.g. right after a fetch). Returning `None`
    /// leaves the datablock waiting for a later pass.
    fn resolve(&self, uuid: &Uuid) -> Option<LiveRef> {
        let _ = uuid;
        None
    }

    /// Uuids of other datablocks this snapshot depends on.
    fn dependencies(&self, data: &Value) -> Vec<Uuid> {
        let _ = data;
        Vec::new()
    }
}
