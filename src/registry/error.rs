use thiserror::Error;

/// Errors that can occur during type resolution
///
/// A miss here is a recoverable configuration gap (a kind that was never
/// registered), not a protocol error: callers log and continue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No datablock implementation registered under this wire type name
    #[error("No datablock implementation registered for type name '{type_name}'. Must call `add_datablock_kind()` during protocol initialization")]
    KindNotFound { type_name: String },

    /// No registered implementation matched the supplied live instance
    #[error("No datablock implementation matches the supplied live instance")]
    NoInstanceMatch,

    /// No command registered under this wire type name
    #[error("No command registered for type name '{type_name}'. Must call `add_command()` during protocol initialization")]
    CommandNotFound { type_name: String },
}
