use thiserror::Error;

/// Errors raised at the durable-store boundary.
///
/// Game-rule outcomes (cooldowns, missing items, unknown players) are not errors; handlers
/// return them as ordinary reply strings.
#[derive(Debug, Error)]
pub enum RpgError {
    /// Wrapper around sled's error type.
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    /// Wrapper around bincode serialization and deserialization errors.
    #[error("serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    /// Wrapper around IO errors (directory creation, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Returned when fetching a record that must exist but is not present.
    #[error("record not found: {0}")]
    NotFound(String),

    /// Returned when deserializing a record with an unexpected schema version.
    #[error("schema mismatch for {entity}: expected {expected}, got {found}")]
    SchemaMismatch {
        entity: &'static str,
        expected: u8,
        found: u8,
    },

    /// Internal error (aborted transactions, poisoned state, unexpected conditions)
    #[error("internal error: {0}")]
    Internal(String),
}
