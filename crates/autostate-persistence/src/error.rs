//! Error types for persistence operations.

use thiserror::Error;

/// Errors that can occur while reading or writing a state store.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// The store cannot be used at all.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Failed to write one entry.
    #[error("failed to write {key}: {reason}")]
    WriteError { key: String, reason: String },

    /// Failed to read one entry.
    #[error("failed to read {key}: {reason}")]
    ReadError { key: String, reason: String },

    /// Failed to serialize or deserialize a snapshot.
    #[error("failed to serialize: {0}")]
    SerializeError(#[from] serde_json::Error),
}

impl PersistenceError {
    /// Returns true if the error affects the whole store rather than a
    /// single entry.
    pub fn is_fatal(&self) -> bool {
        matches!(self, PersistenceError::Unavailable(_))
    }
}

/// Result type alias for persistence operations.
pub type Result<T> = std::result::Result<T, PersistenceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_unavailable_is_fatal() {
        assert!(PersistenceError::Unavailable("offline".into()).is_fatal());
        assert!(!PersistenceError::WriteError {
            key: "k".into(),
            reason: "r".into()
        }
        .is_fatal());
        assert!(!PersistenceError::ReadError {
            key: "k".into(),
            reason: "r".into()
        }
        .is_fatal());
    }
}
