//! Error types for model operations.

use thiserror::Error;

/// Errors that can occur when building or converting model values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A scope prefix was empty.
    #[error("scope prefix cannot be empty")]
    EmptyScope,

    /// A stored value did not have the expected type.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
