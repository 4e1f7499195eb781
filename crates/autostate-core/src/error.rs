//! Error types for the engine.

use autostate_models::ModelError;
use autostate_persistence::PersistenceError;
use thiserror::Error;

/// Errors raised while moving a single property between an object and its
/// typed field.
#[derive(Error, Debug)]
pub enum FieldError {
    /// Null was assigned to a property that cannot hold it.
    #[error("property cannot hold null")]
    NullNotAllowed,

    /// A value of the wrong type was assigned.
    #[error(transparent)]
    Mismatch(#[from] ModelError),

    /// The engine handed over the wrong kind of slot.
    #[error("expected {expected} slot, found {found}")]
    UnexpectedSlot {
        expected: &'static str,
        found: &'static str,
    },

    /// A custom value was not the registered type.
    #[error("custom value is not a {0}")]
    WrongCustomType(&'static str),

    /// Structured data failed to convert.
    #[error("structured data: {0}")]
    Structured(#[from] serde_json::Error),

    /// The property's type can never be restored.
    #[error("unsupported property type: {0}")]
    Unsupported(&'static str),
}

/// Errors that can occur in the engine.
#[derive(Error, Debug)]
pub enum StateError {
    /// Model error (invalid scope).
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    /// Persistence error.
    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// A single property could not be read or written.
    #[error("property {property}: {source}")]
    Field {
        property: String,
        #[source]
        source: FieldError,
    },

    /// Two properties were registered under the same name.
    #[error("duplicate property: {0}")]
    DuplicateProperty(String),

    /// The shared store is already borrowed elsewhere.
    #[error("state store is already in use")]
    StoreBusy,
}

impl StateError {
    /// Wraps a field error with the property it came from.
    pub fn field(property: &str, source: FieldError) -> Self {
        StateError::Field {
            property: property.to_string(),
            source,
        }
    }

    /// Returns true if the error must end the whole pass.
    pub fn is_fatal(&self) -> bool {
        match self {
            StateError::Persistence(e) => e.is_fatal(),
            StateError::StoreBusy => true,
            _ => false,
        }
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, StateError>;
