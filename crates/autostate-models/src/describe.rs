//! The self-describing contract for custom types.
//!
//! A custom type that wants to live inside a persisted collection, or be
//! stored as a single flat string, implements [`SelfDescribing`]. The engine
//! calls `serialize_state` on save and `restore_state` on a freshly built
//! instance on load.

use std::any::Any;
use std::fmt;

use thiserror::Error;

/// Signal returned by [`SelfDescribing::restore_state`] when the text should
/// not produce a value.
///
/// A rejected collection row is left out of the collection; a rejected scalar
/// leaves its property unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("state rejected: {reason}")]
pub struct Rejected {
    reason: String,
}

impl Rejected {
    /// Creates a rejection with the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Returns the rejection reason.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Upcasting helper so boxed custom values can be downcast to their concrete
/// type after a restore.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// A type that flattens itself to one string and rebuilds itself from it.
///
/// The flattened form must not rely on the collection delimiter being absent
/// when the engine runs in legacy (unescaped) mode.
pub trait SelfDescribing: AsAny + fmt::Debug {
    /// Flattens the value to a single string.
    fn serialize_state(&self) -> String;

    /// Repopulates the value from a flattened string.
    fn restore_state(&mut self, text: &str) -> Result<(), Rejected>;
}

impl dyn SelfDescribing {
    /// Attempts to recover the concrete type of a boxed custom value.
    pub fn downcast<T: SelfDescribing>(self: Box<Self>) -> Result<Box<T>, Box<dyn Any>> {
        self.into_any().downcast::<T>()
    }

    /// Returns true if the boxed value is a `T`.
    pub fn is<T: SelfDescribing>(&self) -> bool {
        self.as_any().is::<T>()
    }
}
