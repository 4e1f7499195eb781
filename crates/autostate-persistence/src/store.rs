//! The key/value interface the engine persists through.

use autostate_models::Value;

use crate::error::Result;

/// Abstract key/value interface the engine persists through.
///
/// Keys are plain strings; callers namespace them with a scope prefix. This
/// trait handles only the "where" of storage: a backing medium (memory, disk,
/// network) is free to batch or flush however it likes.
pub trait StateStore {
    /// Reads the entry for `key`, or `None` if there is none.
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Writes (or overwrites) the entry for `key`.
    fn set(&mut self, key: &str, value: Value) -> Result<()>;

    /// Removes the entry for `key`, returning it if it existed.
    fn remove(&mut self, key: &str) -> Result<Option<Value>>;

    /// Returns true if an entry exists for `key`.
    fn contains_key(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Returns true if this store has ever been written to for `prefix`.
    fn scope_has_been_saved(&self, prefix: &str) -> Result<bool>;
}

impl<S: StateStore + ?Sized> StateStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<Option<Value>> {
        (**self).remove(key)
    }

    fn contains_key(&self, key: &str) -> Result<bool> {
        (**self).contains_key(key)
    }

    fn scope_has_been_saved(&self, prefix: &str) -> Result<bool> {
        (**self).scope_has_been_saved(prefix)
    }
}
