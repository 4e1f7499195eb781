//! In-memory state cache.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

use autostate_models::Value;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PersistenceError, Result};
use crate::store::StateStore;

/// A shared state cache holding the entries of many scopes.
///
/// Entries are kept in key order so that a scope's entries are contiguous and
/// a prefix existence check is a single range lookup. The cache serialises to
/// JSON so an external backend can persist it however it likes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryStore {
    entries: BTreeMap<String, Value>,
    #[serde(skip)]
    failing_keys: BTreeSet<String>,
    #[serde(skip)]
    unavailable: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a cache from existing entries.
    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            ..Self::default()
        }
    }

    /// Restores a cache from a JSON snapshot.
    pub fn from_json(json: &str) -> Result<Self> {
        let store = serde_json::from_str(json)?;
        Ok(store)
    }

    /// Serialises the cache to a JSON snapshot.
    ///
    /// JSON has no NaN or infinity, so a non-finite float entry fails the
    /// snapshot instead of being written as `null`.
    pub fn to_json(&self) -> Result<String> {
        if let Some(key) = self.entries.iter().find_map(|(k, v)| {
            let finite = match v {
                Value::F64(f) => f.is_finite(),
                Value::F32(f) => f.is_finite(),
                _ => true,
            };
            (!finite).then_some(k)
        }) {
            return Err(PersistenceError::WriteError {
                key: key.clone(),
                reason: "non-finite float cannot be snapshotted".to_string(),
            });
        }

        let json = serde_json::to_string_pretty(self)?;
        Ok(json)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over all entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterates over the entries whose keys start with `prefix`.
    pub fn scope_entries<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a Value)> + 'a {
        self.entries
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(move |(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.as_str(), v))
    }

    /// Removes every entry whose key starts with `prefix`.
    pub fn clear_scope(&mut self, prefix: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|k, _| !k.starts_with(prefix));
        let removed = before - self.entries.len();
        debug!(prefix = %prefix, removed, "cleared scope");
        removed
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Makes every write to `key` fail, for testing error handling.
    pub fn fail_writes_for(&mut self, key: impl Into<String>) {
        self.failing_keys.insert(key.into());
    }

    /// Makes the whole store unavailable, for testing error handling.
    pub fn set_unavailable(&mut self, unavailable: bool) {
        self.unavailable = unavailable;
    }

    fn ensure_available(&self) -> Result<()> {
        if self.unavailable {
            return Err(PersistenceError::Unavailable(
                "memory store marked unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

impl StateStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        self.ensure_available()?;
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.ensure_available()?;
        if self.failing_keys.contains(key) {
            return Err(PersistenceError::WriteError {
                key: key.to_string(),
                reason: "simulated write error".to_string(),
            });
        }
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<Option<Value>> {
        self.ensure_available()?;
        Ok(self.entries.remove(key))
    }

    fn contains_key(&self, key: &str) -> Result<bool> {
        self.ensure_available()?;
        Ok(self.entries.contains_key(key))
    }

    fn scope_has_been_saved(&self, prefix: &str) -> Result<bool> {
        self.ensure_available()?;
        Ok(self.scope_entries(prefix).next().is_some())
    }
}
