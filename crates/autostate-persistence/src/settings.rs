//! Settings container.

use autostate_models::Value;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::memory::MemoryStore;
use crate::store::StateStore;

/// Where a settings container lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingsLocation {
    /// Settings kept on this machine only.
    Local,
    /// Settings that follow the user between machines.
    Roaming,
}

/// A settings container.
///
/// Settings are one flat set shared by the whole application, so this store
/// considers any scope "saved" as soon as it holds a single entry.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    location: SettingsLocation,
    inner: MemoryStore,
}

impl SettingsStore {
    pub fn new(location: SettingsLocation) -> Self {
        Self {
            location,
            inner: MemoryStore::new(),
        }
    }

    pub fn local() -> Self {
        Self::new(SettingsLocation::Local)
    }

    pub fn roaming() -> Self {
        Self::new(SettingsLocation::Roaming)
    }

    /// Wraps existing settings.
    pub fn with_entries(location: SettingsLocation, entries: MemoryStore) -> Self {
        Self {
            location,
            inner: entries,
        }
    }

    pub fn location(&self) -> SettingsLocation {
        self.location
    }

    /// Returns true if these settings roam between machines.
    pub fn is_roaming(&self) -> bool {
        self.location == SettingsLocation::Roaming
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl StateStore for SettingsStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.inner.set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<Option<Value>> {
        self.inner.remove(key)
    }

    fn contains_key(&self, key: &str) -> Result<bool> {
        self.inner.contains_key(key)
    }

    fn scope_has_been_saved(&self, _prefix: &str) -> Result<bool> {
        Ok(!self.inner.is_empty())
    }
}
