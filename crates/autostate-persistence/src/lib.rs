//! State stores for autostate.
//!
//! This crate defines the narrow [`StateStore`] interface the engine reads
//! from and writes to, plus two in-memory implementations:
//!
//! - [`MemoryStore`]: a shared state cache holding every object's entries
//!   under their scope prefixes.
//! - [`SettingsStore`]: a local or roaming settings container.
//!
//! # Example
//!
//! ```
//! use autostate_models::Value;
//! use autostate_persistence::{MemoryStore, StateStore};
//!
//! let mut store = MemoryStore::new();
//! store.set("MainViewModel.Count", Value::I32(3)).unwrap();
//!
//! assert!(store.scope_has_been_saved("MainViewModel.").unwrap());
//! assert_eq!(store.get("MainViewModel.Count").unwrap(), Some(Value::I32(3)));
//! ```

pub mod error;
pub mod memory;
pub mod settings;
pub mod store;

pub use error::{PersistenceError, Result};
pub use memory::MemoryStore;
pub use settings::{SettingsLocation, SettingsStore};
pub use store::StateStore;
