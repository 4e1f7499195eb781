//! Scope identifiers.
//!
//! A scope prefix namespaces one object's entries inside a shared store:
//! every key is `<prefix><property>`.

use std::fmt;

use crate::error::{ModelError, Result};

/// Separator appended to type-derived scope names.
pub const SCOPE_SEPARATOR: char = '.';

/// Returns the unqualified name of `T`, without module path or generics.
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// A non-empty scope prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopeId(String);

impl ScopeId {
    /// Creates a scope from a prefix used verbatim.
    pub fn new(prefix: impl Into<String>) -> Result<Self> {
        let prefix = prefix.into();
        if prefix.is_empty() {
            return Err(ModelError::EmptyScope);
        }
        Ok(Self(prefix))
    }

    /// Creates a scope from a name, appending the separator if missing.
    pub fn for_name(name: &str) -> Result<Self> {
        if name.is_empty() {
            return Err(ModelError::EmptyScope);
        }
        if name.ends_with(SCOPE_SEPARATOR) {
            Self::new(name)
        } else {
            Self::new(format!("{}{}", name, SCOPE_SEPARATOR))
        }
    }

    /// Creates a scope from the short type name of `T`.
    pub fn for_type<T: ?Sized>() -> Result<Self> {
        Self::for_name(short_type_name::<T>())
    }

    /// Returns the store key for a property in this scope.
    pub fn key_for(&self, property: &str) -> String {
        format!("{}{}", self.0, property)
    }

    /// Key of the entry recording that this scope has been written to.
    pub fn marker_key(&self) -> &str {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ScopeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
