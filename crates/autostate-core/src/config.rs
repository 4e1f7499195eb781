//! Engine configuration.

use tracing::warn;

use crate::codec::{is_valid_delimiter, DEFAULT_DELIMITER};

/// Environment variable overriding the collection delimiter.
pub const DELIMITER_ENV: &str = "AUTOSTATE_DELIMITER";

/// Environment variable toggling element escaping (`true`/`false`).
pub const ESCAPE_ENV: &str = "AUTOSTATE_ESCAPE";

/// Configuration for the save/load engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Separator between flattened collection elements.
    pub delimiter: char,
    /// Escape delimiters and backslashes inside elements.
    pub escape_elements: bool,
    /// Record a marker entry under the scope prefix on every write.
    pub write_scope_marker: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            escape_elements: true,
            write_scope_marker: true,
        }
    }
}

impl EngineConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Config matching the unescaped flattening of earlier stores.
    pub fn legacy() -> Self {
        Self::default().with_escape_elements(false)
    }

    /// Creates a config from defaults overridden by environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Creates a config from defaults overridden by `lookup`. Unparseable
    /// values are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(delimiter) = lookup(DELIMITER_ENV) {
            let mut chars = delimiter.chars();
            if let (Some(c), None) = (chars.next(), chars.next()) {
                if is_valid_delimiter(c) {
                    config.delimiter = c;
                }
            }
        }

        if let Some(escape) = lookup(ESCAPE_ENV) {
            if let Ok(escape) = escape.trim().to_ascii_lowercase().parse::<bool>() {
                config.escape_elements = escape;
            }
        }

        config
    }

    /// Sets the collection delimiter. The escape prefix is refused and the
    /// current delimiter kept.
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        if is_valid_delimiter(delimiter) {
            self.delimiter = delimiter;
        } else {
            warn!(?delimiter, "delimiter collides with the escape prefix, ignoring");
        }
        self
    }

    /// Sets whether elements are escaped.
    pub fn with_escape_elements(mut self, escape: bool) -> Self {
        self.escape_elements = escape;
        self
    }

    /// Sets whether writes record the scope marker.
    pub fn with_scope_marker(mut self, write: bool) -> Self {
        self.write_scope_marker = write;
        self
    }
}
