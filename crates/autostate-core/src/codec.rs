//! Flattening of collections into a single delimited string.
//!
//! `["a", "b", "c"]` flattens to `a;b;c` and an empty collection to the empty
//! string. With escaping on, a delimiter or backslash inside an element is
//! prefixed with a backslash so that it survives the round trip; elements
//! containing neither encode exactly as they would unescaped.

use tracing::warn;

/// Default element separator.
pub const DEFAULT_DELIMITER: char = ';';

/// Escape prefix. It can never be the delimiter.
pub const ESCAPE: char = '\\';

/// Returns true if `delimiter` can separate flattened elements.
pub fn is_valid_delimiter(delimiter: char) -> bool {
    delimiter != ESCAPE
}

/// Encoder/decoder for flattened collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionCodec {
    delimiter: char,
    escape: bool,
}

impl Default for CollectionCodec {
    fn default() -> Self {
        Self::new(DEFAULT_DELIMITER, true)
    }
}

impl CollectionCodec {
    /// Creates a codec. An invalid delimiter falls back to
    /// [`DEFAULT_DELIMITER`].
    pub fn new(delimiter: char, escape: bool) -> Self {
        let delimiter = if is_valid_delimiter(delimiter) {
            delimiter
        } else {
            warn!(?delimiter, "delimiter collides with the escape prefix, using default");
            DEFAULT_DELIMITER
        };
        Self { delimiter, escape }
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Joins element encodings into one string.
    ///
    /// Unescaped, trailing delimiters are trimmed; an empty last element is
    /// therefore lost, as it always was in that format.
    pub fn encode<I, S>(&self, elements: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = String::new();
        let mut first = true;

        for element in elements {
            if !first {
                out.push(self.delimiter);
            }
            first = false;

            if self.escape {
                self.escape_into(element.as_ref(), &mut out);
            } else {
                out.push_str(element.as_ref());
            }
        }

        if self.escape {
            out
        } else {
            out.trim_end_matches(self.delimiter).to_string()
        }
    }

    /// Splits a flattened string back into element encodings. The empty
    /// string decodes to no elements.
    pub fn decode(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }
        if !self.escape {
            return text.split(self.delimiter).map(str::to_string).collect();
        }

        let mut rows = Vec::new();
        let mut current = String::new();
        let mut chars = text.chars();

        while let Some(c) = chars.next() {
            if c == ESCAPE {
                // A dangling escape at the end is kept literally.
                current.push(chars.next().unwrap_or(ESCAPE));
            } else if c == self.delimiter {
                rows.push(std::mem::take(&mut current));
            } else {
                current.push(c);
            }
        }
        rows.push(current);
        rows
    }

    fn escape_into(&self, element: &str, out: &mut String) {
        for c in element.chars() {
            if c == ESCAPE || c == self.delimiter {
                out.push(ESCAPE);
            }
            out.push(c);
        }
    }
}
