//! Type classification and string coercion.
//!
//! Fundamental types are stored natively; everything else is either
//! self-describing, stored as structured data, or flattened as a collection.

use autostate_models::{FundamentalKind, Shape, TypeTag, Value};
use thiserror::Error;

/// Why a string could not be coerced into a fundamental value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoerceError {
    /// The target kind is not one of the coercible kinds.
    #[error("cannot coerce text into {0}")]
    Unsupported(FundamentalKind),

    /// The text did not parse as the target kind.
    #[error("unable to coerce {text:?} into {kind}")]
    Parse { text: String, kind: FundamentalKind },
}

/// Returns true if the tag describes a fundamental (natively stored) type.
/// An unknown tag is never fundamental.
pub fn is_fundamental(tag: Option<&TypeTag>) -> bool {
    matches!(tag.map(TypeTag::shape), Some(Shape::Fundamental(_)))
}

/// Returns true if a property with this tag may hold null. An unknown tag
/// may.
pub fn can_be_null(tag: Option<&TypeTag>) -> bool {
    tag.map_or(true, TypeTag::is_nullable)
}

/// Parses `text` into a value of `kind`.
///
/// Only `i32`, `f64`, `f32`, `bool` and `i16` are coercible. Surrounding
/// whitespace is ignored and booleans are case-insensitive.
pub fn coerce_from_string(text: &str, kind: FundamentalKind) -> Result<Value, CoerceError> {
    let trimmed = text.trim();
    let parse_error = || CoerceError::Parse {
        text: text.to_string(),
        kind,
    };

    match kind {
        FundamentalKind::I32 => trimmed.parse().map(Value::I32).map_err(|_| parse_error()),
        FundamentalKind::F64 => trimmed.parse().map(Value::F64).map_err(|_| parse_error()),
        FundamentalKind::F32 => trimmed.parse().map(Value::F32).map_err(|_| parse_error()),
        FundamentalKind::I16 => trimmed.parse().map(Value::I16).map_err(|_| parse_error()),
        FundamentalKind::Bool => {
            if trimmed.eq_ignore_ascii_case("true") {
                Ok(Value::Bool(true))
            } else if trimmed.eq_ignore_ascii_case("false") {
                Ok(Value::Bool(false))
            } else {
                Err(parse_error())
            }
        }
        other => Err(CoerceError::Unsupported(other)),
    }
}
