//! Values held by a state store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ModelError;
use crate::shape::FundamentalKind;

/// A value as it is written to and read back from a state store.
///
/// Fundamental variants round-trip through a store natively. `Structured`
/// carries custom data that the store keeps as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// An explicit null entry.
    Null,
    Bool(bool),
    Char(char),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    String(String),
    DateTime(DateTime<Utc>),
    /// Custom data stored natively as JSON.
    Structured(serde_json::Value),
}

impl Value {
    /// Returns true for an explicit null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the fundamental kind of this value, if it has one.
    pub fn kind(&self) -> Option<FundamentalKind> {
        match self {
            Value::Bool(_) => Some(FundamentalKind::Bool),
            Value::Char(_) => Some(FundamentalKind::Char),
            Value::I16(_) => Some(FundamentalKind::I16),
            Value::I32(_) => Some(FundamentalKind::I32),
            Value::I64(_) => Some(FundamentalKind::I64),
            Value::F32(_) => Some(FundamentalKind::F32),
            Value::F64(_) => Some(FundamentalKind::F64),
            Value::String(_) => Some(FundamentalKind::String),
            Value::DateTime(_) => Some(FundamentalKind::DateTime),
            Value::Null | Value::Structured(_) => None,
        }
    }

    /// Short name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Structured(_) => "structured",
            other => other.kind().map_or("unknown", |kind| kind.name()),
        }
    }

    /// Returns the string slice if this is a `String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

/// The natural string form of a value. Null renders as the empty string.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Char(v) => write!(f, "{}", v),
            Value::I16(v) => write!(f, "{}", v),
            Value::I32(v) => write!(f, "{}", v),
            Value::I64(v) => write!(f, "{}", v),
            Value::F32(v) => write!(f, "{}", v),
            Value::F64(v) => write!(f, "{}", v),
            Value::String(v) => f.write_str(v),
            Value::DateTime(v) => f.write_str(&v.to_rfc3339()),
            Value::Structured(v) => write!(f, "{}", v),
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {$(
        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$variant(v)
            }
        }
    )*};
}

value_from!(
    bool => Bool,
    char => Char,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    f32 => F32,
    f64 => F64,
    String => String,
    DateTime<Utc> => DateTime,
    serde_json::Value => Structured,
);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

/// Conversions back out of a stored value. Integer and float reads accept
/// narrower stored variants when the widening is lossless.
macro_rules! value_try_into {
    ($ty:ty, $name:literal, $($pat:pat => $conv:expr),+ $(,)?) => {
        impl TryFrom<Value> for $ty {
            type Error = ModelError;

            fn try_from(value: Value) -> Result<Self, Self::Error> {
                match value {
                    $($pat => Ok($conv),)+
                    other => Err(ModelError::TypeMismatch {
                        expected: $name,
                        found: other.type_name(),
                    }),
                }
            }
        }
    };
}

value_try_into!(bool, "bool", Value::Bool(v) => v);
value_try_into!(char, "char", Value::Char(v) => v);
value_try_into!(i16, "i16", Value::I16(v) => v);
value_try_into!(i32, "i32", Value::I32(v) => v, Value::I16(v) => i32::from(v));
value_try_into!(
    i64,
    "i64",
    Value::I64(v) => v,
    Value::I32(v) => i64::from(v),
    Value::I16(v) => i64::from(v),
);
value_try_into!(f32, "f32", Value::F32(v) => v);
value_try_into!(f64, "f64", Value::F64(v) => v, Value::F32(v) => f64::from(v));
value_try_into!(String, "string", Value::String(v) => v);
value_try_into!(DateTime<Utc>, "datetime", Value::DateTime(v) => v);
