//! Bridge between typed struct fields and the engine's dynamic slots.
//!
//! A field type implements [`StateField`] to declare its [`TypeTag`] and to
//! convert to and from a [`Slot`]. Collection elements implement
//! [`StateElement`]. Custom types opt in with [`self_describing!`] or
//! [`structured_state!`], which also register the factory the engine uses to
//! build blank instances on restore.
//!
//! [`self_describing!`]: crate::self_describing
//! [`structured_state!`]: crate::structured_state

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use autostate_models::{
    CustomType, ElementKind, FundamentalKind, Item, SelfDescribing, Shape, Slot, TypeTag, Value,
};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::FieldError;

/// A field type the engine can read and assign.
pub trait StateField: Sized {
    /// The registered type of the field.
    fn type_tag() -> TypeTag;

    /// Reads the current value.
    fn to_slot(&self) -> Result<Slot, FieldError>;

    /// Builds a value from a restored slot.
    fn from_slot(slot: Slot) -> Result<Self, FieldError>;
}

/// A type that can be an element of a persisted collection.
pub trait StateElement: Sized {
    fn element_kind() -> ElementKind;

    fn to_item(&self) -> Item;

    fn from_item(item: Item) -> Result<Self, FieldError>;
}

fn unexpected(expected: &'static str, found: &Slot) -> FieldError {
    FieldError::UnexpectedSlot {
        expected,
        found: found.kind_name(),
    }
}

macro_rules! fundamental_field {
    ($($ty:ty => $kind:ident),* $(,)?) => {$(
        impl StateField for $ty {
            fn type_tag() -> TypeTag {
                TypeTag::fundamental(FundamentalKind::$kind)
            }

            fn to_slot(&self) -> Result<Slot, FieldError> {
                Ok(Slot::Value(Value::from(self.clone())))
            }

            fn from_slot(slot: Slot) -> Result<Self, FieldError> {
                match slot {
                    Slot::Value(value) => Ok(<$ty>::try_from(value)?),
                    Slot::Null => Err(FieldError::NullNotAllowed),
                    other => Err(unexpected("value", &other)),
                }
            }
        }

        impl StateElement for $ty {
            fn element_kind() -> ElementKind {
                ElementKind::Fundamental(FundamentalKind::$kind)
            }

            fn to_item(&self) -> Item {
                Item::Value(Value::from(self.clone()))
            }

            fn from_item(item: Item) -> Result<Self, FieldError> {
                match item {
                    Item::Value(value) => Ok(<$ty>::try_from(value)?),
                    Item::Custom(_) => Err(FieldError::UnexpectedSlot {
                        expected: "value",
                        found: "custom",
                    }),
                }
            }
        }
    )*};
}

fundamental_field!(
    bool => Bool,
    char => Char,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    f32 => F32,
    f64 => F64,
    String => String,
    DateTime<Utc> => DateTime,
);

impl<T: StateField> StateField for Option<T> {
    fn type_tag() -> TypeTag {
        T::type_tag().into_nullable()
    }

    fn to_slot(&self) -> Result<Slot, FieldError> {
        match self {
            Some(value) => value.to_slot(),
            None => Ok(Slot::Null),
        }
    }

    fn from_slot(slot: Slot) -> Result<Self, FieldError> {
        match slot {
            Slot::Null => Ok(None),
            other => T::from_slot(other).map(Some),
        }
    }
}

impl<T: StateElement> StateField for Vec<T> {
    fn type_tag() -> TypeTag {
        TypeTag::collection_of(T::element_kind())
    }

    fn to_slot(&self) -> Result<Slot, FieldError> {
        Ok(Slot::List(self.iter().map(StateElement::to_item).collect()))
    }

    fn from_slot(slot: Slot) -> Result<Self, FieldError> {
        match slot {
            Slot::List(items) => items.into_iter().map(T::from_item).collect(),
            Slot::Null => Err(FieldError::NullNotAllowed),
            other => Err(unexpected("list", &other)),
        }
    }
}

/// Keyed collections carry two element types. They flatten to `[key, value]`
/// entries on save but cannot be restored.
impl<K: StateElement + Ord, V: StateElement> StateField for BTreeMap<K, V> {
    fn type_tag() -> TypeTag {
        TypeTag::new(Shape::Collection(vec![K::element_kind(), V::element_kind()]))
    }

    fn to_slot(&self) -> Result<Slot, FieldError> {
        let entries = self
            .iter()
            .map(|(k, v)| {
                let entry = format!("[{}, {}]", k.to_item().to_text(), v.to_item().to_text());
                Item::Value(Value::String(entry))
            })
            .collect();
        Ok(Slot::List(entries))
    }

    fn from_slot(_slot: Slot) -> Result<Self, FieldError> {
        Err(FieldError::Unsupported("keyed collection"))
    }
}

/// Raw fixed-size arrays are registered so they can be declared on a model,
/// but the engine refuses to persist them.
impl<T: StateElement, const N: usize> StateField for [T; N] {
    fn type_tag() -> TypeTag {
        TypeTag::new(Shape::Array {
            element: T::element_kind(),
            len: N,
        })
    }

    fn to_slot(&self) -> Result<Slot, FieldError> {
        Ok(Slot::List(self.iter().map(StateElement::to_item).collect()))
    }

    fn from_slot(_slot: Slot) -> Result<Self, FieldError> {
        Err(FieldError::Unsupported("fixed-size array"))
    }
}

/// A bindable action. Commands are behaviour, not data, and are never
/// persisted.
#[derive(Clone, Default)]
pub struct Command {
    action: Option<Arc<dyn Fn() + Send + Sync>>,
}

impl Command {
    pub fn new(action: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            action: Some(Arc::new(action)),
        }
    }

    /// Runs the action, if any.
    pub fn execute(&self) {
        if let Some(action) = &self.action {
            action();
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("bound", &self.action.is_some())
            .finish()
    }
}

impl StateField for Command {
    fn type_tag() -> TypeTag {
        TypeTag::new(Shape::Command)
    }

    fn to_slot(&self) -> Result<Slot, FieldError> {
        Err(FieldError::Unsupported("command"))
    }

    fn from_slot(_slot: Slot) -> Result<Self, FieldError> {
        Err(FieldError::Unsupported("command"))
    }
}

fn downcast_custom<T: SelfDescribing>(custom: Box<dyn SelfDescribing>) -> Result<T, FieldError> {
    custom
        .downcast::<T>()
        .map(|boxed| *boxed)
        .map_err(|_| FieldError::WrongCustomType(autostate_models::short_type_name::<T>()))
}

/// Tag for a self-describing scalar of type `T`.
pub fn custom_tag<T: SelfDescribing + Default>() -> TypeTag {
    TypeTag::new(Shape::Custom(CustomType::of::<T>()))
}

/// Reads a self-describing scalar.
pub fn custom_to_slot<T: SelfDescribing + Clone>(value: &T) -> Result<Slot, FieldError> {
    Ok(Slot::Custom(Box::new(value.clone())))
}

/// Assigns a restored self-describing scalar.
pub fn custom_from_slot<T: SelfDescribing>(slot: Slot) -> Result<T, FieldError> {
    match slot {
        Slot::Custom(custom) => downcast_custom(custom),
        Slot::Null => Err(FieldError::NullNotAllowed),
        other => Err(unexpected("custom", &other)),
    }
}

/// Element kind for a self-describing collection element.
pub fn custom_element<T: SelfDescribing + Default>() -> ElementKind {
    ElementKind::Custom(CustomType::of::<T>())
}

/// Reads a self-describing collection element.
pub fn custom_to_item<T: SelfDescribing + Clone>(value: &T) -> Item {
    Item::Custom(Box::new(value.clone()))
}

/// Assigns a restored self-describing collection element.
pub fn custom_from_item<T: SelfDescribing>(item: Item) -> Result<T, FieldError> {
    match item {
        Item::Custom(custom) => downcast_custom(custom),
        Item::Value(_) => Err(FieldError::UnexpectedSlot {
            expected: "custom",
            found: "value",
        }),
    }
}

/// Tag for a natively stored structured scalar.
pub fn structured_tag<T>() -> TypeTag {
    TypeTag::new(Shape::Structured(autostate_models::short_type_name::<T>()))
}

/// Reads a structured scalar as JSON.
pub fn structured_to_slot<T: Serialize>(value: &T) -> Result<Slot, FieldError> {
    Ok(Slot::Value(Value::Structured(serde_json::to_value(value)?)))
}

/// Assigns a structured scalar from JSON.
pub fn structured_from_slot<T: DeserializeOwned>(slot: Slot) -> Result<T, FieldError> {
    match slot {
        Slot::Value(Value::Structured(json)) => Ok(serde_json::from_value(json)?),
        Slot::Value(other) => Err(FieldError::Mismatch(
            autostate_models::ModelError::TypeMismatch {
                expected: "structured",
                found: other.type_name(),
            },
        )),
        Slot::Null => Err(FieldError::NullNotAllowed),
        other => Err(unexpected("value", &other)),
    }
}

/// Registers self-describing custom types as both scalar fields and
/// collection elements.
///
/// Each type must implement `SelfDescribing`, `Default` and `Clone`.
/// `Default` is the factory used to build a blank instance before restoring.
///
/// ```ignore
/// self_describing!(Point, Waypoint);
/// ```
#[macro_export]
macro_rules! self_describing {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::StateField for $ty {
            fn type_tag() -> $crate::TypeTag {
                $crate::field::custom_tag::<$ty>()
            }

            fn to_slot(&self) -> ::std::result::Result<$crate::Slot, $crate::FieldError> {
                $crate::field::custom_to_slot(self)
            }

            fn from_slot(slot: $crate::Slot) -> ::std::result::Result<Self, $crate::FieldError> {
                $crate::field::custom_from_slot::<$ty>(slot)
            }
        }

        impl $crate::StateElement for $ty {
            fn element_kind() -> $crate::ElementKind {
                $crate::field::custom_element::<$ty>()
            }

            fn to_item(&self) -> $crate::Item {
                $crate::field::custom_to_item(self)
            }

            fn from_item(item: $crate::Item) -> ::std::result::Result<Self, $crate::FieldError> {
                $crate::field::custom_from_item::<$ty>(item)
            }
        }
    )+};
}

/// Registers serde types as natively stored structured scalars.
///
/// ```ignore
/// structured_state!(WindowLayout);
/// ```
#[macro_export]
macro_rules! structured_state {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::StateField for $ty {
            fn type_tag() -> $crate::TypeTag {
                $crate::field::structured_tag::<$ty>()
            }

            fn to_slot(&self) -> ::std::result::Result<$crate::Slot, $crate::FieldError> {
                $crate::field::structured_to_slot(self)
            }

            fn from_slot(slot: $crate::Slot) -> ::std::result::Result<Self, $crate::FieldError> {
                $crate::field::structured_from_slot::<$ty>(slot)
            }
        }
    )+};
}
