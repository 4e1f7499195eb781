//! Type tags and dynamic property values.
//!
//! Every property is registered with a [`TypeTag`] that states, once and up
//! front, how the engine must treat it. There is no runtime shape guessing:
//! the tag says whether the property is fundamental, custom, a collection
//! (and of what), a raw array, or a command.

use std::fmt;

use crate::describe::SelfDescribing;
use crate::scope::short_type_name;
use crate::value::Value;

/// The fundamental types: stored natively, no flattening needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FundamentalKind {
    Bool,
    Char,
    I16,
    I32,
    I64,
    F32,
    F64,
    String,
    DateTime,
}

impl FundamentalKind {
    /// Returns the display name of this kind.
    pub fn name(&self) -> &'static str {
        match self {
            FundamentalKind::Bool => "bool",
            FundamentalKind::Char => "char",
            FundamentalKind::I16 => "i16",
            FundamentalKind::I32 => "i32",
            FundamentalKind::I64 => "i64",
            FundamentalKind::F32 => "f32",
            FundamentalKind::F64 => "f64",
            FundamentalKind::String => "string",
            FundamentalKind::DateTime => "datetime",
        }
    }
}

impl fmt::Display for FundamentalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn instantiate<T: SelfDescribing + Default>() -> Box<dyn SelfDescribing> {
    Box::new(T::default())
}

/// A registered custom type together with the factory used to build a blank
/// instance before restoring it.
#[derive(Clone, Copy)]
pub struct CustomType {
    name: &'static str,
    factory: fn() -> Box<dyn SelfDescribing>,
}

impl CustomType {
    /// Registers a custom type under an explicit name.
    pub const fn new(name: &'static str, factory: fn() -> Box<dyn SelfDescribing>) -> Self {
        Self { name, factory }
    }

    /// Registers `T` using its short type name and `Default` as the factory.
    pub fn of<T: SelfDescribing + Default>() -> Self {
        Self::new(short_type_name::<T>(), instantiate::<T>)
    }

    /// Returns the registered name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Builds a blank instance ready for `restore_state`.
    pub fn instantiate(&self) -> Box<dyn SelfDescribing> {
        (self.factory)()
    }
}

impl fmt::Debug for CustomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CustomType").field(&self.name).finish()
    }
}

impl PartialEq for CustomType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// The type of a single collection element.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    Fundamental(FundamentalKind),
    Custom(CustomType),
}

/// How a property is laid out.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// A fundamental scalar.
    Fundamental(FundamentalKind),
    /// A self-describing custom scalar.
    Custom(CustomType),
    /// A custom scalar stored natively as structured data.
    Structured(&'static str),
    /// A variable-length ordered collection. Carries every generic element
    /// type the declared collection has; only single-element collections can
    /// be restored.
    Collection(Vec<ElementKind>),
    /// A raw fixed-size array. Never persisted.
    Array { element: ElementKind, len: usize },
    /// A command/action. Not data.
    Command,
}

/// A property's registered type: its shape plus whether it can hold null.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeTag {
    shape: Shape,
    nullable: bool,
}

impl TypeTag {
    /// Creates a non-nullable tag.
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            nullable: false,
        }
    }

    /// Tag for a fundamental scalar.
    pub fn fundamental(kind: FundamentalKind) -> Self {
        Self::new(Shape::Fundamental(kind))
    }

    /// Tag for a collection with a single element type.
    pub fn collection_of(element: ElementKind) -> Self {
        Self::new(Shape::Collection(vec![element]))
    }

    /// Marks the tag as able to hold null.
    pub fn into_nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn is_collection(&self) -> bool {
        matches!(self.shape, Shape::Collection(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self.shape, Shape::Array { .. })
    }

    pub fn is_command(&self) -> bool {
        matches!(self.shape, Shape::Command)
    }
}

/// One element of a collection property, as seen by the engine.
#[derive(Debug)]
pub enum Item {
    Value(Value),
    Custom(Box<dyn SelfDescribing>),
}

impl Item {
    /// The element's flat string form: self-describing elements serialise
    /// themselves, everything else uses its natural string form.
    pub fn to_text(&self) -> String {
        match self {
            Item::Value(value) => value.to_string(),
            Item::Custom(custom) => custom.serialize_state(),
        }
    }
}

/// A property's current value, as read from or written to an object.
#[derive(Debug)]
pub enum Slot {
    Null,
    Value(Value),
    Custom(Box<dyn SelfDescribing>),
    List(Vec<Item>),
}

impl Slot {
    /// Short name of the variant, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Slot::Null => "null",
            Slot::Value(_) => "value",
            Slot::Custom(_) => "custom",
            Slot::List(_) => "list",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Slot::Null)
    }
}

impl From<Value> for Slot {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Slot::Null,
            other => Slot::Value(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::describe::Rejected;

    #[derive(Debug, Default)]
    struct Marker {
        text: String,
    }

    impl SelfDescribing for Marker {
        fn serialize_state(&self) -> String {
            self.text.clone()
        }

        fn restore_state(&mut self, text: &str) -> Result<(), Rejected> {
            self.text = text.to_string();
            Ok(())
        }
    }

    #[test]
    fn test_custom_type_factory_builds_blank_instance() {
        let custom = CustomType::of::<Marker>();
        assert_eq!(custom.name(), "Marker");

        let mut instance = custom.instantiate();
        assert_eq!(instance.serialize_state(), "");
        instance.restore_state("restored").unwrap();
        assert_eq!(instance.serialize_state(), "restored");
    }

    #[test]
    fn test_type_tag_flags() {
        let tag = TypeTag::fundamental(FundamentalKind::I32);
        assert!(!tag.is_nullable());
        assert!(tag.clone().into_nullable().is_nullable());

        let list = TypeTag::collection_of(ElementKind::Fundamental(FundamentalKind::String));
        assert!(list.is_collection());
        assert!(!list.is_array());

        let array = TypeTag::new(Shape::Array {
            element: ElementKind::Fundamental(FundamentalKind::I32),
            len: 3,
        });
        assert!(array.is_array());
        assert!(TypeTag::new(Shape::Command).is_command());
    }

    #[test]
    fn test_item_text() {
        assert_eq!(Item::Value(Value::I32(9)).to_text(), "9");
        let custom = Item::Custom(Box::new(Marker {
            text: "m".to_string(),
        }));
        assert_eq!(custom.to_text(), "m");
    }

    #[test]
    fn test_slot_from_null_value() {
        assert!(Slot::from(Value::Null).is_null());
        assert_eq!(Slot::from(Value::Bool(true)).kind_name(), "value");
    }
}
