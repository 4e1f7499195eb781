//! Core data types for autostate.
//!
//! This crate provides the vocabulary shared by the store and the engine:
//! stored values, the closed set of type tags a property can be registered
//! with, per-property policy annotations, the self-describing contract for
//! custom types, and scope identifiers.

pub mod describe;
pub mod error;
pub mod policy;
pub mod scope;
pub mod shape;
pub mod value;

// Re-export main types
pub use describe::{AsAny, Rejected, SelfDescribing};
pub use error::{ModelError, Result};
pub use policy::{Annotation, AnnotationKind, PolicyAnnotation};
pub use scope::{short_type_name, ScopeId, SCOPE_SEPARATOR};
pub use shape::{CustomType, ElementKind, FundamentalKind, Item, Shape, Slot, TypeTag};
pub use value::Value;
