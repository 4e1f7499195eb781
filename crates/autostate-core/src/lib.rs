//! Annotation-driven state persistence for autostate.
//!
//! This crate moves an object's annotated properties to and from a
//! [`StateStore`]:
//! - `TypeDescriptor` - the per-type table of properties, type tags and
//!   policy annotations, built once at registration
//! - `Engine` - runs save and load passes over a descriptor
//! - `StateBinding` - an owning object's scope prefix plus its shared store
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use std::sync::OnceLock;
//!
//! use autostate_core::{
//!     AnnotationKind, MemoryStore, PolicyAnnotation, StateBinding, StateModel, TypeDescriptor,
//! };
//!
//! #[derive(Default)]
//! struct SearchPage {
//!     query: String,
//!     page: i32,
//! }
//!
//! impl StateModel for SearchPage {
//!     fn descriptor() -> &'static TypeDescriptor<Self> {
//!         static DESCRIPTOR: OnceLock<TypeDescriptor<SearchPage>> = OnceLock::new();
//!         DESCRIPTOR.get_or_init(|| {
//!             TypeDescriptor::builder("SearchPage")
//!                 .field("Query", |p: &SearchPage| &p.query, |p| &mut p.query)
//!                 .state(PolicyAnnotation::new())
//!                 .field("Page", |p: &SearchPage| &p.page, |p| &mut p.page)
//!                 .state(PolicyAnnotation::new().with_default(1))
//!                 .build()
//!                 .expect("SearchPage descriptor")
//!         })
//!     }
//! }
//!
//! let store = Rc::new(RefCell::new(MemoryStore::new()));
//! let binding = StateBinding::for_model::<SearchPage>(store).unwrap();
//!
//! let page = SearchPage { query: "rust".into(), page: 3 };
//! assert!(binding.save_auto(&page, AnnotationKind::State).is_success());
//!
//! let mut restored = SearchPage::default();
//! binding.load_auto(&mut restored, AnnotationKind::State);
//! assert_eq!(restored.query, "rust");
//! assert_eq!(restored.page, 3);
//! ```
//!
//! # Key Concepts
//!
//! ## Type tags
//!
//! Every field type declares a closed [`TypeTag`] through [`StateField`].
//! Fundamental values are stored natively, collections are flattened to one
//! delimited string, self-describing custom values serialise themselves and
//! structured values are stored as JSON. Raw arrays and commands are skipped.
//!
//! ## Policies
//!
//! A [`PolicyAnnotation`] supplies a default and says whether nulls are
//! saved and restored. Each pass runs for one [`AnnotationKind`].

pub mod classify;
pub mod codec;
pub mod config;
pub mod descriptor;
pub mod engine;
pub mod error;
pub mod field;
pub mod model;
pub mod report;

// Re-export main types
pub use classify::{can_be_null, coerce_from_string, is_fundamental, CoerceError};
pub use codec::{CollectionCodec, DEFAULT_DELIMITER};
pub use config::{EngineConfig, DELIMITER_ENV, ESCAPE_ENV};
pub use descriptor::{DescriptorBuilder, PropertyDescriptor, TypeDescriptor};
pub use engine::Engine;
pub use error::{FieldError, Result, StateError};
pub use field::{Command, StateElement, StateField};
pub use model::{StateBinding, StateModel};
pub use report::{PassKind, PassReport, PropertyOutcome, SkipReason};

pub use autostate_models::{
    Annotation, AnnotationKind, CustomType, ElementKind, FundamentalKind, Item, PolicyAnnotation,
    Rejected, ScopeId, SelfDescribing, Shape, Slot, TypeTag, Value,
};
pub use autostate_persistence::{
    MemoryStore, PersistenceError, SettingsLocation, SettingsStore, StateStore,
};
