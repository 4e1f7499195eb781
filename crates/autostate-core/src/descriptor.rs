//! Per-type property descriptor tables.
//!
//! A [`TypeDescriptor`] lists a type's persistable properties once, at
//! registration time: each entry carries the property name, its registered
//! [`TypeTag`], its annotations, and accessors that move the value in and out
//! of a [`Slot`].
//!
//! ```ignore
//! TypeDescriptor::builder("MainViewModel")
//!     .field("Title", |m: &MainViewModel| &m.title, |m| &mut m.title)
//!     .state(PolicyAnnotation::new().with_default("untitled"))
//!     .field("Volume", |m: &MainViewModel| &m.volume, |m| &mut m.volume)
//!     .setting(PolicyAnnotation::new())
//!     .build()
//! ```

use std::collections::HashSet;
use std::fmt;

use autostate_models::{
    Annotation, AnnotationKind, PolicyAnnotation, ScopeId, Slot, TypeTag,
};
use tracing::warn;

use crate::error::{FieldError, Result, StateError};
use crate::field::StateField;

type Reader<T> = Box<dyn Fn(&T) -> std::result::Result<Slot, FieldError> + Send + Sync>;
type Writer<T> = Box<dyn Fn(&mut T, Slot) -> std::result::Result<(), FieldError> + Send + Sync>;

/// One registered property of `T`.
pub struct PropertyDescriptor<T> {
    name: &'static str,
    tag: TypeTag,
    annotations: Vec<Annotation>,
    reader: Reader<T>,
    writer: Writer<T>,
}

impl<T> PropertyDescriptor<T> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn tag(&self) -> &TypeTag {
        &self.tag
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Returns the annotation of `kind`, if the property carries one and has
    /// not opted out.
    pub fn annotation(&self, kind: AnnotationKind) -> Option<&Annotation> {
        if self.annotations.iter().any(Annotation::is_no_action) {
            return None;
        }
        self.annotations.iter().find(|a| a.kind() == kind)
    }

    /// Reads the property's current value.
    pub fn read(&self, target: &T) -> std::result::Result<Slot, FieldError> {
        (self.reader)(target)
    }

    /// Assigns a new value to the property.
    pub fn write(&self, target: &mut T, slot: Slot) -> std::result::Result<(), FieldError> {
        (self.writer)(target, slot)
    }

    fn annotate(&mut self, annotation: Annotation) {
        self.annotations.retain(|a| a.kind() != annotation.kind());
        self.annotations.push(annotation);
    }
}

impl<T> fmt::Debug for PropertyDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("name", &self.name)
            .field("tag", &self.tag)
            .field("annotations", &self.annotations)
            .finish_non_exhaustive()
    }
}

/// The descriptor table for one type, keyed by a stable type key chosen at
/// registration.
#[derive(Debug)]
pub struct TypeDescriptor<T> {
    type_key: &'static str,
    properties: Vec<PropertyDescriptor<T>>,
}

impl<T: 'static> TypeDescriptor<T> {
    /// Starts a descriptor table for the type registered as `type_key`.
    pub fn builder(type_key: &'static str) -> DescriptorBuilder<T> {
        DescriptorBuilder {
            type_key,
            properties: Vec::new(),
        }
    }

    pub fn type_key(&self) -> &'static str {
        self.type_key
    }

    /// Properties in registration order.
    pub fn properties(&self) -> &[PropertyDescriptor<T>] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor<T>> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Properties carrying an active annotation of `kind`, with that
    /// annotation's policy.
    pub fn annotated(
        &self,
        kind: AnnotationKind,
    ) -> impl Iterator<Item = (&PropertyDescriptor<T>, &PolicyAnnotation)> {
        self.properties
            .iter()
            .filter_map(move |p| p.annotation(kind).map(|a| (p, a.policy())))
    }

    /// The scope derived from the type key: `<type_key>.`.
    pub fn default_scope(&self) -> Result<ScopeId> {
        Ok(ScopeId::for_name(self.type_key)?)
    }
}

/// Builder for [`TypeDescriptor`]. Annotation methods apply to the most
/// recently added field.
pub struct DescriptorBuilder<T> {
    type_key: &'static str,
    properties: Vec<PropertyDescriptor<T>>,
}

impl<T: 'static> DescriptorBuilder<T> {
    /// Registers a field through a pair of lenses.
    pub fn field<F: StateField + 'static>(
        mut self,
        name: &'static str,
        get: fn(&T) -> &F,
        get_mut: fn(&mut T) -> &mut F,
    ) -> Self {
        self.properties.push(PropertyDescriptor {
            name,
            tag: F::type_tag(),
            annotations: Vec::new(),
            reader: Box::new(move |target: &T| get(target).to_slot()),
            writer: Box::new(move |target: &mut T, slot: Slot| {
                *get_mut(target) = F::from_slot(slot)?;
                Ok(())
            }),
        });
        self
    }

    /// Annotates the last field as persistent state.
    pub fn state(self, policy: PolicyAnnotation) -> Self {
        self.annotate(Annotation::state(policy))
    }

    /// Annotates the last field as a setting.
    pub fn setting(self, policy: PolicyAnnotation) -> Self {
        self.annotate(Annotation::setting(policy))
    }

    /// Opts the last field out of every pass.
    pub fn no_action(self) -> Self {
        self.annotate(Annotation::no_action())
    }

    fn annotate(mut self, annotation: Annotation) -> Self {
        match self.properties.last_mut() {
            Some(property) => property.annotate(annotation),
            None => warn!(
                type_key = self.type_key,
                annotation = annotation.kind().name(),
                "annotation before any field, ignoring"
            ),
        }
        self
    }

    /// Finishes the table. Property names must be unique.
    pub fn build(self) -> Result<TypeDescriptor<T>> {
        let mut seen = HashSet::new();
        for property in &self.properties {
            if !seen.insert(property.name) {
                return Err(StateError::DuplicateProperty(property.name.to_string()));
            }
        }

        Ok(TypeDescriptor {
            type_key: self.type_key,
            properties: self.properties,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autostate_models::{FundamentalKind, Value};

    #[derive(Debug, Default)]
    struct Panel {
        title: String,
        width: i32,
        cache: Option<String>,
    }

    fn descriptor() -> TypeDescriptor<Panel> {
        TypeDescriptor::builder("Panel")
            .field("Title", |p: &Panel| &p.title, |p| &mut p.title)
            .state(PolicyAnnotation::new().with_default("untitled"))
            .setting(PolicyAnnotation::new())
            .field("Width", |p: &Panel| &p.width, |p| &mut p.width)
            .setting(PolicyAnnotation::new().with_default(100))
            .field("Cache", |p: &Panel| &p.cache, |p| &mut p.cache)
            .state(PolicyAnnotation::new())
            .no_action()
            .build()
            .unwrap()
    }

    #[test]
    fn test_registration_order_and_tags() {
        let descriptor = descriptor();
        let names: Vec<_> = descriptor.properties().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["Title", "Width", "Cache"]);

        let width = descriptor.property("Width").unwrap();
        assert_eq!(width.tag(), &TypeTag::fundamental(FundamentalKind::I32));
        assert!(descriptor.property("Cache").unwrap().tag().is_nullable());
    }

    #[test]
    fn test_annotated_filters_by_kind() {
        let descriptor = descriptor();

        let state: Vec<_> = descriptor
            .annotated(AnnotationKind::State)
            .map(|(p, _)| p.name())
            .collect();
        assert_eq!(state, vec!["Title"]);

        let settings: Vec<_> = descriptor
            .annotated(AnnotationKind::Setting)
            .map(|(p, _)| p.name())
            .collect();
        assert_eq!(settings, vec!["Title", "Width"]);
    }

    #[test]
    fn test_no_action_disables_every_kind() {
        let descriptor = descriptor();
        let cache = descriptor.property("Cache").unwrap();

        assert_eq!(cache.annotations().len(), 2);
        assert!(cache.annotation(AnnotationKind::State).is_none());
        assert!(cache.annotation(AnnotationKind::NoAction).is_none());
    }

    #[test]
    fn test_reannotating_same_kind_replaces() {
        let descriptor = TypeDescriptor::builder("Panel")
            .field("Width", |p: &Panel| &p.width, |p| &mut p.width)
            .state(PolicyAnnotation::new())
            .state(PolicyAnnotation::new().with_default(5))
            .build()
            .unwrap();

        let width = descriptor.property("Width").unwrap();
        assert_eq!(width.annotations().len(), 1);
        let policy = width.annotation(AnnotationKind::State).unwrap().policy();
        assert_eq!(policy.default_value(), Some(&Value::I32(5)));
    }

    #[test]
    fn test_read_and_write_through_lenses() {
        let descriptor = descriptor();
        let width = descriptor.property("Width").unwrap();
        let mut panel = Panel::default();

        width.write(&mut panel, Slot::Value(Value::I32(640))).unwrap();
        assert_eq!(panel.width, 640);
        assert!(matches!(width.read(&panel).unwrap(), Slot::Value(Value::I32(640))));
        assert!(width.write(&mut panel, Slot::Null).is_err());
        assert_eq!(panel.width, 640);
    }

    #[test]
    fn test_duplicate_property_rejected() {
        let result = TypeDescriptor::builder("Panel")
            .field("Width", |p: &Panel| &p.width, |p| &mut p.width)
            .field("Width", |p: &Panel| &p.width, |p| &mut p.width)
            .build();

        assert!(matches!(result, Err(StateError::DuplicateProperty(name)) if name == "Width"));
    }

    #[test]
    fn test_default_scope() {
        assert_eq!(descriptor().default_scope().unwrap().as_str(), "Panel.");
    }
}
