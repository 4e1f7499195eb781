//! Per-property policy annotations.

use crate::value::Value;

/// The kind of annotation a property carries.
///
/// A save or load pass runs for one kind and only touches properties carrying
/// that kind. `NoAction` opts a property out of every pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationKind {
    /// Transient view state.
    State,
    /// User settings.
    Setting,
    /// Explicitly ignored.
    NoAction,
}

impl AnnotationKind {
    pub fn name(&self) -> &'static str {
        match self {
            AnnotationKind::State => "state",
            AnnotationKind::Setting => "setting",
            AnnotationKind::NoAction => "no-action",
        }
    }
}

/// Default value and null handling for one annotated property.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PolicyAnnotation {
    /// Value used when the property is null on save, or missing on load.
    pub default_value: Option<Value>,
    /// Write an explicit null entry when the property is null.
    pub save_nulls: bool,
    /// Assign null when the store holds nothing for the property.
    pub restore_nulls: bool,
}

impl PolicyAnnotation {
    /// Creates a policy with no default and no null handling.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default value.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Enables saving nulls.
    pub fn save_nulls(mut self) -> Self {
        self.save_nulls = true;
        self
    }

    /// Enables restoring nulls.
    pub fn restore_nulls(mut self) -> Self {
        self.restore_nulls = true;
        self
    }

    /// Returns the default value unless it is absent or null.
    pub fn default_value(&self) -> Option<&Value> {
        self.default_value.as_ref().filter(|value| !value.is_null())
    }
}

/// An annotation attached to a property: its kind plus policy.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    kind: AnnotationKind,
    policy: PolicyAnnotation,
}

impl Annotation {
    pub fn new(kind: AnnotationKind, policy: PolicyAnnotation) -> Self {
        Self { kind, policy }
    }

    /// A persistent-state annotation.
    pub fn state(policy: PolicyAnnotation) -> Self {
        Self::new(AnnotationKind::State, policy)
    }

    /// A settings annotation.
    pub fn setting(policy: PolicyAnnotation) -> Self {
        Self::new(AnnotationKind::Setting, policy)
    }

    /// The opt-out annotation. It carries a policy like any other but is
    /// never acted upon.
    pub fn no_action() -> Self {
        Self::new(AnnotationKind::NoAction, PolicyAnnotation::default())
    }

    pub fn kind(&self) -> AnnotationKind {
        self.kind
    }

    pub fn policy(&self) -> &PolicyAnnotation {
        &self.policy
    }

    pub fn is_no_action(&self) -> bool {
        self.kind == AnnotationKind::NoAction
    }
}
