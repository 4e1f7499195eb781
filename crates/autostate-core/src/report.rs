//! Outcome of a save or load pass.

use std::fmt;

use autostate_models::AnnotationKind;

/// Which pass produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    Save,
    Load,
}

impl fmt::Display for PassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassKind::Save => write!(f, "save"),
            PassKind::Load => write!(f, "load"),
        }
    }
}

/// Why a property was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Commands are not data.
    Command,
    /// Raw fixed-size arrays are not supported.
    Array,
    /// The collection does not have exactly one element type.
    AmbiguousElementType(usize),
    /// The self-describing value refused the stored text.
    Rejected(String),
    /// The stored entry does not have the shape the property needs.
    UnexpectedStoredValue,
}

/// What happened to one property during a pass.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyOutcome {
    /// The current value was written.
    Saved,
    /// The property was null and its default was written instead.
    SavedDefault,
    /// An explicit null entry was written.
    SavedNull,
    /// The stored value was assigned.
    Restored,
    /// No entry existed and the default was assigned.
    RestoredDefault,
    /// No entry existed and null was assigned.
    RestoredNull,
    /// Nothing was written or assigned.
    Untouched,
    Skipped(SkipReason),
    /// The property could not be read, written or assigned.
    Failed(String),
}

impl PropertyOutcome {
    /// Returns true if the pass wrote to the store or the object for this
    /// property.
    pub fn is_applied(&self) -> bool {
        !matches!(
            self,
            PropertyOutcome::Untouched | PropertyOutcome::Skipped(_) | PropertyOutcome::Failed(_)
        )
    }
}

/// Per-property record of a save or load pass.
///
/// A pass succeeds unless it was aborted by an error that affects the whole
/// store. Skipped and failed properties do not make a pass fail.
#[derive(Debug, Clone, PartialEq)]
pub struct PassReport {
    pass: PassKind,
    scope: String,
    kind: AnnotationKind,
    outcomes: Vec<(String, PropertyOutcome)>,
    aborted: Option<String>,
}

impl PassReport {
    pub fn new(pass: PassKind, scope: impl Into<String>, kind: AnnotationKind) -> Self {
        Self {
            pass,
            scope: scope.into(),
            kind,
            outcomes: Vec::new(),
            aborted: None,
        }
    }

    /// Creates a report for a pass that never started.
    pub fn aborted(
        pass: PassKind,
        scope: impl Into<String>,
        kind: AnnotationKind,
        reason: impl Into<String>,
    ) -> Self {
        let mut report = Self::new(pass, scope, kind);
        report.abort(reason);
        report
    }

    pub(crate) fn record(&mut self, property: &str, outcome: PropertyOutcome) {
        self.outcomes.push((property.to_string(), outcome));
    }

    pub(crate) fn abort(&mut self, reason: impl Into<String>) {
        self.aborted = Some(reason.into());
    }

    pub fn pass(&self) -> PassKind {
        self.pass
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn kind(&self) -> AnnotationKind {
        self.kind
    }

    /// Returns true if the pass ran to completion.
    pub fn is_success(&self) -> bool {
        self.aborted.is_none()
    }

    /// The error that aborted the pass, if any.
    pub fn abort_reason(&self) -> Option<&str> {
        self.aborted.as_deref()
    }

    /// Outcomes in the order properties were visited.
    pub fn outcomes(&self) -> &[(String, PropertyOutcome)] {
        &self.outcomes
    }

    pub fn outcome(&self, property: &str) -> Option<&PropertyOutcome> {
        self.outcomes
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, outcome)| outcome)
    }

    /// Names of the properties that failed.
    pub fn failed(&self) -> impl Iterator<Item = &str> {
        self.outcomes.iter().filter_map(|(name, outcome)| match outcome {
            PropertyOutcome::Failed(_) => Some(name.as_str()),
            _ => None,
        })
    }
}
