//! Save and load passes.
//!
//! A pass walks every property of a [`TypeDescriptor`] that carries an
//! annotation of the requested kind and moves its value between the object
//! and a [`StateStore`] under `<scope><property>` keys.
//!
//! One bad property never stops the pass: it is logged, recorded in the
//! [`PassReport`] and the pass moves on. Only an error that affects the whole
//! store (see [`StateError::is_fatal`]) aborts it.

use autostate_models::{
    AnnotationKind, ElementKind, FundamentalKind, Item, PolicyAnnotation, ScopeId, Shape, Slot,
    Value,
};
use autostate_persistence::StateStore;
use tracing::{debug, error, warn};

use crate::classify::{can_be_null, coerce_from_string, is_fundamental};
use crate::codec::CollectionCodec;
use crate::config::EngineConfig;
use crate::descriptor::{PropertyDescriptor, TypeDescriptor};
use crate::error::{Result, StateError};
use crate::report::{PassKind, PassReport, PropertyOutcome, SkipReason};

/// The save/load engine.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
    codec: CollectionCodec,
}

impl Engine {
    pub fn new(mut config: EngineConfig) -> Self {
        let codec = CollectionCodec::new(config.delimiter, config.escape_elements);
        config.delimiter = codec.delimiter();
        Self { config, codec }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Writes every property of `target` annotated with `kind` to `store`.
    pub fn save<T: 'static, S: StateStore + ?Sized>(
        &self,
        target: &T,
        descriptor: &TypeDescriptor<T>,
        kind: AnnotationKind,
        store: &mut S,
        scope: &ScopeId,
    ) -> PassReport {
        let mut report = PassReport::new(PassKind::Save, scope.as_str(), kind);
        debug!(scope = %scope, kind = kind.name(), "save pass started");

        for (property, policy) in descriptor.annotated(kind) {
            let result = self.save_property(target, property, policy, store, scope);
            if !self.settle(&mut report, property.name(), result) {
                return report;
            }
        }

        debug!(
            scope = %scope,
            properties = report.outcomes().len(),
            "save pass finished"
        );
        report
    }

    /// Assigns every property of `target` annotated with `kind` from `store`.
    pub fn load<T: 'static, S: StateStore + ?Sized>(
        &self,
        target: &mut T,
        descriptor: &TypeDescriptor<T>,
        kind: AnnotationKind,
        store: &S,
        scope: &ScopeId,
    ) -> PassReport {
        let mut report = PassReport::new(PassKind::Load, scope.as_str(), kind);
        debug!(scope = %scope, kind = kind.name(), "load pass started");

        let saved = match store.scope_has_been_saved(scope.as_str()) {
            Ok(saved) => saved,
            Err(e) => {
                error!(scope = %scope, error = %e, "load pass aborted");
                report.abort(e.to_string());
                return report;
            }
        };

        for (property, policy) in descriptor.annotated(kind) {
            let result = self.load_property(target, property, policy, store, scope, saved);
            if !self.settle(&mut report, property.name(), result) {
                return report;
            }
        }

        debug!(
            scope = %scope,
            properties = report.outcomes().len(),
            scope_saved = saved,
            "load pass finished"
        );
        report
    }

    /// Records one property's result. Returns false if the pass must stop.
    fn settle(
        &self,
        report: &mut PassReport,
        property: &str,
        result: Result<PropertyOutcome>,
    ) -> bool {
        match result {
            Ok(outcome) => {
                report.record(property, outcome);
                true
            }
            Err(e) if e.is_fatal() => {
                error!(
                    scope = report.scope(),
                    property,
                    error = %e,
                    "{} pass aborted",
                    report.pass()
                );
                report.record(property, PropertyOutcome::Failed(e.to_string()));
                report.abort(e.to_string());
                false
            }
            Err(e) => {
                warn!(scope = report.scope(), property, error = %e, "property skipped");
                report.record(property, PropertyOutcome::Failed(e.to_string()));
                true
            }
        }
    }

    fn save_property<T, S: StateStore + ?Sized>(
        &self,
        target: &T,
        property: &PropertyDescriptor<T>,
        policy: &PolicyAnnotation,
        store: &mut S,
        scope: &ScopeId,
    ) -> Result<PropertyOutcome> {
        let name = property.name();
        match property.tag().shape() {
            Shape::Command => return Ok(PropertyOutcome::Skipped(SkipReason::Command)),
            Shape::Array { len, .. } => {
                warn!(scope = %scope, property = name, len, "fixed-size arrays are not persisted");
                return Ok(PropertyOutcome::Skipped(SkipReason::Array));
            }
            _ => {}
        }

        let slot = property
            .read(target)
            .map_err(|e| StateError::field(name, e))?;
        let key = scope.key_for(name);

        match slot {
            Slot::Null => {
                if let Some(default) = policy.default_value() {
                    self.write_entry(store, scope, &key, default.clone())?;
                    Ok(PropertyOutcome::SavedDefault)
                } else if policy.save_nulls && can_be_null(Some(property.tag())) {
                    self.write_entry(store, scope, &key, Value::Null)?;
                    Ok(PropertyOutcome::SavedNull)
                } else {
                    Ok(PropertyOutcome::Untouched)
                }
            }
            Slot::List(items) => {
                let text = self.codec.encode(items.iter().map(Item::to_text));
                self.write_entry(store, scope, &key, Value::String(text))?;
                Ok(PropertyOutcome::Saved)
            }
            Slot::Custom(custom) => {
                let text = custom.serialize_state();
                self.write_entry(store, scope, &key, Value::String(text))?;
                Ok(PropertyOutcome::Saved)
            }
            Slot::Value(value) => {
                self.write_entry(store, scope, &key, value)?;
                Ok(PropertyOutcome::Saved)
            }
        }
    }

    fn write_entry<S: StateStore + ?Sized>(
        &self,
        store: &mut S,
        scope: &ScopeId,
        key: &str,
        value: Value,
    ) -> Result<()> {
        if self.config.write_scope_marker {
            store.set(scope.marker_key(), Value::Bool(true))?;
        }
        store.set(key, value)?;
        Ok(())
    }

    fn load_property<T, S: StateStore + ?Sized>(
        &self,
        target: &mut T,
        property: &PropertyDescriptor<T>,
        policy: &PolicyAnnotation,
        store: &S,
        scope: &ScopeId,
        scope_saved: bool,
    ) -> Result<PropertyOutcome> {
        let name = property.name();
        match property.tag().shape() {
            Shape::Command => return Ok(PropertyOutcome::Skipped(SkipReason::Command)),
            Shape::Array { len, .. } => {
                warn!(scope = %scope, property = name, len, "fixed-size arrays are not restored");
                return Ok(PropertyOutcome::Skipped(SkipReason::Array));
            }
            _ => {}
        }

        // A stored null counts as no entry.
        let stored = if scope_saved {
            store
                .get(&scope.key_for(name))?
                .filter(|value| !value.is_null())
        } else {
            None
        };

        match stored {
            Some(value) => self.restore(target, property, scope, value),
            None => restore_missing(target, property, policy),
        }
    }

    fn restore<T>(
        &self,
        target: &mut T,
        property: &PropertyDescriptor<T>,
        scope: &ScopeId,
        value: Value,
    ) -> Result<PropertyOutcome> {
        let name = property.name();
        let slot = match property.tag().shape() {
            Shape::Collection(elements) => {
                let text = match value {
                    Value::String(text) => text,
                    other => {
                        warn!(
                            scope = %scope,
                            property = name,
                            found = other.type_name(),
                            "collection entry is not a flattened string"
                        );
                        return Ok(PropertyOutcome::Skipped(SkipReason::UnexpectedStoredValue));
                    }
                };
                let element = match elements.as_slice() {
                    [element] => element,
                    _ => {
                        warn!(
                            scope = %scope,
                            property = name,
                            element_types = elements.len(),
                            "collection element type is ambiguous"
                        );
                        return Ok(PropertyOutcome::Skipped(SkipReason::AmbiguousElementType(
                            elements.len(),
                        )));
                    }
                };
                Slot::List(self.decode_rows(name, element, &text))
            }
            Shape::Custom(custom) => {
                let text = match value {
                    Value::String(text) => text,
                    other => other.to_string(),
                };
                let mut instance = match property.read(target) {
                    Ok(Slot::Custom(existing)) => existing,
                    _ => custom.instantiate(),
                };
                if let Err(rejected) = instance.restore_state(&text) {
                    warn!(
                        scope = %scope,
                        property = name,
                        reason = rejected.reason(),
                        "stored state rejected"
                    );
                    return Ok(PropertyOutcome::Skipped(SkipReason::Rejected(
                        rejected.reason().to_string(),
                    )));
                }
                Slot::Custom(instance)
            }
            _ if is_fundamental(Some(property.tag())) && value.kind().is_none() => {
                warn!(
                    scope = %scope,
                    property = name,
                    found = value.type_name(),
                    "fundamental property holds a non-fundamental entry"
                );
                return Ok(PropertyOutcome::Skipped(SkipReason::UnexpectedStoredValue));
            }
            _ => Slot::from(value),
        };

        property
            .write(target, slot)
            .map_err(|e| StateError::field(name, e))?;
        Ok(PropertyOutcome::Restored)
    }

    /// Unflattens a stored collection. Rows that fail to coerce or are
    /// rejected are dropped.
    fn decode_rows(&self, property: &str, element: &ElementKind, text: &str) -> Vec<Item> {
        let rows = self.codec.decode(text);
        let mut items = Vec::with_capacity(rows.len());

        for row in rows {
            match element {
                ElementKind::Fundamental(FundamentalKind::String) => {
                    items.push(Item::Value(Value::String(row)));
                }
                ElementKind::Fundamental(kind) => match coerce_from_string(&row, *kind) {
                    Ok(value) => items.push(Item::Value(value)),
                    Err(e) => debug!(property, error = %e, "dropping collection row"),
                },
                ElementKind::Custom(custom) => {
                    let mut instance = custom.instantiate();
                    match instance.restore_state(&row) {
                        Ok(()) => items.push(Item::Custom(instance)),
                        Err(rejected) => debug!(
                            property,
                            reason = rejected.reason(),
                            "dropping rejected collection row"
                        ),
                    }
                }
            }
        }

        items
    }
}

fn restore_missing<T>(
    target: &mut T,
    property: &PropertyDescriptor<T>,
    policy: &PolicyAnnotation,
) -> Result<PropertyOutcome> {
    let name = property.name();

    if policy.restore_nulls && can_be_null(Some(property.tag())) {
        property
            .write(target, Slot::Null)
            .map_err(|e| StateError::field(name, e))?;
        return Ok(PropertyOutcome::RestoredNull);
    }

    if let Some(default) = policy.default_value() {
        property
            .write(target, Slot::from(default.clone()))
            .map_err(|e| StateError::field(name, e))?;
        return Ok(PropertyOutcome::RestoredDefault);
    }

    Ok(PropertyOutcome::Untouched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use autostate_persistence::MemoryStore;

    #[derive(Debug, Default)]
    struct Counter {
        count: i32,
        tags: Vec<String>,
        ratios: Vec<f64>,
        note: Option<String>,
    }

    fn descriptor() -> TypeDescriptor<Counter> {
        TypeDescriptor::builder("Counter")
            .field("Count", |c: &Counter| &c.count, |c| &mut c.count)
            .state(PolicyAnnotation::new().with_default(-1))
            .field("Tags", |c: &Counter| &c.tags, |c| &mut c.tags)
            .state(PolicyAnnotation::new())
            .field("Ratios", |c: &Counter| &c.ratios, |c| &mut c.ratios)
            .state(PolicyAnnotation::new())
            .field("Note", |c: &Counter| &c.note, |c| &mut c.note)
            .state(PolicyAnnotation::new().save_nulls())
            .build()
            .unwrap()
    }

    fn scope() -> ScopeId {
        ScopeId::for_name("Counter").unwrap()
    }

    #[test]
    fn test_save_writes_marker_and_entries() {
        let engine = Engine::default();
        let mut store = MemoryStore::new();
        let counter = Counter {
            count: 3,
            tags: vec!["a".into(), "b".into()],
            ..Counter::default()
        };

        let report = engine.save(&counter, &descriptor(), AnnotationKind::State, &mut store, &scope());

        assert!(report.is_success());
        assert_eq!(store.get("Counter.").unwrap(), Some(Value::Bool(true)));
        assert_eq!(store.get("Counter.Count").unwrap(), Some(Value::I32(3)));
        assert_eq!(store.get("Counter.Tags").unwrap(), Some(Value::from("a;b")));
        assert_eq!(store.get("Counter.Note").unwrap(), Some(Value::Null));
        assert_eq!(report.outcome("Note"), Some(&PropertyOutcome::SavedNull));
    }

    #[test]
    fn test_without_marker_only_properties_are_written() {
        let engine = Engine::new(EngineConfig::new().with_scope_marker(false));
        let mut store = MemoryStore::new();

        engine.save(&Counter::default(), &descriptor(), AnnotationKind::State, &mut store, &scope());

        assert!(!store.contains_key("Counter.").unwrap());
        assert!(store.contains_key("Counter.Count").unwrap());
    }

    #[test]
    fn test_unsaved_scope_ignores_stray_entries() {
        let engine = Engine::default();
        let store = MemoryStore::from_entries([("Other.Count", Value::I32(8))]);
        let mut counter = Counter::default();

        let report = engine.load(&mut counter, &descriptor(), AnnotationKind::State, &store, &scope());

        assert_eq!(counter.count, -1);
        assert_eq!(report.outcome("Count"), Some(&PropertyOutcome::RestoredDefault));
        assert_eq!(report.outcome("Tags"), Some(&PropertyOutcome::Untouched));
    }

    #[test]
    fn test_stored_null_counts_as_missing() {
        let engine = Engine::default();
        let store = MemoryStore::from_entries([
            ("Counter.", Value::Bool(true)),
            ("Counter.Count", Value::Null),
        ]);
        let mut counter = Counter::default();

        engine.load(&mut counter, &descriptor(), AnnotationKind::State, &store, &scope());

        assert_eq!(counter.count, -1);
    }

    #[test]
    fn test_decode_rows_drops_bad_numbers() {
        let engine = Engine::default();
        let store = MemoryStore::from_entries([
            ("Counter.", Value::Bool(true)),
            ("Counter.Ratios", Value::from("1.5;abc;2")),
        ]);
        let mut counter = Counter::default();

        let report = engine.load(&mut counter, &descriptor(), AnnotationKind::State, &store, &scope());

        assert_eq!(counter.ratios, vec![1.5, 2.0]);
        assert_eq!(report.outcome("Ratios"), Some(&PropertyOutcome::Restored));
    }

    #[test]
    fn test_collection_with_non_string_entry_is_skipped() {
        let engine = Engine::default();
        let store = MemoryStore::from_entries([
            ("Counter.", Value::Bool(true)),
            ("Counter.Tags", Value::I32(4)),
        ]);
        let mut counter = Counter {
            tags: vec!["keep".into()],
            ..Counter::default()
        };

        let report = engine.load(&mut counter, &descriptor(), AnnotationKind::State, &store, &scope());

        assert_eq!(counter.tags, vec!["keep"]);
        assert_eq!(
            report.outcome("Tags"),
            Some(&PropertyOutcome::Skipped(SkipReason::UnexpectedStoredValue))
        );
    }

    #[test]
    fn test_mismatched_scalar_fails_without_aborting() {
        let engine = Engine::default();
        let store = MemoryStore::from_entries([
            ("Counter.", Value::Bool(true)),
            ("Counter.Count", Value::from("seven")),
            ("Counter.Tags", Value::from("x")),
        ]);
        let mut counter = Counter::default();

        let report = engine.load(&mut counter, &descriptor(), AnnotationKind::State, &store, &scope());

        assert!(report.is_success());
        assert_eq!(counter.count, 0);
        assert!(matches!(report.outcome("Count"), Some(PropertyOutcome::Failed(_))));
        assert_eq!(counter.tags, vec!["x"]);
    }

    #[test]
    fn test_structured_entry_under_fundamental_property_is_skipped() {
        let engine = Engine::default();
        let store = MemoryStore::from_entries([
            ("Counter.", Value::Bool(true)),
            ("Counter.Count", Value::Structured(serde_json::json!({ "n": 3 }))),
        ]);
        let mut counter = Counter {
            count: 5,
            ..Counter::default()
        };

        let report = engine.load(&mut counter, &descriptor(), AnnotationKind::State, &store, &scope());

        assert_eq!(counter.count, 5);
        assert_eq!(
            report.outcome("Count"),
            Some(&PropertyOutcome::Skipped(SkipReason::UnexpectedStoredValue))
        );
    }

    #[test]
    fn test_escape_prefix_delimiter_falls_back_to_default() {
        let engine = Engine::new(EngineConfig {
            delimiter: '\\',
            ..EngineConfig::default()
        });
        assert_eq!(engine.config().delimiter, ';');

        let mut store = MemoryStore::new();
        let counter = Counter {
            tags: vec!["a".into(), "b".into(), "c".into()],
            ..Counter::default()
        };
        let saved = engine.save(&counter, &descriptor(), AnnotationKind::State, &mut store, &scope());
        assert!(saved.is_success());
        assert_eq!(store.get("Counter.Tags").unwrap(), Some(Value::from("a;b;c")));

        let mut restored = Counter::default();
        engine.load(&mut restored, &descriptor(), AnnotationKind::State, &store, &scope());
        assert_eq!(restored.tags, vec!["a", "b", "c"]);
    }
}
