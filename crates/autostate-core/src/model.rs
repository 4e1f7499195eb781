//! Binding between a model and the shared store it persists to.

use std::cell::RefCell;
use std::rc::Rc;

use autostate_models::{AnnotationKind, ScopeId, Slot, Value};
use autostate_persistence::StateStore;
use tracing::error;

use crate::config::EngineConfig;
use crate::descriptor::TypeDescriptor;
use crate::engine::Engine;
use crate::error::{Result, StateError};
use crate::field::StateField;
use crate::report::{PassKind, PassReport};

/// A type with a registered descriptor table.
///
/// Implementations build the table once and hand out a `'static` reference:
///
/// ```ignore
/// impl StateModel for MainViewModel {
///     fn descriptor() -> &'static TypeDescriptor<Self> {
///         static DESCRIPTOR: OnceLock<TypeDescriptor<MainViewModel>> = OnceLock::new();
///         DESCRIPTOR.get_or_init(|| {
///             TypeDescriptor::builder("MainViewModel")
///                 .field("Title", |m: &MainViewModel| &m.title, |m| &mut m.title)
///                 .state(PolicyAnnotation::new())
///                 .build()
///                 .expect("MainViewModel descriptor")
///         })
///     }
/// }
/// ```
pub trait StateModel: Sized + 'static {
    fn descriptor() -> &'static TypeDescriptor<Self>;
}

/// The persistence identity of one owning object: its scope prefix and the
/// shared store it was bound to at construction.
///
/// The store is shared by every binding in the application and used from a
/// single thread. Passes must not overlap; a binding that finds the store
/// already borrowed reports [`StateError::StoreBusy`].
#[derive(Debug)]
pub struct StateBinding<S> {
    scope: ScopeId,
    store: Rc<RefCell<S>>,
    engine: Engine,
}

impl<S: StateStore> StateBinding<S> {
    /// Binds `scope` to `store` with an engine configured from the
    /// environment.
    pub fn new(scope: ScopeId, store: Rc<RefCell<S>>) -> Self {
        Self {
            scope,
            store,
            engine: Engine::new(EngineConfig::from_env()),
        }
    }

    /// Binds a model using the scope derived from its type key.
    pub fn for_model<M: StateModel>(store: Rc<RefCell<S>>) -> Result<Self> {
        let scope = M::descriptor().default_scope()?;
        Ok(Self::new(scope, store))
    }

    /// Replaces the engine, e.g. to change the collection delimiter.
    pub fn with_engine(mut self, engine: Engine) -> Self {
        self.engine = engine;
        self
    }

    pub fn scope(&self) -> &ScopeId {
        &self.scope
    }

    pub fn store(&self) -> &Rc<RefCell<S>> {
        &self.store
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Returns true if anything has been saved under this scope.
    pub fn state_exists(&self) -> Result<bool> {
        let store = self.store.try_borrow().map_err(|_| StateError::StoreBusy)?;
        Ok(store.scope_has_been_saved(self.scope.as_str())?)
    }

    /// Writes a single named item under this scope.
    pub fn set_state_item(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        let mut store = self
            .store
            .try_borrow_mut()
            .map_err(|_| StateError::StoreBusy)?;

        if self.engine.config().write_scope_marker {
            store.set(self.scope.marker_key(), Value::Bool(true))?;
        }
        store.set(&self.scope.key_for(name), value.into())?;
        Ok(())
    }

    /// Reads a single named item, or `None` if nothing is stored.
    pub fn get_state_item(&self, name: &str) -> Result<Option<Value>> {
        let store = self.store.try_borrow().map_err(|_| StateError::StoreBusy)?;
        Ok(store.get(&self.scope.key_for(name))?)
    }

    /// Reads a single named item, falling back to `default`.
    pub fn get_state_item_or(&self, name: &str, default: impl Into<Value>) -> Result<Value> {
        Ok(self
            .get_state_item(name)?
            .unwrap_or_else(|| default.into()))
    }

    /// Reads a single named item as a typed fundamental or structured value.
    pub fn get_state<T: StateField>(&self, name: &str) -> Result<Option<T>> {
        match self.get_state_item(name)? {
            Some(value) => T::from_slot(Slot::from(value))
                .map(Some)
                .map_err(|e| StateError::field(name, e)),
            None => Ok(None),
        }
    }

    /// Saves every property of `model` annotated with `kind`.
    pub fn save_auto<M: StateModel>(&self, model: &M, kind: AnnotationKind) -> PassReport {
        match self.store.try_borrow_mut() {
            Ok(mut store) => {
                self.engine
                    .save(model, M::descriptor(), kind, &mut *store, &self.scope)
            }
            Err(_) => self.busy(PassKind::Save, kind),
        }
    }

    /// Loads every property of `model` annotated with `kind`.
    pub fn load_auto<M: StateModel>(&self, model: &mut M, kind: AnnotationKind) -> PassReport {
        match self.store.try_borrow() {
            Ok(store) => self
                .engine
                .load(model, M::descriptor(), kind, &*store, &self.scope),
            Err(_) => self.busy(PassKind::Load, kind),
        }
    }

    fn busy(&self, pass: PassKind, kind: AnnotationKind) -> PassReport {
        let reason = StateError::StoreBusy.to_string();
        error!(scope = %self.scope, error = %reason, "{} pass aborted", pass);
        PassReport::aborted(pass, self.scope.as_str(), kind, reason)
    }
}
