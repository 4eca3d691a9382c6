//! # Reflection Registry
//!
//! Name-keyed, type-erased component operations. The builder resolves
//! payload keys through this table, so it never needs concrete types.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value;
use tessera_core::{Component, EntityId, EntityStore, Family};

use crate::error::ReflectResult;
use crate::reflect::Reflect;

/// Component operations reachable by name.
pub trait Reflector: Send + Sync {
    /// Registered name.
    fn name(&self) -> &str;

    /// Family of the component type.
    fn family(&self) -> Family;

    /// Whether `id` owns this component.
    fn has(&self, store: &EntityStore, id: EntityId) -> bool;

    /// Attaches a default-constructed component.
    ///
    /// Returns `false` for a stale handle.
    fn assign(&self, store: &mut EntityStore, id: EntityId) -> bool;

    /// Parses `payload` as JSON and reads it into the entity's component.
    ///
    /// # Errors
    ///
    /// Returns [`ReflectError::Codec`](crate::ReflectError::Codec) for
    /// malformed text, otherwise as [`Reflector::parse_value`].
    fn parse(&self, store: &mut EntityStore, id: EntityId, payload: &str) -> ReflectResult<()> {
        let value: Value = serde_json::from_str(payload)?;
        self.parse_value(store, id, &value)
    }

    /// Reads `value` into the entity's existing component.
    ///
    /// Does nothing if the entity lacks the component; assign it first.
    ///
    /// # Errors
    ///
    /// Returns the field error from [`Visit::read`](crate::Visit::read).
    fn parse_value(&self, store: &mut EntityStore, id: EntityId, value: &Value) -> ReflectResult<()>;

    /// Copies the component from `from` in `source` onto `to` in `dest`.
    ///
    /// The destination component is assigned, so `dest` announces it as
    /// added once the copy is complete. Returns `false` if `from` lacks the
    /// component or `to` is stale.
    fn copy_component(&self, source: &EntityStore, from: EntityId, dest: &mut EntityStore, to: EntityId) -> bool;

    /// Writes the entity's component as JSON.
    fn emit(&self, store: &EntityStore, id: EntityId) -> Option<Value>;
}

/// [`Reflector`] for a concrete component type.
pub struct ComponentReflector<T> {
    name: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Component + Reflect> ComponentReflector<T> {
    /// Creates a reflector registered under `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            _marker: PhantomData,
        }
    }
}

impl<T: Component + Reflect> Reflector for ComponentReflector<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn family(&self) -> Family {
        T::family()
    }

    fn has(&self, store: &EntityStore, id: EntityId) -> bool {
        store.has::<T>(id)
    }

    fn assign(&self, store: &mut EntityStore, id: EntityId) -> bool {
        store.assign::<T>(id).is_some()
    }

    fn parse_value(&self, store: &mut EntityStore, id: EntityId, value: &Value) -> ReflectResult<()> {
        match store.get_mut::<T>(id) {
            Some(component) => component.read(value),
            None => {
                tracing::debug!(component = %self.name, entity = %id, "parse target missing, skipped");
                Ok(())
            }
        }
    }

    fn copy_component(&self, source: &EntityStore, from: EntityId, dest: &mut EntityStore, to: EntityId) -> bool {
        let Some(component) = source.get::<T>(from) else {
            return false;
        };
        dest.assign_with(to, |slot: &mut T| slot.copy_from(component))
            .is_some()
    }

    fn emit(&self, store: &EntityStore, id: EntityId) -> Option<Value> {
        store.get::<T>(id).map(T::write)
    }
}

impl<T> fmt::Debug for ComponentReflector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentReflector")
            .field("name", &self.name)
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

/// Table of [`Reflector`]s keyed by component name.
///
/// Registration also assigns the component's family, so registering every
/// type in a fixed order before any store is used gives a deterministic
/// family numbering.
///
/// # Example
///
/// ```rust,ignore
/// let mut registry = ReflectionRegistry::new();
/// registry.register::<Storage>("Storage");
/// registry.register::<Sprite>("Sprite");
/// let builder = Builder::new(Arc::new(registry));
/// ```
#[derive(Default)]
pub struct ReflectionRegistry {
    entries: HashMap<String, Arc<dyn Reflector>>,
}

impl ReflectionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `T` under `name`.
    ///
    /// The first registration of a name wins; later ones are ignored. A
    /// component type is reachable under one name only, so registering it
    /// again under another name is ignored too.
    ///
    /// # Returns
    ///
    /// `true` if both the name and the type were free.
    pub fn register<T: Component + Reflect>(&mut self, name: impl Into<String>) -> bool {
        let _ = Family::declare::<T>();
        self.register_reflector(Arc::new(ComponentReflector::<T>::new(name)))
    }

    /// Registers a prebuilt reflector under its own name.
    ///
    /// # Returns
    ///
    /// `true` if both the name and the reflector's family were free.
    pub fn register_reflector(&mut self, reflector: Arc<dyn Reflector>) -> bool {
        let name = reflector.name().to_string();
        if self.entries.contains_key(&name) {
            tracing::warn!(component = %name, "component name already registered, keeping the first");
            return false;
        }
        let family = reflector.family();
        if let Some(existing) = self.entries.values().find(|entry| entry.family() == family) {
            tracing::warn!(
                component = %name,
                registered_as = existing.name(),
                family = %family,
                "component type already registered under another name"
            );
            return false;
        }
        tracing::debug!(component = %name, family = %reflector.family(), "registered component");
        self.entries.insert(name, reflector);
        true
    }

    /// Looks up a reflector by component name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Reflector>> {
        self.entries.get(name)
    }

    /// Returns `true` if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for ReflectionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReflectionRegistry")
            .field("names", &self.names())
            .finish()
    }
}
