//! # Prefab Builder
//!
//! Loads named entity templates from JSON payloads into a private store and
//! produces live entities in a destination store by cloning a template and
//! optionally overriding some of its components.
//!
//! A template, once loaded, never changes. Data reaches the destination
//! store only through per-component structural copies.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};
use tessera_core::{Component, EntityId, EntityStore, LifecycleEvent, LifecycleKind, StoreConfig};

use crate::error::{PrefabError, PrefabResult};
use crate::registry::{ReflectionRegistry, Reflector};

/// A loaded template: one entity in the builder's store plus the reflectors
/// of its components, in payload order.
pub struct Prefab {
    entity: EntityId,
    components: Vec<Arc<dyn Reflector>>,
}

impl Prefab {
    /// The template entity inside the builder's private store.
    #[inline]
    #[must_use]
    pub const fn entity(&self) -> EntityId {
        self.entity
    }

    /// Component names in payload order.
    pub fn component_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.components.iter().map(|r| r.name())
    }

    /// Number of components the template carries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns `true` if the template carries no component.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl fmt::Debug for Prefab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Prefab")
            .field("entity", &self.entity)
            .field("components", &self.component_names().collect::<Vec<_>>())
            .finish()
    }
}

/// A set of typed component values applied to one entity.
///
/// Implemented for tuples of up to eight components.
pub trait Bundle {
    /// Assigns every component, announcing each as added.
    fn assign_all(self, store: &mut EntityStore, id: EntityId);

    /// Overwrites components the entity already owns in place and assigns
    /// the rest.
    fn overwrite_all(self, store: &mut EntityStore, id: EntityId);
}

fn overwrite<T: Component>(store: &mut EntityStore, id: EntityId, value: T) {
    match store.get_mut::<T>(id) {
        Some(slot) => *slot = value,
        None => {
            store.assign_from(id, value);
        }
    }
}

macro_rules! impl_bundle {
    ($($name:ident),+) => {
        impl<$($name: Component),+> Bundle for ($($name,)+) {
            #[allow(non_snake_case)]
            fn assign_all(self, store: &mut EntityStore, id: EntityId) {
                let ($($name,)+) = self;
                $( store.assign_from(id, $name); )+
            }

            #[allow(non_snake_case)]
            fn overwrite_all(self, store: &mut EntityStore, id: EntityId) {
                let ($($name,)+) = self;
                $( overwrite(store, id, $name); )+
            }
        }
    };
}

impl_bundle!(A);
impl_bundle!(A, B);
impl_bundle!(A, B, C);
impl_bundle!(A, B, C, D);
impl_bundle!(A, B, C, D, E);
impl_bundle!(A, B, C, D, E, F);
impl_bundle!(A, B, C, D, E, F, G);
impl_bundle!(A, B, C, D, E, F, G, H);

/// Prefab template library.
///
/// The builder owns a private [`EntityStore`] that holds one entity per
/// template. Destination stores are passed to each call.
///
/// # Example
///
/// ```rust,ignore
/// let mut builder = Builder::new(Arc::new(registry));
/// builder.load_prefab("block", r#"{"Storage": {"group": 0, "key": -1}}"#)?;
///
/// let mut world = EntityStore::new();
/// let block = builder.instantiate(&mut world, "block");
/// let moved = builder.extend_prefab(&mut world, "block", [("Storage", r#"{"group": 5}"#)])?;
/// ```
pub struct Builder {
    source: EntityStore,
    registry: Arc<ReflectionRegistry>,
    templates: HashMap<String, Prefab>,
}

impl Builder {
    /// Creates an empty builder resolving component names through `registry`.
    #[must_use]
    pub fn new(registry: Arc<ReflectionRegistry>) -> Self {
        Self::with_config(registry, StoreConfig::default())
    }

    /// Creates an empty builder whose private store uses `config`.
    #[must_use]
    pub fn with_config(registry: Arc<ReflectionRegistry>, config: StoreConfig) -> Self {
        Self {
            source: EntityStore::with_config(config),
            registry,
            templates: HashMap::new(),
        }
    }

    /// The registry used to resolve component names.
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &ReflectionRegistry {
        &self.registry
    }

    /// The private store holding template entities.
    #[inline]
    #[must_use]
    pub const fn source(&self) -> &EntityStore {
        &self.source
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Loads a prefab from a JSON object keyed by component name.
    ///
    /// Empty content is ignored. Component names missing from the registry
    /// are logged and skipped.
    ///
    /// # Errors
    ///
    /// - [`PrefabError::AlreadyLoaded`] if `name` is taken
    /// - [`PrefabError::Codec`] if `content` is not valid JSON
    /// - [`PrefabError::NotAnObject`] if the payload is not an object
    /// - [`PrefabError::Component`] if a component payload cannot be read
    /// - [`PrefabError::Exhausted`] if the private store is full
    ///
    /// Nothing is recorded when an error is returned.
    pub fn load_prefab(&mut self, name: &str, content: &str) -> PrefabResult<()> {
        if content.trim().is_empty() {
            tracing::debug!(prefab = name, "empty prefab content, nothing loaded");
            return Ok(());
        }
        if self.templates.contains_key(name) {
            return Err(PrefabError::AlreadyLoaded(name.to_string()));
        }

        let payload: Value = serde_json::from_str(content).map_err(|source| PrefabError::Codec {
            prefab: name.to_string(),
            source,
        })?;
        let Value::Object(components) = payload else {
            return Err(PrefabError::NotAnObject {
                prefab: name.to_string(),
            });
        };

        let entity = self.source.create();
        if entity.is_invalid() {
            return Err(PrefabError::Exhausted(name.to_string()));
        }

        let mut recorded = Vec::with_capacity(components.len());
        for (component, value) in &components {
            let Some(reflector) = self.registry.get(component) else {
                tracing::warn!(prefab = name, component = %component, "unknown component, skipped");
                continue;
            };
            reflector.assign(&mut self.source, entity);
            if let Err(source) = reflector.parse_value(&mut self.source, entity, value) {
                self.source.destroy_silent(entity);
                return Err(PrefabError::Component {
                    prefab: name.to_string(),
                    component: component.clone(),
                    source,
                });
            }
            recorded.push(Arc::clone(reflector));
        }

        tracing::info!(prefab = name, components = recorded.len(), "loaded prefab");
        self.templates.insert(
            name.to_string(),
            Prefab {
                entity,
                components: recorded,
            },
        );
        Ok(())
    }

    /// Returns `true` if `name` is loaded.
    #[inline]
    #[must_use]
    pub fn has_prefab(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// The template loaded under `name`.
    #[must_use]
    pub fn template(&self, name: &str) -> Option<&Prefab> {
        self.templates.get(name)
    }

    /// Loaded prefab names, sorted.
    #[must_use]
    pub fn prefab_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.templates.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Writes a template back out as a JSON object, components in payload
    /// order.
    #[must_use]
    pub fn dump_prefab(&self, name: &str) -> Option<String> {
        let prefab = self.templates.get(name)?;
        let mut object = Map::new();
        for reflector in &prefab.components {
            if let Some(value) = reflector.emit(&self.source, prefab.entity) {
                object.insert(reflector.name().to_string(), value);
            }
        }
        serde_json::to_string(&Value::Object(object)).ok()
    }

    // =========================================================================
    // Instantiation
    // =========================================================================

    /// Creates an entity in `dest` carrying a copy of every template component.
    ///
    /// Announces [`LifecycleKind::BeforeEntityCreated`] before copying. The
    /// created/run pair is left to the caller.
    ///
    /// # Returns
    ///
    /// The new entity, or [`EntityId::INVALID`] for an unknown prefab or a
    /// full destination store.
    pub fn clone_prefab(&self, dest: &mut EntityStore, name: &str) -> EntityId {
        let Some(prefab) = self.templates.get(name) else {
            tracing::warn!(prefab = name, "unknown prefab");
            return EntityId::INVALID;
        };

        let id = dest.create();
        if id.is_invalid() {
            return id;
        }
        dest.send(id, &mut LifecycleEvent::entity(LifecycleKind::BeforeEntityCreated));
        for reflector in &prefab.components {
            reflector.copy_component(&self.source, prefab.entity, dest, id);
        }
        id
    }

    /// Clones a prefab and announces it created and about to run.
    ///
    /// # Returns
    ///
    /// The new entity, or [`EntityId::INVALID`] for an unknown prefab.
    pub fn instantiate(&self, dest: &mut EntityStore, name: &str) -> EntityId {
        let id = self.clone_prefab(dest, name);
        if !id.is_invalid() {
            Self::finish(dest, id);
        }
        id
    }

    /// Clones a prefab, applies JSON overrides, and announces the entity.
    ///
    /// Each override maps a component name to a payload fragment. A
    /// component the template lacks is assigned before the fragment is
    /// read. Unknown names are logged and skipped. Template components not
    /// mentioned keep their cloned values.
    ///
    /// # Errors
    ///
    /// Returns [`PrefabError::Component`] if a fragment cannot be read; the
    /// half-built entity is destroyed and announced as removed, so receivers
    /// that saw it created also see it go.
    ///
    /// An unknown prefab is not an error: the result is
    /// `Ok(EntityId::INVALID)`.
    pub fn extend_prefab<I, K, V>(&self, dest: &mut EntityStore, name: &str, overrides: I) -> PrefabResult<EntityId>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let id = self.extend_prefab_silent(dest, name, overrides)?;
        if !id.is_invalid() {
            Self::finish(dest, id);
        }
        Ok(id)
    }

    /// [`Builder::extend_prefab`] without the created/run announcements.
    ///
    /// # Errors
    ///
    /// As [`Builder::extend_prefab`].
    pub fn extend_prefab_silent<I, K, V>(
        &self,
        dest: &mut EntityStore,
        name: &str,
        overrides: I,
    ) -> PrefabResult<EntityId>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let id = self.clone_prefab(dest, name);
        if id.is_invalid() {
            return Ok(id);
        }

        for (component, payload) in overrides {
            let component = component.as_ref();
            let Some(reflector) = self.registry.get(component) else {
                tracing::warn!(prefab = name, component, "unknown override component, skipped");
                continue;
            };
            if !reflector.has(dest, id) {
                reflector.assign(dest, id);
            }
            if let Err(source) = reflector.parse(dest, id, payload.as_ref()) {
                dest.destroy(id);
                return Err(PrefabError::Component {
                    prefab: name.to_string(),
                    component: component.to_string(),
                    source,
                });
            }
        }
        Ok(id)
    }

    /// Clones a prefab and writes typed components over it.
    ///
    /// Components the clone already carries are overwritten in place; the
    /// rest are assigned.
    pub fn extend<B: Bundle>(&self, dest: &mut EntityStore, name: &str, bundle: B) -> EntityId {
        let id = self.clone_prefab(dest, name);
        if !id.is_invalid() {
            bundle.overwrite_all(dest, id);
            Self::finish(dest, id);
        }
        id
    }

    /// Clones a prefab and assigns one typed component.
    pub fn extend_assign<T: Component>(&self, dest: &mut EntityStore, name: &str, component: T) -> EntityId {
        let id = self.clone_prefab(dest, name);
        if !id.is_invalid() {
            dest.assign_from(id, component);
            Self::finish(dest, id);
        }
        id
    }

    /// Clones a prefab and assigns every component of a bundle.
    pub fn extend_assigns<B: Bundle>(&self, dest: &mut EntityStore, name: &str, bundle: B) -> EntityId {
        let id = self.clone_prefab(dest, name);
        if !id.is_invalid() {
            bundle.assign_all(dest, id);
            Self::finish(dest, id);
        }
        id
    }

    fn finish(dest: &mut EntityStore, id: EntityId) {
        dest.send(id, &mut LifecycleEvent::entity(LifecycleKind::AfterEntityCreated));
        dest.send(id, &mut LifecycleEvent::entity(LifecycleKind::BeforeEntityRun));
    }
}

impl fmt::Debug for Builder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builder")
            .field("prefabs", &self.prefab_names())
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
