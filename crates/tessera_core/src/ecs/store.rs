//! # Entity Store
//!
//! Owns entity indices, versions, the free list, per-entity masks and one
//! pool per component family in use.

use std::fmt;

use super::component::{Component, ComponentMask};
use super::entity::EntityId;
use super::family::Family;
use super::view::View;
use crate::config::StoreConfig;
use crate::event::{Event, EventSystem, LifecycleEvent, LifecycleKind};
use crate::memory::{AnyPool, ChunkedPool};

/// Container for entities and their components.
///
/// Entity indices are allocated by growing a counter or recycled from the
/// free list. Destroying an entity bumps its index's version and marks the
/// index dead, so every handle issued before the destroy stops being
/// [`valid`](Self::valid), and so does any handle rebuilt for a free index.
///
/// The store owns its [`EventSystem`]. An empty event system makes every
/// notification a no-op. Receivers get the store mutably and may change the
/// entity they are notified about.
///
/// # Example
///
/// ```rust,ignore
/// let mut store = EntityStore::new();
///
/// let id = store.create();
/// store.assign_from(id, Storage { group: 0, key: -1 });
/// assert!(store.has::<Storage>(id));
///
/// store.destroy(id);
/// assert!(!store.valid(id));
/// ```
pub struct EntityStore {
    /// One slot per family; `None` until a component of that family is assigned.
    pools: Vec<Option<Box<dyn AnyPool>>>,
    /// Component mask per entity index.
    masks: Vec<ComponentMask>,
    /// Current version per entity index.
    versions: Vec<u32>,
    /// Liveness per entity index; free indices are `false`.
    alive: Vec<bool>,
    /// Number of `true` entries in `alive`.
    alive_count: usize,
    /// Indices available for reuse.
    free_list: Vec<u32>,
    config: StoreConfig,
    events: EventSystem,
}

impl EntityStore {
    /// Creates an empty store with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Creates an empty store with the given configuration.
    #[must_use]
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            pools: Vec::new(),
            masks: Vec::new(),
            versions: Vec::new(),
            alive: Vec::new(),
            alive_count: 0,
            free_list: Vec::new(),
            config,
            events: EventSystem::new(),
        }
    }

    /// The configuration this store was built with.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Number of live entities.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.alive_count
    }

    /// Returns `true` if no entity is live.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.alive_count == 0
    }

    /// Number of indices ever allocated, live or free.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.versions.len()
    }

    /// The store's event system.
    #[inline]
    #[must_use]
    pub const fn events(&self) -> &EventSystem {
        &self.events
    }

    /// The store's event system, for registering receivers.
    #[inline]
    pub fn events_mut(&mut self) -> &mut EventSystem {
        &mut self.events
    }

    // =========================================================================
    // Entity lifecycle
    // =========================================================================

    /// Creates a new entity.
    ///
    /// Reuses a free index (keeping its current version) when one exists,
    /// otherwise allocates the next index at version 1.
    ///
    /// # Returns
    ///
    /// The new entity's ID, or [`EntityId::INVALID`] once
    /// `max_entities` indices are in use.
    pub fn create(&mut self) -> EntityId {
        if let Some(index) = self.free_list.pop() {
            self.alive[index as usize] = true;
            self.alive_count += 1;
            return EntityId::new(index, self.versions[index as usize]);
        }

        let next = self.versions.len();
        if next >= self.config.max_entities as usize {
            tracing::warn!(
                max_entities = self.config.max_entities,
                "entity index space exhausted"
            );
            return EntityId::INVALID;
        }

        #[allow(clippy::cast_possible_truncation)]
        let index = next as u32;
        self.versions.push(1);
        self.alive.push(true);
        self.alive_count += 1;
        self.masks.push(ComponentMask::EMPTY);
        EntityId::new(index, 1)
    }

    /// Destroys an entity after announcing
    /// [`LifecycleKind::BeforeEntityRemoved`].
    ///
    /// Every component the entity owns is reset to its default value, the
    /// index's version is bumped and the index is returned to the free list.
    ///
    /// A receiver that destroys the entity itself ends the destroy early.
    ///
    /// # Returns
    ///
    /// `true` if the entity was destroyed, `false` if the handle was stale.
    pub fn destroy(&mut self, id: EntityId) -> bool {
        if !self.valid(id) {
            return false;
        }
        self.notify(id, LifecycleEvent::entity(LifecycleKind::BeforeEntityRemoved));
        if self.valid(id) {
            self.release(id);
        }
        true
    }

    /// Destroys an entity without announcing it.
    ///
    /// # Returns
    ///
    /// `true` if the entity was destroyed, `false` if the handle was stale.
    pub fn destroy_silent(&mut self, id: EntityId) -> bool {
        if !self.valid(id) {
            return false;
        }
        self.release(id);
        true
    }

    fn release(&mut self, id: EntityId) {
        let index = id.index() as usize;
        let mask = self.masks[index];
        for family in mask.families() {
            if let Some(Some(pool)) = self.pools.get_mut(family) {
                pool.destroy(index);
            }
        }
        self.masks[index].reset();
        self.versions[index] = self.versions[index].wrapping_add(1);
        self.alive[index] = false;
        self.alive_count -= 1;
        self.free_list.push(id.index());
        tracing::trace!(entity = %id, "destroyed entity");
    }

    /// Returns `true` if the handle's index is live and its version matches.
    #[inline]
    #[must_use]
    pub fn valid(&self, id: EntityId) -> bool {
        let index = id.index() as usize;
        !id.is_invalid()
            && self.alive.get(index).copied().unwrap_or(false)
            && self.versions[index] == id.version()
    }

    /// Rebuilds the current handle for `index`.
    ///
    /// Returns [`EntityId::INVALID`] if the index was never allocated or is
    /// currently free.
    #[must_use]
    pub fn entity_id(&self, index: u32) -> EntityId {
        let slot = index as usize;
        if !self.alive.get(slot).copied().unwrap_or(false) {
            return EntityId::INVALID;
        }
        EntityId::new(index, self.versions[slot])
    }

    /// Drops every entity, pool and free index.
    ///
    /// Versions restart from 1, so handles issued before the clear may
    /// validate again against entities created after it.
    pub fn clear(&mut self) {
        self.pools.clear();
        self.masks.clear();
        self.versions.clear();
        self.alive.clear();
        self.alive_count = 0;
        self.free_list.clear();
        tracing::debug!("cleared entity store");
    }

    // =========================================================================
    // Components
    // =========================================================================

    /// Assigns a default-constructed `T`.
    ///
    /// See [`EntityStore::assign_with`].
    pub fn assign<T: Component>(&mut self, id: EntityId) -> Option<&mut T> {
        self.assign_with(id, |_| {})
    }

    /// Assigns `value` as the entity's `T`.
    ///
    /// See [`EntityStore::assign_with`].
    pub fn assign_from<T: Component>(&mut self, id: EntityId, value: T) -> Option<&mut T> {
        self.assign_with(id, |slot| *slot = value)
    }

    /// Assigns a `T`, reset to default and then passed through `init`, and
    /// announces [`LifecycleKind::ComponentAdded`].
    ///
    /// Assigning over an existing `T` overwrites it and announces the same
    /// event; adds and overwrites are not distinguished.
    ///
    /// # Returns
    ///
    /// The assigned component, or `None` if the handle is stale or a
    /// receiver removed the component again.
    pub fn assign_with<T, F>(&mut self, id: EntityId, init: F) -> Option<&mut T>
    where
        T: Component,
        F: FnOnce(&mut T),
    {
        if !self.valid(id) {
            return None;
        }
        let index = id.index() as usize;
        let family = T::family();

        let slot = self.pool_or_insert::<T>(family)?.get_mut(index)?;
        *slot = T::default();
        init(slot);
        self.masks[index].set(family);

        self.notify(id, LifecycleEvent::component(LifecycleKind::ComponentAdded, family));
        self.get_mut::<T>(id)
    }

    /// Removes the entity's `T` after announcing
    /// [`LifecycleKind::BeforeComponentRemoved`].
    ///
    /// # Returns
    ///
    /// `true` if a component was removed.
    pub fn remove<T: Component>(&mut self, id: EntityId) -> bool {
        if !self.has::<T>(id) {
            return false;
        }
        let index = id.index() as usize;
        let family = T::family();

        self.notify(id, LifecycleEvent::component(LifecycleKind::BeforeComponentRemoved, family));
        if !self.has::<T>(id) {
            return true;
        }
        self.masks[index].clear(family);
        if let Some(Some(pool)) = self.pools.get_mut(family.index()) {
            pool.destroy(index);
        }
        true
    }

    /// Gets the entity's `T`.
    #[must_use]
    pub fn get<T: Component>(&self, id: EntityId) -> Option<&T> {
        if !self.has::<T>(id) {
            return None;
        }
        self.pool::<T>()?.get(id.index() as usize)
    }

    /// Gets the entity's `T` mutably.
    pub fn get_mut<T: Component>(&mut self, id: EntityId) -> Option<&mut T> {
        if !self.has::<T>(id) {
            return None;
        }
        self.pool_mut::<T>()?.get_mut(id.index() as usize)
    }

    /// Returns `true` if the entity owns a `T`.
    #[inline]
    #[must_use]
    pub fn has<T: Component>(&self, id: EntityId) -> bool {
        self.component_mask(id)
            .is_some_and(|mask| mask.test(T::family()))
    }

    /// Returns `true` if the entity owns every listed family.
    #[must_use]
    pub fn has_all(&self, id: EntityId, families: &[Family]) -> bool {
        self.component_mask(id)
            .is_some_and(|mask| mask.contains_all(&ComponentMask::from_families(families)))
    }

    /// Returns `true` if the entity owns at least one listed family.
    #[must_use]
    pub fn has_any(&self, id: EntityId, families: &[Family]) -> bool {
        self.component_mask(id)
            .is_some_and(|mask| mask.contains_any(&ComponentMask::from_families(families)))
    }

    /// The entity's component mask, or `None` for a stale handle.
    #[inline]
    #[must_use]
    pub fn component_mask(&self, id: EntityId) -> Option<ComponentMask> {
        if !self.valid(id) {
            return None;
        }
        self.masks.get(id.index() as usize).copied()
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Live entities whose mask contains `required`.
    #[must_use]
    pub fn view(&self, required: ComponentMask) -> View<'_> {
        View::new(&self.masks, &self.versions, &self.alive, required)
    }

    /// Every live entity.
    #[must_use]
    pub fn view_all(&self) -> View<'_> {
        self.view(ComponentMask::EMPTY)
    }

    /// Calls `f` for every entity owning a `T`.
    pub fn each<T, F>(&self, mut f: F)
    where
        T: Component,
        F: FnMut(EntityId, &T),
    {
        let Some(pool) = self.pool::<T>() else {
            return;
        };
        for id in self.view(ComponentMask::of::<T>()) {
            if let Some(component) = pool.get(id.index() as usize) {
                f(id, component);
            }
        }
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Sends `event` to entity `id` through this store's event system.
    ///
    /// See [`EventSystem::dispatch`].
    pub fn send<E: Event>(&mut self, id: EntityId, event: &mut E) {
        EventSystem::dispatch(self, id, event);
    }

    fn notify(&mut self, id: EntityId, mut event: LifecycleEvent) {
        EventSystem::dispatch(self, id, &mut event);
    }

    // =========================================================================
    // Pools
    // =========================================================================

    fn pool<T: Component>(&self) -> Option<&ChunkedPool<T>> {
        self.pools
            .get(T::family().index())?
            .as_ref()?
            .as_any()
            .downcast_ref::<ChunkedPool<T>>()
    }

    fn pool_mut<T: Component>(&mut self) -> Option<&mut ChunkedPool<T>> {
        self.pools
            .get_mut(T::family().index())?
            .as_mut()?
            .as_any_mut()
            .downcast_mut::<ChunkedPool<T>>()
    }

    /// Returns the pool for `T`, creating it at the store's current capacity.
    fn pool_or_insert<T: Component>(&mut self, family: Family) -> Option<&mut ChunkedPool<T>> {
        let slot = family.index();
        if self.pools.len() <= slot {
            self.pools.resize_with(slot + 1, || None);
        }
        let chunk_len = self.config.chunk_len::<T>();
        let pool = self.pools[slot].get_or_insert_with(|| {
            tracing::debug!(
                family = %family,
                component = std::any::type_name::<T>(),
                chunk_len,
                "created component pool"
            );
            let pool: Box<dyn AnyPool> = Box::new(ChunkedPool::<T>::new(chunk_len));
            pool
        });
        pool.expand(self.versions.len());
        pool.as_any_mut().downcast_mut::<ChunkedPool<T>>()
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EntityStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityStore")
            .field("live", &self.len())
            .field("capacity", &self.capacity())
            .field("pools", &self.pools.iter().flatten().count())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
