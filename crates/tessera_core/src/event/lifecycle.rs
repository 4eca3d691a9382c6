//! Built-in lifecycle events raised by the store and the prefab builder.

use std::fmt;

use super::{Event, EventKey};
use crate::ecs::Family;

/// The lifecycle points an entity passes through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LifecycleKind {
    /// A builder created the entity and is about to copy the template in.
    BeforeEntityCreated,
    /// A builder finished populating the entity.
    AfterEntityCreated,
    /// The entity is about to start running.
    BeforeEntityRun,
    /// The entity is about to be destroyed.
    BeforeEntityRemoved,
    /// A component is about to be removed from the entity.
    BeforeComponentRemoved,
    /// A component was assigned to the entity.
    ComponentAdded,
}

impl LifecycleKind {
    /// Every kind, in lifecycle order.
    pub const ALL: [Self; 6] = [
        Self::BeforeEntityCreated,
        Self::AfterEntityCreated,
        Self::BeforeEntityRun,
        Self::BeforeEntityRemoved,
        Self::BeforeComponentRemoved,
        Self::ComponentAdded,
    ];

    /// Stable diagnostic name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::BeforeEntityCreated => "before_entity_created",
            Self::AfterEntityCreated => "after_entity_created",
            Self::BeforeEntityRun => "before_entity_run",
            Self::BeforeEntityRemoved => "before_entity_removed",
            Self::BeforeComponentRemoved => "before_component_removed",
            Self::ComponentAdded => "component_added",
        }
    }
}

impl fmt::Display for LifecycleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A lifecycle notification.
///
/// `component` names the family involved for the component-level kinds and
/// is `None` for the entity-level ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LifecycleEvent {
    /// Which lifecycle point this is.
    pub kind: LifecycleKind,
    /// Family added or removed, for component-level kinds.
    pub component: Option<Family>,
}

impl LifecycleEvent {
    /// An entity-level event.
    #[must_use]
    pub const fn entity(kind: LifecycleKind) -> Self {
        Self {
            kind,
            component: None,
        }
    }

    /// A component-level event.
    #[must_use]
    pub const fn component(kind: LifecycleKind, family: Family) -> Self {
        Self {
            kind,
            component: Some(family),
        }
    }
}

impl Event for LifecycleEvent {
    fn name(&self) -> &str {
        self.kind.name()
    }

    fn key(&self) -> EventKey {
        EventKey::Lifecycle(self.kind)
    }
}
