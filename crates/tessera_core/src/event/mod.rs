//! # Event System
//!
//! Typed, priority-ordered dispatch of events targeted at one entity.
//!
//! ## Design Philosophy
//!
//! - Receivers are keyed by event type, then by subscriber type
//! - Lower [`Priority`] dispatches first; ties keep registration order
//! - Consumable events stop at the first receiver that consumes them
//! - Built-in lifecycle kinds share one table with user events

mod lifecycle;
mod requirement;
mod system;

use std::any::{type_name, Any, TypeId};

pub use lifecycle::{LifecycleEvent, LifecycleKind};
pub use requirement::Requirement;
pub use system::{EventSystem, Priority};

/// Identifies which receiver list an event is delivered to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKey {
    /// One of the built-in lifecycle kinds.
    Lifecycle(LifecycleKind),
    /// A user event type.
    Typed(TypeId),
}

/// One-shot consumed flag carried by consumable events.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Consumption {
    consumed: bool,
}

impl Consumption {
    /// Marks the event consumed; no later receiver will see it.
    #[inline]
    pub fn consume(&mut self) {
        self.consumed = true;
    }

    /// Whether a receiver consumed the event.
    #[inline]
    #[must_use]
    pub const fn is_consumed(&self) -> bool {
        self.consumed
    }

    /// Clears the flag. Dispatch does this before the first receiver runs.
    #[inline]
    pub fn reset(&mut self) {
        self.consumed = false;
    }
}

/// A value that can be sent to an entity through an [`EventSystem`].
///
/// Plain events only need an empty impl. Consumable events hold a
/// [`Consumption`] and return it from [`Event::consumption`].
///
/// # Example
///
/// ```rust,ignore
/// struct Touched {
///     consumption: Consumption,
/// }
///
/// impl Event for Touched {
///     fn consumption(&mut self) -> Option<&mut Consumption> {
///         Some(&mut self.consumption)
///     }
/// }
/// ```
pub trait Event: Any {
    /// Human-readable name used in diagnostics.
    fn name(&self) -> &str {
        type_name::<Self>()
    }

    /// Receiver list this event is delivered to.
    fn key(&self) -> EventKey {
        EventKey::Typed(TypeId::of::<Self>())
    }

    /// The consumed flag, for consumable events.
    fn consumption(&mut self) -> Option<&mut Consumption> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;
    impl Event for Plain {}

    #[test]
    fn test_default_key_and_name() {
        let mut event = Plain;
        assert_eq!(event.key(), EventKey::Typed(TypeId::of::<Plain>()));
        assert!(event.name().ends_with("Plain"));
        assert!(event.consumption().is_none());
    }

    #[test]
    fn test_consumption_flag() {
        let mut flag = Consumption::default();
        assert!(!flag.is_consumed());
        flag.consume();
        assert!(flag.is_consumed());
        flag.reset();
        assert!(!flag.is_consumed());
    }
}
