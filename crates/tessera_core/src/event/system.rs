//! Receiver tables and dispatch.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use super::{Event, EventKey, LifecycleEvent, LifecycleKind, Requirement};
use crate::ecs::{EntityId, EntityStore};

/// Dispatch priority. Lower values run first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    /// Runs before everything else.
    Critical,
    /// Runs before normal receivers.
    High,
    /// The default.
    #[default]
    Normal,
    /// Runs after normal receivers.
    Low,
    /// Runs last.
    Trivial,
}

type Callback = Rc<dyn Fn(&mut EntityStore, EntityId, &mut dyn Any)>;

/// One registered receiver.
struct Receiver {
    subscriber: TypeId,
    subscriber_name: &'static str,
    priority: Priority,
    requirement: Requirement,
    callback: Callback,
}

/// Receiver tables for one entity store.
///
/// Each event key holds at most one receiver per subscriber type;
/// registering again for the same pair replaces the earlier receiver.
/// Callbacks receive the store mutably.
#[derive(Default)]
pub struct EventSystem {
    receivers: HashMap<EventKey, Vec<Receiver>>,
}

impl EventSystem {
    /// Creates an empty system. Sending through it is a no-op.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` as subscriber `S`'s receiver for events of type `E`.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// events.subscribe::<Audio, Touched>(
    ///     Priority::High,
    ///     Requirement::one(Sprite::family()),
    ///     |store, id, event| event.consumption.consume(),
    /// );
    /// ```
    pub fn subscribe<S, E, F>(&mut self, priority: Priority, requirement: Requirement, callback: F)
    where
        S: 'static,
        E: Event,
        F: Fn(&mut EntityStore, EntityId, &mut E) + 'static,
    {
        self.insert::<S, E, F>(EventKey::Typed(TypeId::of::<E>()), priority, requirement, callback);
    }

    /// Registers `callback` as subscriber `S`'s receiver for one lifecycle kind.
    pub fn subscribe_lifecycle<S, F>(
        &mut self,
        kind: LifecycleKind,
        priority: Priority,
        requirement: Requirement,
        callback: F,
    ) where
        S: 'static,
        F: Fn(&mut EntityStore, EntityId, &mut LifecycleEvent) + 'static,
    {
        self.insert::<S, LifecycleEvent, F>(EventKey::Lifecycle(kind), priority, requirement, callback);
    }

    /// Removes subscriber `S`'s receiver for events of type `E`.
    ///
    /// Returns `true` if one was registered.
    pub fn unsubscribe<S: 'static, E: Event>(&mut self) -> bool {
        self.remove(EventKey::Typed(TypeId::of::<E>()), TypeId::of::<S>())
    }

    /// Removes subscriber `S`'s receiver for one lifecycle kind.
    ///
    /// Returns `true` if one was registered.
    pub fn unsubscribe_lifecycle<S: 'static>(&mut self, kind: LifecycleKind) -> bool {
        self.remove(EventKey::Lifecycle(kind), TypeId::of::<S>())
    }

    /// Number of receivers registered for `key`.
    #[must_use]
    pub fn receiver_count(&self, key: EventKey) -> usize {
        self.receivers.get(&key).map_or(0, Vec::len)
    }

    /// Returns `true` if no receiver is registered at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.receivers.values().all(Vec::is_empty)
    }

    /// Delivers `event` for entity `id` to every matching receiver.
    ///
    /// Receivers whose requirement rejects the entity's mask are skipped.
    /// The rest run in ascending priority order, ties in registration order.
    /// A consumable event has its flag reset first and stops at the first
    /// receiver that consumes it.
    ///
    /// The matching receivers are fixed before the first one runs. Receivers
    /// registered or removed during dispatch take effect on the next event.
    pub fn dispatch<E: Event>(store: &mut EntityStore, id: EntityId, event: &mut E) {
        let Some(list) = store.events().receivers.get(&event.key()) else {
            return;
        };

        let mask = store.component_mask(id).unwrap_or_default();
        let mut matching: Vec<(Priority, &'static str, Callback)> = list
            .iter()
            .filter(|receiver| receiver.requirement.accepts(&mask))
            .map(|receiver| (receiver.priority, receiver.subscriber_name, Rc::clone(&receiver.callback)))
            .collect();
        if matching.is_empty() {
            return;
        }
        matching.sort_by_key(|(priority, _, _)| *priority);

        tracing::trace!(
            event = event.name(),
            entity = %id,
            receivers = matching.len(),
            "dispatching event"
        );

        let consumable = match event.consumption() {
            Some(flag) => {
                flag.reset();
                true
            }
            None => false,
        };

        for (_, subscriber, callback) in matching {
            callback(&mut *store, id, &mut *event);
            if consumable && event.consumption().is_some_and(|flag| flag.is_consumed()) {
                tracing::trace!(
                    event = event.name(),
                    subscriber,
                    "event consumed"
                );
                break;
            }
        }
    }

    fn insert<S, E, F>(&mut self, key: EventKey, priority: Priority, requirement: Requirement, callback: F)
    where
        S: 'static,
        E: Event,
        F: Fn(&mut EntityStore, EntityId, &mut E) + 'static,
    {
        let subscriber = TypeId::of::<S>();
        let list = self.receivers.entry(key).or_default();
        if let Some(pos) = list.iter().position(|r| r.subscriber == subscriber) {
            list.remove(pos);
            tracing::debug!(
                subscriber = type_name::<S>(),
                event = type_name::<E>(),
                "replacing event receiver"
            );
        }
        list.push(Receiver {
            subscriber,
            subscriber_name: type_name::<S>(),
            priority,
            requirement,
            callback: Rc::new(move |store: &mut EntityStore, id: EntityId, event: &mut dyn Any| {
                if let Some(event) = event.downcast_mut::<E>() {
                    callback(store, id, event);
                }
            }),
        });
    }

    fn remove(&mut self, key: EventKey, subscriber: TypeId) -> bool {
        let Some(list) = self.receivers.get_mut(&key) else {
            return false;
        };
        let before = list.len();
        list.retain(|r| r.subscriber != subscriber);
        before != list.len()
    }
}

impl fmt::Debug for EventSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (key, list) in &self.receivers {
            let names: Vec<_> = list.iter().map(|r| (r.subscriber_name, r.priority)).collect();
            map.entry(key, &names);
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use crate::event::Consumption;

    struct Ping;
    impl Event for Ping {}

    #[derive(Default)]
    struct Touch {
        consumption: Consumption,
    }
    impl Event for Touch {
        fn consumption(&mut self) -> Option<&mut Consumption> {
            Some(&mut self.consumption)
        }
    }

    struct First;
    struct Second;
    struct Third;

    type Log = Rc<RefCell<Vec<&'static str>>>;

    fn record(log: &Log, tag: &'static str) -> impl Fn(&mut EntityStore, EntityId, &mut Ping) {
        let log = Rc::clone(log);
        move |_, _, _| log.borrow_mut().push(tag)
    }

    #[test]
    fn test_priority_then_registration_order() {
        let mut store = EntityStore::new();
        let id = store.create();
        let log: Log = Rc::default();

        let events = store.events_mut();
        events.subscribe::<First, Ping, _>(Priority::Low, Requirement::always(), record(&log, "low"));
        events.subscribe::<Second, Ping, _>(Priority::Normal, Requirement::always(), record(&log, "normal-a"));
        events.subscribe::<Third, Ping, _>(Priority::Normal, Requirement::always(), record(&log, "normal-b"));

        store.send(id, &mut Ping);
        assert_eq!(*log.borrow(), ["normal-a", "normal-b", "low"]);
    }

    #[test]
    fn test_reregistration_replaces() {
        let mut store = EntityStore::new();
        let id = store.create();
        let log: Log = Rc::default();

        store
            .events_mut()
            .subscribe::<First, Ping, _>(Priority::Normal, Requirement::always(), record(&log, "old"));
        store
            .events_mut()
            .subscribe::<First, Ping, _>(Priority::Normal, Requirement::always(), record(&log, "new"));
        assert_eq!(store.events().receiver_count(EventKey::Typed(TypeId::of::<Ping>())), 1);

        store.send(id, &mut Ping);
        assert_eq!(*log.borrow(), ["new"]);
    }

    #[test]
    fn test_consumed_event_stops() {
        let mut store = EntityStore::new();
        let id = store.create();
        let hits = Rc::new(RefCell::new(0));

        let h = Rc::clone(&hits);
        store.events_mut().subscribe::<First, Touch, _>(
            Priority::Critical,
            Requirement::always(),
            move |_, _, _| *h.borrow_mut() += 1,
        );
        let h = Rc::clone(&hits);
        store.events_mut().subscribe::<Second, Touch, _>(
            Priority::High,
            Requirement::always(),
            move |_, _, event| {
                *h.borrow_mut() += 1;
                event.consumption.consume();
            },
        );
        let h = Rc::clone(&hits);
        store.events_mut().subscribe::<Third, Touch, _>(
            Priority::Normal,
            Requirement::always(),
            move |_, _, _| *h.borrow_mut() += 1,
        );

        let mut touch = Touch::default();
        store.send(id, &mut touch);
        assert_eq!(*hits.borrow(), 2);
        assert!(touch.consumption.is_consumed());

        // The flag is reset on every send.
        store.send(id, &mut touch);
        assert_eq!(*hits.borrow(), 4);
    }

    #[test]
    fn test_unsubscribe() {
        let mut events = EventSystem::new();
        events.subscribe::<First, Ping, _>(Priority::Normal, Requirement::always(), |_, _, _| {});
        assert!(!events.is_empty());
        assert!(!events.unsubscribe::<Second, Ping>());
        assert!(events.unsubscribe::<First, Ping>());
        assert!(events.is_empty());

        events.subscribe_lifecycle::<First, _>(
            LifecycleKind::ComponentAdded,
            Priority::Normal,
            Requirement::always(),
            |_, _, _| {},
        );
        assert!(events.unsubscribe_lifecycle::<First>(LifecycleKind::ComponentAdded));
    }

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Counter(u32);
    impl crate::Component for Counter {}

    #[test]
    fn test_receiver_mutates_store() {
        let mut store = EntityStore::new();
        let id = store.create();
        store.events_mut().subscribe::<First, Ping, _>(
            Priority::Normal,
            Requirement::always(),
            |store, id, _| {
                let next = store.get::<Counter>(id).map_or(1, |c| c.0 + 1);
                store.assign_from(id, Counter(next));
            },
        );
        store.events_mut().subscribe::<Second, Ping, _>(
            Priority::Low,
            Requirement::always(),
            |store, _, _| {
                let spawned = store.create();
                store.events_mut().unsubscribe::<Second, Ping>();
                assert!(store.valid(spawned));
            },
        );

        store.send(id, &mut Ping);
        assert_eq!(store.get::<Counter>(id), Some(&Counter(1)));
        assert_eq!(store.len(), 2);
        assert_eq!(store.events().receiver_count(EventKey::Typed(TypeId::of::<Ping>())), 1);

        store.send(id, &mut Ping);
        assert_eq!(store.get::<Counter>(id), Some(&Counter(2)));
        assert_eq!(store.len(), 2, "the removed receiver no longer runs");
    }
}
