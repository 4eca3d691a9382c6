//! # Store and Event Integration Tests
//!
//! Exercises the store through its public surface only.

use std::cell::RefCell;
use std::rc::Rc;

use tessera_core::{
    Component, ComponentMask, Consumption, EntityId, EntityStore, Event, LifecycleEvent,
    LifecycleKind, Priority, Requirement,
};

#[derive(Clone, Debug, Default, PartialEq)]
struct Storage {
    group: i32,
    key: i32,
}
impl Component for Storage {}

#[derive(Clone, Debug, Default, PartialEq)]
struct Sprite {
    frame: u32,
}
impl Component for Sprite {}

#[derive(Default)]
struct Tap {
    consumption: Consumption,
}
impl Event for Tap {
    fn consumption(&mut self) -> Option<&mut Consumption> {
        Some(&mut self.consumption)
    }
}

#[derive(Default)]
struct Redraw;
impl Event for Redraw {}

struct Input;
struct Audio;
struct Ui;

type Log = Rc<RefCell<Vec<&'static str>>>;

fn register_trio<E: Event>(store: &mut EntityStore, log: &Log, consume_at: Option<&'static str>)
where
    E: AsConsumable,
{
    let subscribers: [(&'static str, Priority); 3] = [
        ("normal", Priority::Normal),
        ("critical", Priority::Critical),
        ("high", Priority::High),
    ];
    for (tag, priority) in subscribers {
        let log = Rc::clone(log);
        let callback = move |_: &mut EntityStore, _: EntityId, event: &mut E| {
            log.borrow_mut().push(tag);
            if consume_at == Some(tag) {
                event.consume();
            }
        };
        let events = store.events_mut();
        match tag {
            "normal" => events.subscribe::<Input, E, _>(priority, Requirement::always(), callback),
            "critical" => events.subscribe::<Audio, E, _>(priority, Requirement::always(), callback),
            _ => events.subscribe::<Ui, E, _>(priority, Requirement::always(), callback),
        }
    }
}

trait AsConsumable {
    fn consume(&mut self);
}

impl AsConsumable for Tap {
    fn consume(&mut self) {
        self.consumption.consume();
    }
}

impl AsConsumable for Redraw {
    fn consume(&mut self) {}
}

#[test]
fn recycled_index_never_revalidates_old_handles() {
    let mut store = EntityStore::new();
    let mut issued: Vec<EntityId> = Vec::new();

    for _ in 0..5 {
        let id = store.create();
        assert_eq!(id.index(), 0);
        if let Some(previous) = issued.last() {
            assert!(id.version() > previous.version());
        }
        issued.push(id);
        assert!(store.destroy(id));
    }

    assert!(issued.iter().all(|id| !store.valid(*id)));
}

#[test]
fn has_all_is_conjunction_and_has_any_is_disjunction() {
    let mut store = EntityStore::new();
    let families = [Storage::family(), Sprite::family()];

    let none = store.create();
    let storage = store.create();
    store.assign::<Storage>(storage);
    let both = store.create();
    store.assign::<Storage>(both);
    store.assign::<Sprite>(both);

    for id in [none, storage, both] {
        let a = store.has::<Storage>(id);
        let b = store.has::<Sprite>(id);
        assert_eq!(store.has_all(id, &families), a && b);
        assert_eq!(store.has_any(id, &families), a || b);
    }
}

#[test]
fn consumable_event_stops_at_first_consumer() {
    let mut store = EntityStore::new();
    let id = store.create();
    let log: Log = Rc::default();
    register_trio::<Tap>(&mut store, &log, Some("critical"));

    let mut tap = Tap::default();
    store.send(id, &mut tap);

    assert_eq!(*log.borrow(), ["critical"]);
    assert!(tap.consumption.is_consumed());
}

#[test]
fn plain_event_reaches_every_receiver() {
    let mut store = EntityStore::new();
    let id = store.create();
    let log: Log = Rc::default();
    register_trio::<Redraw>(&mut store, &log, Some("critical"));

    store.send(id, &mut Redraw);

    assert_eq!(*log.borrow(), ["critical", "high", "normal"]);
}

#[test]
fn requirement_filters_receivers() {
    let mut store = EntityStore::new();
    let plain = store.create();
    let sprite = store.create();
    store.assign::<Sprite>(sprite);

    let hits: Rc<RefCell<Vec<EntityId>>> = Rc::default();
    let h = Rc::clone(&hits);
    store.events_mut().subscribe::<Ui, Redraw, _>(
        Priority::Normal,
        Requirement::one(Sprite::family()).or(Requirement::one(Storage::family())),
        move |_, id, _| h.borrow_mut().push(id),
    );

    store.send(plain, &mut Redraw);
    store.send(sprite, &mut Redraw);
    assert_eq!(*hits.borrow(), [sprite]);
}

#[test]
fn second_registration_wins() {
    let mut store = EntityStore::new();
    let id = store.create();
    let log: Log = Rc::default();

    for tag in ["first", "second"] {
        let log = Rc::clone(&log);
        store.events_mut().subscribe::<Input, Redraw, _>(
            Priority::Normal,
            Requirement::always(),
            move |_, _, _| log.borrow_mut().push(tag),
        );
    }

    store.send(id, &mut Redraw);
    assert_eq!(*log.borrow(), ["second"]);
}

#[test]
fn component_added_fires_after_data_is_written() {
    let mut store = EntityStore::new();
    let seen: Rc<RefCell<Option<Storage>>> = Rc::default();
    let s = Rc::clone(&seen);
    store.events_mut().subscribe_lifecycle::<Audio, _>(
        LifecycleKind::ComponentAdded,
        Priority::Normal,
        Requirement::one(Storage::family()),
        move |store, id, _| *s.borrow_mut() = store.get::<Storage>(id).cloned(),
    );

    let id = store.create();
    store.assign_from(id, Storage { group: 4, key: 2 });
    assert_eq!(*seen.borrow(), Some(Storage { group: 4, key: 2 }));
}

#[test]
fn handles_rebuilt_for_free_slots_are_rejected() {
    let mut store = EntityStore::new();
    let freed = store.create();
    let kept = store.create();
    assert!(store.destroy(freed));

    let listed: Vec<_> = store.view(ComponentMask::EMPTY).collect();
    assert_eq!(listed, [kept]);
    assert!(store.entity_id(freed.index()).is_invalid());

    // The freed slot's next version, forged by hand.
    let forged = EntityId::new(freed.index(), freed.version() + 1);
    assert!(!store.valid(forged));
    assert!(!store.destroy(forged));
    assert_eq!(store.len(), 1);

    let c = store.create();
    let d = store.create();
    assert_ne!(c, d);
    assert!(store.valid(c) && store.valid(d));
    assert_eq!(store.entity_id(c.index()), c);
    assert_eq!(store.len(), 3);
}

#[test]
fn before_entity_run_receiver_initialises_the_entity() {
    let mut store = EntityStore::new();
    store.events_mut().subscribe_lifecycle::<Ui, _>(
        LifecycleKind::BeforeEntityRun,
        Priority::Normal,
        Requirement::one(Storage::family()),
        |store, id, _| {
            let frame = store.get::<Storage>(id).map_or(0, |storage| storage.group.unsigned_abs());
            store.assign_from(id, Sprite { frame });
            if let Some(storage) = store.get_mut::<Storage>(id) {
                storage.key = -1;
            }
        },
    );

    let id = store.create();
    store.assign_from(id, Storage { group: 6, key: 0 });
    store.send(id, &mut LifecycleEvent::entity(LifecycleKind::BeforeEntityRun));

    assert_eq!(store.get::<Sprite>(id), Some(&Sprite { frame: 6 }));
    assert_eq!(store.get::<Storage>(id), Some(&Storage { group: 6, key: -1 }));
}

#[test]
fn receiver_destroying_its_entity_ends_the_destroy() {
    let mut store = EntityStore::new();
    store.events_mut().subscribe_lifecycle::<Audio, _>(
        LifecycleKind::BeforeEntityRemoved,
        Priority::Normal,
        Requirement::always(),
        |store, id, _| {
            store.destroy_silent(id);
        },
    );

    let id = store.create();
    assert!(store.destroy(id));
    assert!(store.is_empty());
    assert_ne!(store.create(), store.create());
}
