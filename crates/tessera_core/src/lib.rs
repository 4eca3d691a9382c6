//! # TESSERA Core
//!
//! A small entity-component runtime:
//! - Versioned entity handles with index recycling and stale-handle detection
//! - Chunked, per-family component pools that never move once allocated
//! - Typed, priority-ordered event dispatch with optional consumption
//!
//! ## Architecture Rules
//!
//! 1. **Handles never own** - an [`EntityId`] is a lookup key into the store
//!    that created it and is meaningless against any other store
//! 2. **Destroy resets, never frees** - pool slots are overwritten with the
//!    component's default value and reused
//! 3. **Single-threaded mutation** - stores, pools and receiver tables assume
//!    exclusive access from the calling thread
//!
//! ## Example
//!
//! ```rust,ignore
//! use tessera_core::{Component, EntityStore};
//!
//! #[derive(Clone, Default)]
//! struct Health(i32);
//! impl Component for Health {}
//!
//! let mut store = EntityStore::new();
//! let id = store.create();
//! store.assign_from(id, Health(10));
//! assert!(store.has::<Health>(id));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod ecs;
pub mod error;
pub mod event;
pub mod memory;

pub use config::StoreConfig;
pub use ecs::{
    Component, ComponentMask, EntityId, EntityStore, Family, View, MAX_FAMILIES,
};
pub use error::{EcsError, EcsResult};
pub use event::{
    Consumption, Event, EventKey, EventSystem, LifecycleEvent, LifecycleKind, Priority,
    Requirement,
};
pub use memory::{AnyPool, ChunkedPool};
