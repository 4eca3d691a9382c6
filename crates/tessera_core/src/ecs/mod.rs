//! # Entity Component System
//!
//! Versioned entity handles, per-family component pools and masks.
//!
//! ## Design Philosophy
//!
//! - Entity IDs are indices with version counters
//! - Each component family gets its own chunked pool, created on first assign
//! - Presence is tracked by a per-entity bitmask, queries are mask tests
//! - Lifecycle changes are announced through the store's event system

mod component;
mod entity;
mod family;
mod store;
mod view;

pub use component::{Component, ComponentMask};
pub use entity::EntityId;
pub use family::{Family, MAX_FAMILIES};
pub use store::EntityStore;
pub use view::View;
