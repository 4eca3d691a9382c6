//! # TESSERA Prefab
//!
//! Reflection and prefab building on top of `tessera_core`:
//! - Descriptor-driven field reflection for component structs
//! - A name-keyed registry of type-erased component operations
//! - A builder that loads JSON prefabs and clones or extends them into stores
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tessera_core::{Component, EntityStore};
//! use tessera_prefab::{reflect, Builder, ReflectionRegistry};
//!
//! #[derive(Clone, Default)]
//! struct Storage {
//!     group: i32,
//!     key: i32,
//! }
//! impl Component for Storage {}
//! reflect!(Storage { group: i32, key: i32 });
//!
//! let mut registry = ReflectionRegistry::new();
//! registry.register::<Storage>("Storage");
//!
//! let mut builder = Builder::new(Arc::new(registry));
//! builder.load_prefab("block", r#"{"Storage": {"group": 0, "key": -1}}"#)?;
//!
//! let mut world = EntityStore::new();
//! let block = builder.instantiate(&mut world, "block");
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod builder;
pub mod error;
pub mod reflect;
pub mod registry;

pub use builder::{Builder, Bundle, Prefab};
pub use error::{PrefabError, PrefabResult, ReflectError, ReflectResult};
pub use reflect::{FieldInfo, Reflect, TypeInfo, TypeInfoCell, Visit};
pub use registry::{ComponentReflector, ReflectionRegistry, Reflector};

#[doc(hidden)]
pub use serde_json;
