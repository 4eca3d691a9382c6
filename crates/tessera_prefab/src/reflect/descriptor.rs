//! # Type Descriptors
//!
//! A [`TypeInfo`] is the per-type table of named field accessors that drives
//! struct reads, writes and copies. It is built once per type, on first use,
//! and shared through an [`Arc`].

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{Map, Value};

use super::visit::{mismatch, Visit};
use crate::error::ReflectResult;

type ReadFn<T> = Box<dyn Fn(&mut T, &Value) -> ReflectResult<()> + Send + Sync>;
type WriteFn<T> = Box<dyn Fn(&T) -> Value + Send + Sync>;
type CopyFn<T> = Box<dyn Fn(&mut T, &T) + Send + Sync>;

/// Accessors for one named field of `T`.
pub struct FieldInfo<T> {
    name: &'static str,
    read: ReadFn<T>,
    write: WriteFn<T>,
    copy: CopyFn<T>,
}

impl<T> FieldInfo<T> {
    /// The field name used in payloads.
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> fmt::Debug for FieldInfo<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldInfo").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Ordered field table for one struct type.
///
/// # Example
///
/// ```rust,ignore
/// fn group(s: &Storage) -> &i32 { &s.group }
/// fn group_mut(s: &mut Storage) -> &mut i32 { &mut s.group }
///
/// let info = TypeInfo::new("Storage").field("group", group, group_mut);
/// ```
pub struct TypeInfo<T> {
    name: &'static str,
    fields: Vec<FieldInfo<T>>,
}

impl<T: 'static> TypeInfo<T> {
    /// Creates an empty table.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            fields: Vec::new(),
        }
    }

    /// Appends a field reached through `get` and `get_mut`.
    #[must_use]
    pub fn field<F: Visit + 'static>(
        mut self,
        name: &'static str,
        get: fn(&T) -> &F,
        get_mut: fn(&mut T) -> &mut F,
    ) -> Self {
        self.fields.push(FieldInfo {
            name,
            read: Box::new(move |target: &mut T, value: &Value| get_mut(target).read(value)),
            write: Box::new(move |source: &T| get(source).write()),
            copy: Box::new(move |target: &mut T, source: &T| get_mut(target).copy_from(get(source))),
        });
        self
    }

    /// The type name.
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Fields in declaration order.
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &[FieldInfo<T>] {
        &self.fields
    }

    /// Reads a JSON object into `target`, field by field.
    ///
    /// Fields missing from `value` keep their current value. Keys naming no
    /// field are ignored.
    ///
    /// # Errors
    ///
    /// Returns the first field error, with the field name prefixed to its
    /// path. Fields before it have already been written.
    pub fn read(&self, target: &mut T, value: &Value) -> ReflectResult<()> {
        let object = value.as_object().ok_or_else(|| mismatch("object", value))?;
        for field in &self.fields {
            if let Some(item) = object.get(field.name) {
                (field.read)(target, item).map_err(|e| e.at(field.name))?;
            }
        }
        for key in object.keys().filter(|k| !self.has_field(k)) {
            tracing::debug!(type_name = self.name, field = %key, "ignoring unknown field");
        }
        Ok(())
    }

    /// Writes every field of `source` into a JSON object, in declaration order.
    #[must_use]
    pub fn write(&self, source: &T) -> Value {
        let object: Map<String, Value> = self
            .fields
            .iter()
            .map(|field| (field.name.to_string(), (field.write)(source)))
            .collect();
        Value::Object(object)
    }

    /// Copies every field of `source` into `target`.
    pub fn copy(&self, target: &mut T, source: &T) {
        for field in &self.fields {
            (field.copy)(target, source);
        }
    }

    fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }
}

impl<T> fmt::Debug for TypeInfo<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .finish()
    }
}

/// Lazily-built, shared [`TypeInfo`] slot for use in a `static`.
///
/// Initialization is double-checked: a ready flag short-circuits the common
/// path, and the write lock serializes the first build so concurrent first
/// uses all observe the same table.
pub struct TypeInfoCell<T> {
    ready: AtomicBool,
    slot: RwLock<Option<Arc<TypeInfo<T>>>>,
}

impl<T: 'static> TypeInfoCell<T> {
    /// Creates an empty cell.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ready: AtomicBool::new(false),
            slot: parking_lot::const_rwlock(None),
        }
    }

    /// Returns the table, building it with `init` on first use.
    pub fn get_or_init(&self, init: impl FnOnce() -> TypeInfo<T>) -> Arc<TypeInfo<T>> {
        if self.ready.load(Ordering::Acquire) {
            if let Some(info) = self.slot.read().as_ref() {
                return Arc::clone(info);
            }
        }

        let mut slot = self.slot.write();
        if let Some(info) = slot.as_ref() {
            return Arc::clone(info);
        }
        let info = Arc::new(init());
        tracing::debug!(type_name = info.name(), fields = info.fields().len(), "built type descriptor");
        *slot = Some(Arc::clone(&info));
        self.ready.store(true, Ordering::Release);
        info
    }

    /// Returns `true` once the table has been built.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }
}

impl<T: 'static> Default for TypeInfoCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A struct type with a field descriptor table.
///
/// Implement with [`reflect!`](crate::reflect), which also implements
/// [`Visit`] by delegating to the table.
pub trait Reflect: Visit + 'static {
    /// The shared field table for this type.
    fn type_info() -> Arc<TypeInfo<Self>>;
}
