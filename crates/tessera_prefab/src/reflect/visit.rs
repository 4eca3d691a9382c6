//! Field visitors for the value types components are built from.

use std::collections::{BTreeMap, HashMap};

use serde_json::{Map, Value};

use crate::error::{ReflectError, ReflectResult};

/// Reads, writes and structurally copies one value.
///
/// Implemented for primitives, strings, options, vectors, string-keyed maps
/// and every type described with [`reflect!`](crate::reflect).
pub trait Visit: Default {
    /// Reads `value` into `self`.
    ///
    /// Structs only touch the fields present in `value`; maps merge;
    /// everything else is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`ReflectError::TypeMismatch`] or
    /// [`ReflectError::OutOfRange`] naming the offending field path.
    fn read(&mut self, value: &Value) -> ReflectResult<()>;

    /// Writes `self` as a JSON value.
    fn write(&self) -> Value;

    /// Makes `self` a structural copy of `other`.
    fn copy_from(&mut self, other: &Self);
}

/// JSON kind name used in mismatch errors.
pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub(crate) fn mismatch(expected: &'static str, found: &Value) -> ReflectError {
    ReflectError::TypeMismatch {
        path: String::new(),
        expected,
        found: kind_of(found),
    }
}

impl Visit for bool {
    fn read(&mut self, value: &Value) -> ReflectResult<()> {
        *self = value.as_bool().ok_or_else(|| mismatch("bool", value))?;
        Ok(())
    }

    fn write(&self) -> Value {
        Value::Bool(*self)
    }

    fn copy_from(&mut self, other: &Self) {
        *self = *other;
    }
}

macro_rules! visit_integer {
    ($($ty:ty),*) => {
        $(
            impl Visit for $ty {
                fn read(&mut self, value: &Value) -> ReflectResult<()> {
                    let out_of_range = || ReflectError::OutOfRange {
                        path: String::new(),
                        value: value.to_string(),
                        target: stringify!($ty),
                    };
                    *self = if let Some(n) = value.as_i64() {
                        <$ty>::try_from(n).map_err(|_| out_of_range())?
                    } else if let Some(n) = value.as_u64() {
                        <$ty>::try_from(n).map_err(|_| out_of_range())?
                    } else {
                        return Err(mismatch("integer", value));
                    };
                    Ok(())
                }

                fn write(&self) -> Value {
                    Value::from(*self)
                }

                fn copy_from(&mut self, other: &Self) {
                    *self = *other;
                }
            }
        )*
    };
}

visit_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Visit for f64 {
    fn read(&mut self, value: &Value) -> ReflectResult<()> {
        *self = value.as_f64().ok_or_else(|| mismatch("number", value))?;
        Ok(())
    }

    fn write(&self) -> Value {
        Value::from(*self)
    }

    fn copy_from(&mut self, other: &Self) {
        *self = *other;
    }
}

impl Visit for f32 {
    #[allow(clippy::cast_possible_truncation)]
    fn read(&mut self, value: &Value) -> ReflectResult<()> {
        *self = value.as_f64().ok_or_else(|| mismatch("number", value))? as f32;
        Ok(())
    }

    fn write(&self) -> Value {
        Value::from(*self)
    }

    fn copy_from(&mut self, other: &Self) {
        *self = *other;
    }
}

impl Visit for String {
    fn read(&mut self, value: &Value) -> ReflectResult<()> {
        let text = value.as_str().ok_or_else(|| mismatch("string", value))?;
        self.clear();
        self.push_str(text);
        Ok(())
    }

    fn write(&self) -> Value {
        Value::String(self.clone())
    }

    fn copy_from(&mut self, other: &Self) {
        self.clone_from(other);
    }
}

impl Visit for Value {
    fn read(&mut self, value: &Value) -> ReflectResult<()> {
        self.clone_from(value);
        Ok(())
    }

    fn write(&self) -> Value {
        self.clone()
    }

    fn copy_from(&mut self, other: &Self) {
        self.clone_from(other);
    }
}

impl<T: Visit> Visit for Option<T> {
    /// `null` clears the option; anything else is read into the inner value.
    fn read(&mut self, value: &Value) -> ReflectResult<()> {
        if value.is_null() {
            *self = None;
            return Ok(());
        }
        self.get_or_insert_with(T::default).read(value)
    }

    fn write(&self) -> Value {
        self.as_ref().map_or(Value::Null, Visit::write)
    }

    fn copy_from(&mut self, other: &Self) {
        match other {
            Some(source) => self.get_or_insert_with(T::default).copy_from(source),
            None => *self = None,
        }
    }
}

impl<T: Visit> Visit for Vec<T> {
    /// Replaces the whole sequence.
    fn read(&mut self, value: &Value) -> ReflectResult<()> {
        let items = value.as_array().ok_or_else(|| mismatch("array", value))?;
        let mut out = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let mut element = T::default();
            element.read(item).map_err(|e| e.at(&i.to_string()))?;
            out.push(element);
        }
        *self = out;
        Ok(())
    }

    fn write(&self) -> Value {
        Value::Array(self.iter().map(Visit::write).collect())
    }

    fn copy_from(&mut self, other: &Self) {
        self.truncate(other.len());
        self.resize_with(other.len(), T::default);
        for (dst, src) in self.iter_mut().zip(other) {
            dst.copy_from(src);
        }
    }
}

fn write_entries<'a, T: Visit + 'a>(entries: impl Iterator<Item = (&'a String, &'a T)>) -> Value {
    let object: Map<String, Value> = entries.map(|(k, v)| (k.clone(), v.write())).collect();
    Value::Object(object)
}

impl<T: Visit> Visit for BTreeMap<String, T> {
    /// Merges keys from `value`; keys it does not mention are kept.
    fn read(&mut self, value: &Value) -> ReflectResult<()> {
        let object = value.as_object().ok_or_else(|| mismatch("object", value))?;
        for (key, item) in object {
            self.entry(key.clone())
                .or_default()
                .read(item)
                .map_err(|e| e.at(key))?;
        }
        Ok(())
    }

    fn write(&self) -> Value {
        write_entries(self.iter())
    }

    fn copy_from(&mut self, other: &Self) {
        self.retain(|key, _| other.contains_key(key));
        for (key, source) in other {
            self.entry(key.clone()).or_default().copy_from(source);
        }
    }
}

impl<T: Visit> Visit for HashMap<String, T> {
    /// Merges keys from `value`; keys it does not mention are kept.
    fn read(&mut self, value: &Value) -> ReflectResult<()> {
        let object = value.as_object().ok_or_else(|| mismatch("object", value))?;
        for (key, item) in object {
            self.entry(key.clone())
                .or_default()
                .read(item)
                .map_err(|e| e.at(key))?;
        }
        Ok(())
    }

    /// Keys are written in sorted order so output is stable.
    fn write(&self) -> Value {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        write_entries(entries.into_iter())
    }

    fn copy_from(&mut self, other: &Self) {
        self.retain(|key, _| other.contains_key(key));
        for (key, source) in other {
            self.entry(key.clone()).or_default().copy_from(source);
        }
    }
}
