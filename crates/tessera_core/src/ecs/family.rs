//! # Component Families
//!
//! Every component type gets a small integer, its family, used to index
//! pools and mask bits. Families are assigned by a process-wide table the
//! first time a type is seen and stay stable for the life of the process.
//!
//! Assignment order decides the numbers. Code that needs the same numbering
//! across runs should call [`Family::declare`] for every component type in a
//! fixed order before touching any store.

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

/// Maximum number of component families per process.
pub const MAX_FAMILIES: usize = 256;

/// Small integer identifying a component type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Family(u16);

/// Process-wide family assignments.
struct FamilyTable {
    by_type: HashMap<TypeId, Family>,
    names: Vec<&'static str>,
}

static FAMILIES: Lazy<RwLock<FamilyTable>> = Lazy::new(|| {
    RwLock::new(FamilyTable {
        by_type: HashMap::new(),
        names: Vec::new(),
    })
});

impl Family {
    /// Returns the family of `T`, assigning the next free one on first use.
    ///
    /// # Panics
    ///
    /// Panics if more than [`MAX_FAMILIES`] types are assigned.
    #[must_use]
    pub fn of<T: 'static>() -> Self {
        let type_id = TypeId::of::<T>();
        if let Some(family) = FAMILIES.read().by_type.get(&type_id) {
            return *family;
        }

        let mut table = FAMILIES.write();
        if let Some(family) = table.by_type.get(&type_id) {
            return *family;
        }
        assert!(
            table.names.len() < MAX_FAMILIES,
            "Component family space exhausted ({MAX_FAMILIES} types)"
        );
        #[allow(clippy::cast_possible_truncation)]
        let family = Self(table.names.len() as u16);
        table.by_type.insert(type_id, family);
        table.names.push(type_name::<T>());
        tracing::debug!(family = family.0, component = type_name::<T>(), "assigned component family");
        family
    }

    /// Assigns the family of `T` now, as part of a deterministic registration pass.
    ///
    /// Equivalent to [`Family::of`]; the separate name documents intent.
    #[must_use]
    pub fn declare<T: 'static>() -> Self {
        Self::of::<T>()
    }

    /// Returns the family of `T` if one was already assigned.
    #[must_use]
    pub fn lookup<T: 'static>() -> Option<Self> {
        FAMILIES.read().by_type.get(&TypeId::of::<T>()).copied()
    }

    /// Number of families assigned so far in this process.
    #[must_use]
    pub fn assigned() -> usize {
        FAMILIES.read().names.len()
    }

    /// Rust type name of the component behind this family.
    #[must_use]
    pub fn type_name(self) -> Option<&'static str> {
        FAMILIES.read().names.get(self.index()).copied()
    }

    /// The family as a pool/mask index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "family#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    struct Alpha;
    struct Beta;
    struct Raced;

    #[test]
    fn test_family_is_stable() {
        let a = Family::of::<Alpha>();
        assert_eq!(Family::of::<Alpha>(), a);
        assert_eq!(Family::lookup::<Alpha>(), Some(a));
        assert_ne!(Family::of::<Beta>(), a);
    }

    #[test]
    fn test_type_name_recorded() {
        let family = Family::declare::<Beta>();
        assert!(family.type_name().unwrap().ends_with("Beta"));
        assert!(Family::assigned() > family.index());
    }

    #[test]
    fn test_concurrent_first_use_agrees() {
        let handles: Vec<_> = (0..8).map(|_| thread::spawn(Family::of::<Raced>)).collect();
        let families: Vec<Family> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(families.windows(2).all(|w| w[0] == w[1]));
    }
}
