//! # Component System
//!
//! Components are plain data attached to entities. The store treats their
//! payload opaquely; it only needs to copy them and reset them to default.

use std::fmt;

use super::family::{Family, MAX_FAMILIES};

/// Marker trait for ECS components.
///
/// Components must be:
/// - `Clone`: values are copied between stores when prefabs are instantiated
/// - `Default`: destroyed slots are reset to the default value
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Clone, Default)]
/// struct Storage {
///     group: i32,
///     key: i32,
/// }
///
/// impl Component for Storage {}
/// ```
pub trait Component: Clone + Default + 'static {
    /// The family of this component type.
    #[inline]
    #[must_use]
    fn family() -> Family {
        Family::of::<Self>()
    }
}

const WORDS: usize = MAX_FAMILIES / 64;

/// Fixed-width bitset with one bit per component family.
///
/// Bit `f` is set iff the entity owns a component of family `f`.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ComponentMask {
    bits: [u64; WORDS],
}

impl ComponentMask {
    /// The empty mask.
    pub const EMPTY: Self = Self { bits: [0; WORDS] };

    /// Creates an empty mask.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self::EMPTY
    }

    /// Builds a mask from a set of families.
    #[must_use]
    pub fn from_families(families: &[Family]) -> Self {
        let mut mask = Self::new();
        for family in families {
            mask.set(*family);
        }
        mask
    }

    /// Builds a mask holding only the family of `T`.
    #[must_use]
    pub fn of<T: Component>() -> Self {
        Self::new().with::<T>()
    }

    /// Returns this mask plus the family of `T`.
    #[must_use]
    pub fn with<T: Component>(mut self) -> Self {
        self.set(T::family());
        self
    }

    /// Sets the bit for `family`.
    #[inline]
    pub fn set(&mut self, family: Family) {
        let i = family.index();
        self.bits[i / 64] |= 1 << (i % 64);
    }

    /// Clears the bit for `family`.
    #[inline]
    pub fn clear(&mut self, family: Family) {
        let i = family.index();
        self.bits[i / 64] &= !(1 << (i % 64));
    }

    /// Checks the bit for `family`.
    #[inline]
    #[must_use]
    pub const fn test(&self, family: Family) -> bool {
        let i = family.index();
        (self.bits[i / 64] & (1 << (i % 64))) != 0
    }

    /// Clears every bit.
    #[inline]
    pub fn reset(&mut self) {
        self.bits = [0; WORDS];
    }

    /// Returns `true` if no bit is set.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|w| *w == 0)
    }

    /// Returns `true` if every bit of `other` is also set here.
    #[inline]
    #[must_use]
    pub fn contains_all(&self, other: &Self) -> bool {
        self.bits
            .iter()
            .zip(other.bits.iter())
            .all(|(a, b)| a & b == *b)
    }

    /// Returns `true` if at least one bit of `other` is also set here.
    #[inline]
    #[must_use]
    pub fn contains_any(&self, other: &Self) -> bool {
        self.bits
            .iter()
            .zip(other.bits.iter())
            .any(|(a, b)| a & b != 0)
    }

    /// Number of set bits.
    #[must_use]
    pub fn count(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Iterates over the set families in ascending order.
    pub fn families(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.iter().enumerate().flat_map(|(word, bits)| {
            (0..64usize)
                .filter(move |bit| *bits & (1u64 << bit) != 0)
                .map(move |bit| word * 64 + bit)
        })
    }
}

impl fmt::Debug for ComponentMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.families()).finish()
    }
}
