//! # Entity Handles
//!
//! Entities are lightweight identifiers consisting of:
//! - An index selecting a slot in the store
//! - A version counter detecting stale references after the slot is recycled

use std::fmt;

/// Unique identifier for an entity within one store.
///
/// The ID is split into two parts:
/// - Lower 32 bits: Index into the store's slots
/// - Upper 32 bits: Version of the slot when the ID was handed out
///
/// A handle owns nothing. It is only meaningful against the store that
/// created it, and only while the store's version for its index matches.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Handle that no store ever validates.
    pub const INVALID: Self = Self(u64::MAX);

    /// Creates an entity ID from index and version.
    #[inline]
    #[must_use]
    pub const fn new(index: u32, version: u32) -> Self {
        Self(((version as u64) << 32) | (index as u64))
    }

    /// Rebuilds an ID from its packed 64-bit form.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Returns the packed 64-bit form.
    #[inline]
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        self.0
    }

    /// Returns the index portion of the ID.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn index(self) -> u32 {
        self.0 as u32
    }

    /// Returns the version portion of the ID.
    #[inline]
    #[must_use]
    pub const fn version(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Checks if this is [`EntityId::INVALID`].
    #[inline]
    #[must_use]
    pub const fn is_invalid(self) -> bool {
        self.0 == u64::MAX
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_invalid() {
            return f.write_str("EntityId(INVALID)");
        }
        write!(f, "EntityId({}v{})", self.index(), self.version())
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_roundtrip() {
        let id = EntityId::new(12345, 67890);
        assert_eq!(id.index(), 12345);
        assert_eq!(id.version(), 67890);
        assert_eq!(EntityId::from_bits(id.to_bits()), id);
    }

    #[test]
    fn test_equality_needs_both_fields() {
        assert_ne!(EntityId::new(3, 1), EntityId::new(3, 2));
        assert_ne!(EntityId::new(3, 1), EntityId::new(4, 1));
        assert_eq!(EntityId::new(3, 1), EntityId::new(3, 1));
    }

    #[test]
    fn test_default_is_invalid() {
        assert!(EntityId::default().is_invalid());
        assert!(!EntityId::new(0, 1).is_invalid());
        assert_eq!(format!("{:?}", EntityId::new(2, 5)), "EntityId(2v5)");
    }
}
