//! # Store Configuration
//!
//! Tunables for an [`EntityStore`](crate::EntityStore), loadable from TOML.
//!
//! ```toml
//! chunk_bytes = 4096
//! max_entities = 100000
//! ```

use serde::Deserialize;

use crate::error::{EcsError, EcsResult};

/// Default byte size of one pool chunk.
pub const DEFAULT_CHUNK_BYTES: usize = 512;

/// Configuration for an entity store and the pools it creates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Target byte size of one pool chunk.
    ///
    /// A pool for `T` holds `max(1, chunk_bytes / size_of::<T>())` values per
    /// chunk.
    pub chunk_bytes: usize,
    /// Maximum number of entity indices the store may hand out.
    pub max_entities: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            chunk_bytes: DEFAULT_CHUNK_BYTES,
            max_entities: u32::MAX,
        }
    }
}

impl StoreConfig {
    /// Parses and validates a configuration from TOML text.
    ///
    /// Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] if the text is not valid TOML for
    /// this structure, or [`EcsError::OutOfRange`] if a value is rejected by
    /// [`StoreConfig::validate`].
    pub fn from_toml_str(text: &str) -> EcsResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| EcsError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every field is inside its allowed range.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::OutOfRange`] naming the first rejected field.
    pub fn validate(&self) -> EcsResult<()> {
        if self.chunk_bytes == 0 {
            return Err(EcsError::OutOfRange {
                field: "chunk_bytes",
                reason: "must be greater than zero",
            });
        }
        if self.max_entities == 0 {
            return Err(EcsError::OutOfRange {
                field: "max_entities",
                reason: "must be greater than zero",
            });
        }
        Ok(())
    }

    /// Number of `T` values one chunk holds under this configuration.
    #[inline]
    #[must_use]
    pub fn chunk_len<T>(&self) -> usize {
        match std::mem::size_of::<T>() {
            0 => self.chunk_bytes,
            size => (self.chunk_bytes / size).max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_toml() {
        let config = StoreConfig::from_toml_str("").unwrap();
        assert_eq!(config, StoreConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = StoreConfig::from_toml_str("max_entities = 16").unwrap();
        assert_eq!(config.max_entities, 16);
        assert_eq!(config.chunk_bytes, DEFAULT_CHUNK_BYTES);
    }

    #[test]
    fn test_rejects_zero_chunk() {
        let err = StoreConfig::from_toml_str("chunk_bytes = 0").unwrap_err();
        assert!(matches!(err, EcsError::OutOfRange { field: "chunk_bytes", .. }));
    }

    #[test]
    fn test_rejects_unknown_key() {
        let err = StoreConfig::from_toml_str("chunk_size = 4").unwrap_err();
        assert!(matches!(err, EcsError::InvalidConfig(_)));
    }

    #[test]
    fn test_chunk_len() {
        let config = StoreConfig::default();
        assert_eq!(config.chunk_len::<u64>(), 64);
        assert_eq!(config.chunk_len::<[u8; 1024]>(), 1);
        assert_eq!(config.chunk_len::<()>(), DEFAULT_CHUNK_BYTES);
    }
}
