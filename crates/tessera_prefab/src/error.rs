//! # Prefab Error Types
//!
//! Errors raised while reading payloads into components and loading or
//! extending prefabs.

use thiserror::Error;

/// Errors raised by reflection reads.
#[derive(Error, Debug)]
pub enum ReflectError {
    /// The payload text is not valid JSON.
    #[error("malformed payload: {0}")]
    Codec(#[from] serde_json::Error),

    /// A value has the wrong JSON kind for its field.
    #[error("type mismatch at `{path}`: expected {expected}, found {found}")]
    TypeMismatch {
        /// Dotted path of the offending field.
        path: String,
        /// Kind the field accepts.
        expected: &'static str,
        /// Kind the payload held.
        found: &'static str,
    },

    /// A number does not fit the field's type.
    #[error("value {value} at `{path}` does not fit in {target}")]
    OutOfRange {
        /// Dotted path of the offending field.
        path: String,
        /// The rejected number, as written in the payload.
        value: String,
        /// Rust type of the field.
        target: &'static str,
    },
}

impl ReflectError {
    /// Prefixes the error's field path with `segment`.
    #[must_use]
    pub fn at(mut self, segment: &str) -> Self {
        match &mut self {
            Self::TypeMismatch { path, .. } | Self::OutOfRange { path, .. } => {
                *path = if path.is_empty() {
                    segment.to_string()
                } else {
                    format!("{segment}.{path}")
                };
            }
            Self::Codec(_) => {}
        }
        self
    }
}

/// Errors raised by the prefab builder.
#[derive(Error, Debug)]
pub enum PrefabError {
    /// A prefab with this name is already loaded.
    #[error("prefab `{0}` is already loaded")]
    AlreadyLoaded(String),

    /// The prefab payload is not a JSON object.
    #[error("prefab `{prefab}` payload is not an object")]
    NotAnObject {
        /// The prefab being loaded.
        prefab: String,
    },

    /// The prefab payload text is not valid JSON.
    #[error("prefab `{prefab}` payload is malformed: {source}")]
    Codec {
        /// The prefab being loaded.
        prefab: String,
        /// Codec failure.
        source: serde_json::Error,
    },

    /// A component payload could not be read.
    #[error("prefab `{prefab}` component `{component}`: {source}")]
    Component {
        /// The prefab being loaded or extended.
        prefab: String,
        /// The component whose payload failed.
        component: String,
        /// Reflection failure.
        source: ReflectError,
    },

    /// The store that should receive the entity has no free index.
    #[error("entity store exhausted while building prefab `{0}`")]
    Exhausted(String),
}

/// Result type for reflection reads.
pub type ReflectResult<T> = Result<T, ReflectError>;

/// Result type for builder operations.
pub type PrefabResult<T> = Result<T, PrefabError>;
