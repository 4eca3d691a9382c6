//! # Core Error Types
//!
//! Errors surfaced by the entity store layer.
//!
//! Most store operations do not fail: stale handles are reported through
//! `bool`/`Option` results and an exhausted index space yields
//! [`EntityId::INVALID`](crate::EntityId::INVALID). Only configuration
//! loading returns an error.

use thiserror::Error;

/// Errors that can occur in the core crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// The configuration text could not be parsed.
    #[error("invalid store configuration: {0}")]
    InvalidConfig(String),

    /// A configuration value is outside its allowed range.
    #[error("store configuration field `{field}` is out of range: {reason}")]
    OutOfRange {
        /// The offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: &'static str,
    },
}

/// Result type for core operations.
pub type EcsResult<T> = Result<T, EcsError>;
