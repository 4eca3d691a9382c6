//! # Memory Management
//!
//! Chunked pools backing component storage.
//!
//! ## Design Philosophy
//!
//! - Storage grows in whole chunks; chunks never move once allocated
//! - Destroying a value overwrites it with its default, nothing is freed
//! - Slots are addressed by dense entity index

mod pool;

pub use pool::{AnyPool, ChunkedPool};
