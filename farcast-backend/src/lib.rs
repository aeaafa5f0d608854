//! Traits and structs for farcast storage backends.
//!
//! The client keeps three kinds of state in generic TTL storage: memoized
//! validation verdicts, conditional-cache entries, and anything a custom
//! check wants to remember. All of it goes through the [`Backend`] trait
//! defined here; [`CacheBackend`] layers typed JSON get/set on top, and
//! [`MemoryBackend`] is the bundled in-process implementation.

mod backend;
mod memory;

pub use backend::{Backend, BackendResult, CacheBackend};
pub use memory::MemoryBackend;

use thiserror::Error;

/// General groups of errors in backend interaction.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Internal backend error, state or storage failure.
    #[error(transparent)]
    Internal(Box<dyn std::error::Error + Send + Sync>),
    /// Serializing/deserializing a cached value failed.
    #[error("cache value format error: {0}")]
    Format(#[from] serde_json::Error),
}

/// Status of a delete operation.
#[derive(Debug, PartialEq, Eq)]
pub enum DeleteStatus {
    /// Record successfully deleted.
    Deleted(u32),
    /// Record already missing.
    Missing,
}
