//! Error types for the TTL map
//!
//! Provides the error taxonomy of the map using thiserror.

use thiserror::Error;

// == Insert Error ==
/// Reasons a `set` can be rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertError {
    /// The key is currently live; overwrite in place is not supported
    #[error("key already exists")]
    AlreadyExists,

    /// The map already holds `capacity` entries
    #[error("capacity exceeded: map is limited to {capacity} entries")]
    CapacityExceeded { capacity: usize },
}

// == Not Found ==
/// The key passed to `delete` is not live.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("key not found")]
pub struct NotFound;

// == TTL Map Error ==
/// Unified error type for callers that want a single error channel.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtlMapError {
    #[error(transparent)]
    Insert(#[from] InsertError),

    #[error(transparent)]
    NotFound(#[from] NotFound),
}

// == Result Type Alias ==
/// Convenience Result type for the TTL map.
pub type Result<T> = std::result::Result<T, TtlMapError>;
