//! TTL Map - A concurrent in-memory map with per-entry expiration
//!
//! Entries are inserted with their own time-to-live and removed by a single
//! background worker once it elapses. An optional hard capacity rejects
//! inserts instead of evicting.

pub mod cache;
pub mod config;
pub mod error;
pub(crate) mod tasks;

pub use cache::{TtlMap, TtlMapStats};
pub use config::TtlMapConfig;
pub use error::{InsertError, NotFound, Result, TtlMapError};
