//! Map Module
//!
//! Provides the expiring map, its entries and its statistics.

mod entry;
mod stats;
mod store;


// Re-export public types
pub use stats::TtlMapStats;
pub use store::TtlMap;

pub(crate) use entry::Entry;
pub(crate) use store::Shared;
