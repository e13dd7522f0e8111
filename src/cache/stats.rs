//! Map Statistics Module
//!
//! Tracks lookup, insertion and removal counters.

use serde::Serialize;

// == TTL Map Stats ==
/// Counters describing what the map has done since it was created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TtlMapStats {
    /// Lookups that found a live entry
    pub hits: u64,
    /// Lookups that found nothing
    pub misses: u64,
    /// Successful insertions
    pub inserts: u64,
    /// Insertions refused (key exists or capacity reached)
    pub rejections: u64,
    /// Entries removed by an explicit delete
    pub deletions: u64,
    /// Entries removed by the expiration worker
    pub expirations: u64,
    /// Number of clear operations
    pub clears: u64,
    /// Current number of live entries
    pub total_entries: usize,
}

impl TtlMapStats {
    // == Constructor ==
    /// Creates a new TtlMapStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub(crate) fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub(crate) fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub(crate) fn record_insert(&mut self) {
        self.inserts += 1;
    }

    pub(crate) fn record_rejection(&mut self) {
        self.rejections += 1;
    }

    pub(crate) fn record_deletion(&mut self) {
        self.deletions += 1;
    }

    /// Adds `count` reaper removals.
    pub(crate) fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }

    pub(crate) fn record_clear(&mut self) {
        self.clears += 1;
    }
}
