//! Entry Module
//!
//! Defines individual map entries and deadline arithmetic.

use std::time::Duration;

use tokio::time::Instant;

/// Roughly 30 years; deadlines that would overflow `Instant` saturate here.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

// == Entry ==
/// A live value together with its expiration metadata.
#[derive(Debug, Clone)]
pub struct Entry<V> {
    /// The stored value
    pub value: V,
    /// Instant at which the entry's TTL elapses
    pub deadline: Instant,
    /// Insertion generation, unique per (key, insertion)
    pub epoch: u64,
}

impl<V> Entry<V> {
    // == Constructor ==
    /// Creates a new entry expiring `ttl` after `now`.
    pub fn new(value: V, now: Instant, ttl: Duration, epoch: u64) -> Self {
        Self {
            value,
            deadline: deadline_after(now, ttl),
            epoch,
        }
    }

    // == Time To Live ==
    /// Returns the remaining lifetime, zero once the deadline has passed.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.deadline.saturating_duration_since(now)
    }
}

// == Utility Functions ==
/// Computes `now + ttl`, saturating instead of panicking on overflow.
fn deadline_after(now: Instant, ttl: Duration) -> Instant {
    now.checked_add(ttl)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}
