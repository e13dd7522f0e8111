//! Deadline Queue
//!
//! Min-deadline-first priority queue of pending expirations.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use tokio::time::Instant;

// == Expiry Record ==
/// A pending expiration: remove `key` at `deadline` if it still carries `epoch`.
///
/// Records never hold values, only the metadata needed to find the entry.
#[derive(Debug, Clone)]
pub struct ExpiryRecord<K> {
    pub deadline: Instant,
    pub epoch: u64,
    pub key: K,
}

// Epochs are unique, so (deadline, epoch) is a total order without touching K.
impl<K> PartialEq for ExpiryRecord<K> {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.epoch == other.epoch
    }
}

impl<K> Eq for ExpiryRecord<K> {}

impl<K> PartialOrd for ExpiryRecord<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K> Ord for ExpiryRecord<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.deadline
            .cmp(&other.deadline)
            .then_with(|| self.epoch.cmp(&other.epoch))
    }
}

// == Deadline Queue ==
/// Pending expirations ordered so the nearest deadline is at the head.
///
/// Push and pop are `O(log n)`, peeking the head is `O(1)`.
#[derive(Debug)]
pub struct DeadlineQueue<K> {
    heap: BinaryHeap<Reverse<ExpiryRecord<K>>>,
}

impl<K> Default for DeadlineQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> DeadlineQueue<K> {
    // == Constructor ==
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
        }
    }

    // == Schedule ==
    /// Registers a pending expiration.
    ///
    /// Returns true when the record became the new head, meaning a sleeping
    /// worker must be woken to re-arm its timer.
    pub fn schedule(&mut self, key: K, epoch: u64, deadline: Instant) -> bool {
        let becomes_head = self.next_deadline().map_or(true, |head| deadline < head);
        self.heap.push(Reverse(ExpiryRecord {
            deadline,
            epoch,
            key,
        }));
        becomes_head
    }

    // == Next Deadline ==
    /// Returns the earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.heap.peek().map(|Reverse(record)| record.deadline)
    }

    // == Pop Due ==
    /// Removes and returns the head record if its deadline is `<= now`.
    pub fn pop_due(&mut self, now: Instant) -> Option<ExpiryRecord<K>> {
        if self.next_deadline()? > now {
            return None;
        }
        self.heap.pop().map(|Reverse(record)| record)
    }

    // == Retain ==
    /// Keeps only the records for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&ExpiryRecord<K>) -> bool) {
        self.heap.retain(|Reverse(record)| keep(record));
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.heap.clear();
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
