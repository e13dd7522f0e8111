//! TTL Map Store Module
//!
//! Main map combining HashMap storage with a single background expiration worker.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, MutexGuard};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, trace, warn};

use crate::cache::{Entry, TtlMapStats};
use crate::config::TtlMapConfig;
use crate::error::{InsertError, NotFound};
use crate::tasks::{spawn_reaper, DeadlineQueue};

/// Inert records tolerated per live entry before the queue is compacted.
const COMPACT_FACTOR: usize = 2;
/// Inert records tolerated regardless of map size.
const COMPACT_SLACK: usize = 64;

// == Shared State ==
/// Everything the map and its expiration worker share.
#[derive(Debug)]
pub(crate) struct Shared<K, V> {
    /// Table, pending deadlines and counters behind one lock
    state: Mutex<State<K, V>>,
    /// Wakes the worker when the head deadline moves or the queue empties
    wakeup: Notify,
    /// Set once the map is shut down
    closed: AtomicBool,
}

impl<K, V> Shared<K, V> {
    pub(crate) fn new(initial_capacity: usize) -> Self {
        Self {
            state: Mutex::new(State {
                entries: HashMap::with_capacity(initial_capacity),
                queue: DeadlineQueue::new(),
                next_epoch: 0,
                stats: TtlMapStats::new(),
            }),
            wakeup: Notify::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// Locks the state. Never held across an `.await`.
    pub(crate) fn lock(&self) -> MutexGuard<'_, State<K, V>> {
        self.state.lock()
    }

    pub(crate) fn wake(&self) {
        self.wakeup.notify_one();
    }

    /// Resolves on the next `wake`, or immediately if one is already pending.
    pub(crate) async fn woken(&self) {
        self.wakeup.notified().await;
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub(crate) fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.wake();
    }
}

// == Guarded State ==
#[derive(Debug)]
pub(crate) struct State<K, V> {
    entries: HashMap<K, Entry<V>>,
    queue: DeadlineQueue<K>,
    next_epoch: u64,
    stats: TtlMapStats,
}

impl<K, V> State<K, V>
where
    K: Eq + Hash,
{
    // == Expire Due ==
    /// Pops every record whose deadline is `<= now` and removes the entries
    /// they still refer to.
    ///
    /// A record whose key is gone, or whose key now carries another epoch, is
    /// dropped without touching the table. Returns the number removed.
    pub(crate) fn expire_due(&mut self, now: Instant) -> usize {
        let mut removed = 0;
        while let Some(record) = self.queue.pop_due(now) {
            let live = self
                .entries
                .get(&record.key)
                .is_some_and(|entry| entry.epoch == record.epoch);
            if live {
                self.entries.remove(&record.key);
                removed += 1;
            }
        }
        self.stats.record_expirations(removed);
        removed
    }

    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        self.queue.next_deadline()
    }

    /// Drops inert records left behind by deletes.
    ///
    /// Returns true if the queue was emptied, so the worker should park.
    fn discard_stale(&mut self) -> bool {
        if self.entries.is_empty() {
            let had_pending = !self.queue.is_empty();
            self.queue.clear();
            return had_pending;
        }

        if self.queue.len() > COMPACT_FACTOR * self.entries.len() + COMPACT_SLACK {
            let entries = &self.entries;
            let before = self.queue.len();
            self.queue.retain(|record| {
                entries
                    .get(&record.key)
                    .is_some_and(|entry| entry.epoch == record.epoch)
            });
            trace!(
                "Compacted expiration queue from {} to {} records",
                before,
                self.queue.len()
            );
        }
        false
    }

    /// Empties the table and drops every pending record. Returns the number
    /// of entries removed.
    fn clear_all(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        self.queue.clear();
        removed
    }
}

// == TTL Map ==
/// A concurrent map whose entries are removed once their TTL elapses.
///
/// Entries are insert-only: a live key cannot be overwritten and must be
/// deleted first. Removal on expiry is performed by one background Tokio task
/// per map, which sleeps until the nearest deadline.
///
/// Share a map between tasks or threads by wrapping it in an `Arc`.
///
/// The worker runs on the Tokio runtime the map was created in and lives no
/// longer than it. Once that runtime shuts down, entries stop expiring: the
/// remaining operations keep working but behave like a map without TTLs.
/// Create the map in a runtime that outlives it.
///
/// # Example
/// ```no_run
/// # async fn demo() {
/// use std::time::Duration;
/// use ttlmap::TtlMap;
///
/// let map: TtlMap<String, u32> = TtlMap::new(16, 100);
/// map.set("answer".to_string(), 42, Duration::from_secs(60)).unwrap();
/// assert_eq!(map.get("answer"), Some(42));
/// map.delete("answer").unwrap();
/// map.shutdown().await;
/// # }
/// ```
#[derive(Debug)]
pub struct TtlMap<K, V> {
    shared: Arc<Shared<K, V>>,
    /// Hard bound on live entries, None = unbounded
    capacity: Option<usize>,
    /// Expiration worker, taken on shutdown
    reaper: Option<JoinHandle<()>>,
}

impl<K, V> TtlMap<K, V>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Send + 'static,
{
    // == Constructor ==
    /// Creates a map and starts its expiration worker.
    ///
    /// # Arguments
    /// * `initial_capacity` - Number of entries to preallocate room for
    /// * `max_capacity` - Maximum number of live entries, 0 = unbounded
    ///
    /// # Panics
    /// Panics if called outside the context of a Tokio runtime.
    pub fn new(initial_capacity: usize, max_capacity: usize) -> Self {
        Self::with_config(&TtlMapConfig {
            initial_capacity,
            max_capacity,
        })
    }

    /// Creates a map from a TtlMapConfig.
    ///
    /// # Panics
    /// Panics if called outside the context of a Tokio runtime.
    pub fn with_config(config: &TtlMapConfig) -> Self {
        let shared = Arc::new(Shared::new(config.initial_capacity));
        let reaper = spawn_reaper(Arc::clone(&shared));

        Self {
            shared,
            capacity: config.capacity_limit(),
            reaper: Some(reaper),
        }
    }

    // == Set ==
    /// Inserts `value` under `key` for `ttl`.
    ///
    /// A zero `ttl` is accepted: the entry is due immediately and is removed
    /// on the worker's next pass.
    ///
    /// # Errors
    /// * `InsertError::AlreadyExists` if `key` is live
    /// * `InsertError::CapacityExceeded` if the map is full
    pub fn set(&self, key: K, value: V, ttl: Duration) -> Result<(), InsertError> {
        let mut state = self.shared.lock();

        if state.entries.contains_key(&key) {
            state.stats.record_rejection();
            return Err(InsertError::AlreadyExists);
        }

        if let Some(capacity) = self.capacity {
            if state.entries.len() >= capacity {
                state.stats.record_rejection();
                return Err(InsertError::CapacityExceeded { capacity });
            }
        }

        let epoch = state.next_epoch;
        state.next_epoch += 1;

        let entry = Entry::new(value, Instant::now(), ttl, epoch);
        let becomes_head = state.queue.schedule(key.clone(), epoch, entry.deadline);
        state.entries.insert(key, entry);
        state.stats.record_insert();
        drop(state);

        if becomes_head {
            self.shared.wake();
        }
        trace!("Inserted entry epoch={} ttl={:?}", epoch, ttl);
        Ok(())
    }

    // == Get ==
    /// Returns a copy of the live value for `key`.
    ///
    /// Lookups never extend an entry's lifetime.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        let mut state = self.shared.lock();
        let value = state.entries.get(key).map(|entry| entry.value.clone());

        if value.is_some() {
            state.stats.record_hit();
        } else {
            state.stats.record_miss();
        }
        value
    }

    // == Delete ==
    /// Removes `key` immediately.
    ///
    /// The pending expiration of the removed entry can no longer fire: its
    /// epoch is gone from the table.
    pub fn delete<Q>(&self, key: &Q) -> Result<(), NotFound>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut state = self.shared.lock();
        let Some(entry) = state.entries.remove(key) else {
            return Err(NotFound);
        };
        state.stats.record_deletion();
        let drained = state.discard_stale();
        drop(state);

        if drained {
            self.shared.wake();
        }
        trace!("Deleted entry epoch={}", entry.epoch);
        Ok(())
    }

    // == Clear ==
    /// Removes every entry and every pending expiration in one step.
    pub fn clear(&self) {
        let removed = {
            let mut state = self.shared.lock();
            state.stats.record_clear();
            state.clear_all()
        };
        self.shared.wake();
        debug!("Cleared {} entries", removed);
    }

    // == Length ==
    /// Returns the number of live entries.
    pub fn len(&self) -> usize {
        self.shared.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.shared.lock().entries.contains_key(key)
    }

    // == Time To Live ==
    /// Returns how long `key` has left, or None if it is not live.
    ///
    /// Zero means the deadline passed and the worker has not run yet.
    pub fn ttl<Q>(&self, key: &Q) -> Option<Duration>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = Instant::now();
        self.shared
            .lock()
            .entries
            .get(key)
            .map(|entry| entry.remaining(now))
    }

    /// Returns the hard bound on live entries, None if unbounded.
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Returns the number of records the expiration worker is holding,
    /// including inert ones not yet discarded.
    pub fn pending(&self) -> usize {
        self.shared.lock().queue.len()
    }

    // == Stats ==
    /// Returns a snapshot of the map's counters.
    pub fn stats(&self) -> TtlMapStats {
        let state = self.shared.lock();
        let mut stats = state.stats.clone();
        stats.total_entries = state.entries.len();
        stats
    }

    // == Shutdown ==
    /// Stops the expiration worker, waits for it to exit and drops all
    /// entries. Pending expirations are discarded, not fired.
    pub async fn shutdown(mut self) {
        self.shared.close();
        if let Some(handle) = self.reaper.take() {
            if let Err(err) = handle.await {
                warn!("Expiration worker ended abnormally: {}", err);
            }
        }
        self.shared.lock().clear_all();
    }
}

impl<K, V> Drop for TtlMap<K, V> {
    fn drop(&mut self) {
        if let Some(handle) = self.reaper.take() {
            self.shared.close();
            handle.abort();
            // The aborted task may hold its Arc a little longer; values
            // must not live that long.
            let mut state = self.shared.lock();
            state.entries.clear();
            state.queue.clear();
        }
    }
}
