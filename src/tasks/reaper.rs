//! Expiration Worker
//!
//! Background task that removes entries as their deadlines elapse.

use std::hash::Hash;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::cache::Shared;

/// Spawns the single background task that expires entries of one map.
///
/// The task sleeps until the nearest pending deadline, or until it is woken
/// because a nearer deadline was registered, the queue was emptied, or the
/// map was closed. On each pass it removes every entry whose deadline has
/// elapsed and whose epoch still matches its record.
///
/// # Arguments
/// * `shared` - State shared with the owning map
///
/// # Returns
/// A JoinHandle for the spawned task. The task exits on its own once the map
/// is closed; aborting it is also safe.
pub(crate) fn spawn_reaper<K, V>(shared: Arc<Shared<K, V>>) -> JoinHandle<()>
where
    K: Eq + Hash + Send + 'static,
    V: Send + 'static,
{
    tokio::spawn(async move {
        info!("Starting expiration worker");

        while !shared.is_closed() {
            let next_deadline = {
                let mut state = shared.lock();
                let removed = state.expire_due(Instant::now());
                if removed > 0 {
                    debug!("Expiration pass: removed {} entries", removed);
                }
                state.next_deadline()
            };

            match next_deadline {
                Some(deadline) => {
                    tokio::select! {
                        _ = tokio::time::sleep_until(deadline) => {}
                        _ = shared.woken() => {}
                    }
                }
                // Nothing pending: park until a registration or close
                None => shared.woken().await,
            }
        }

        info!("Expiration worker stopped");
    })
}
