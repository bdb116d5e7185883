//! Expired-Entry Sweep Task
//!
//! Optional background task that removes expired entries without waiting
//! for them to be read. Storage is lazy-expiring by default; this task only
//! runs when a sweep interval is configured.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::storage::{KeyValueBackend, Storage};

/// Spawns a task that sweeps expired entries every `interval_secs` seconds.
///
/// The returned handle can be aborted on shutdown.
///
/// # Example
/// ```ignore
/// let storage = Arc::new(RwLock::new(Storage::new(MemoryBackend::new())));
/// let handle = spawn_sweep_task(storage.clone(), 60);
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_sweep_task<B>(storage: Arc<RwLock<Storage<B>>>, interval_secs: u64) -> JoinHandle<()>
where
    B: KeyValueBackend + 'static,
{
    let interval = Duration::from_secs(interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting expired-entry sweep with interval of {} seconds",
            interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = {
                let mut guard = storage.write().await;
                guard.sweep_expired()
            };

            if removed > 0 {
                info!("Sweep: removed {} expired entries", removed);
            } else {
                debug!("Sweep: no expired entries found");
            }
        }
    })
}
