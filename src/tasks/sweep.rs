//! TTL Sweep Task
//!
//! Background task that periodically removes expired cache entries. Readers
//! never see stale entries regardless of sweep timing; the sweep only bounds
//! memory held by identifiers that are written once and never read again.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::{OrderCache, MIN_SWEEP_INTERVAL};

/// Spawns a background task that periodically sweeps expired cache entries.
///
/// The first sweep runs one full `interval` after spawning. An interval
/// below [`MIN_SWEEP_INTERVAL`] is raised to it. The task exits when
/// `shutdown` is cancelled.
///
/// # Arguments
/// * `cache` - Handle to the cache to sweep
/// * `interval` - Time between sweeps
/// * `shutdown` - Token that stops the task
///
/// # Example
/// ```ignore
/// let token = CancellationToken::new();
/// let handle = spawn_sweep_task(cache.clone(), Duration::from_secs(3600), token.clone());
/// // Later, during shutdown:
/// token.cancel();
/// handle.await?;
/// ```
pub fn spawn_sweep_task(
    cache: OrderCache,
    interval: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    let interval = interval.max(MIN_SWEEP_INTERVAL);
    tokio::spawn(async move {
        info!(interval_secs = interval.as_secs(), "Starting cache sweep task");

        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Cache sweep task stopping");
                    return;
                }
                _ = ticker.tick() => {}
            }

            let removed = cache.sweep_expired().await;
            if removed > 0 {
                info!(removed, "Cache sweep: removed expired entries");
            } else {
                debug!("Cache sweep: no expired entries found");
            }
        }
    })
}

// == Sweeper ==
/// Owns a running sweep task. Dropping it cancels the task.
#[derive(Debug)]
pub struct Sweeper {
    shutdown: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl Sweeper {
    /// Starts sweeping `cache` every `interval`.
    pub fn start(cache: OrderCache, interval: Duration) -> Self {
        let shutdown = CancellationToken::new();
        let handle = spawn_sweep_task(cache, interval, shutdown.clone());
        Self {
            shutdown,
            handle: Some(handle),
        }
    }

    /// Stops the task and waits for it to finish.
    pub async fn stop(mut self) {
        self.shutdown.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                warn!(error = %err, "Cache sweep task ended abnormally");
            }
        }
    }

    /// Returns true once the task has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
