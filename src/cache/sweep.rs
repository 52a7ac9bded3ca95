//! Expiration Sweep Task
//!
//! Background task that periodically removes expired cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::cache::CacheStore;
use crate::telemetry::{field, Telemetry};

/// Spawns the sweep loop for `store`.
///
/// Every `interval` the task takes the store's write lock and purges expired
/// entries. It exits as soon as `stop` is cancelled.
pub(crate) fn spawn_sweep_task<V>(
    store: Arc<RwLock<CacheStore<V>>>,
    interval: Duration,
    stop: CancellationToken,
    telemetry: Telemetry,
) -> JoinHandle<()>
where
    V: Send + Sync + 'static,
{
    tokio::spawn(async move {
        telemetry.logger().debug(
            "cache sweep started",
            &[field("interval_ms", interval.as_millis())],
        );

        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = stop.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let removed = {
                let mut guard = store.write().await;
                guard.purge_expired()
            };

            if removed > 0 {
                telemetry
                    .logger()
                    .debug("cache sweep removed expired entries", &[field("removed", removed)]);
            }
        }

        telemetry.logger().debug("cache sweep stopped", &[]);
    })
}
