//! Expiring Cache
//!
//! Thread-safe handle over a [`CacheStore`] that owns the background sweep.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::cache::sweep::spawn_sweep_task;
use crate::cache::{CacheConfig, CacheStats, CacheStore};
use crate::telemetry::{field, Telemetry};

// == Expiring Cache ==
/// A live, concurrency-safe TTL cache.
///
/// All mutations, reads and the sweep serialize on one lock. The sweep runs
/// until [`ExpiringCache::shutdown`] is called or the cache is dropped.
pub struct ExpiringCache<V> {
    store: Arc<RwLock<CacheStore<V>>>,
    config: CacheConfig,
    stop: CancellationToken,
    sweeper: Mutex<Option<JoinHandle<()>>>,
    telemetry: Telemetry,
}

impl<V> std::fmt::Debug for ExpiringCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpiringCache")
            .field("config", &self.config)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl<V> ExpiringCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Builds the store and starts the sweep task.
    ///
    /// Must be called from within a tokio runtime. The `enabled` flag is not
    /// consulted here; see [`crate::cache::Cache::new`].
    pub fn new(config: CacheConfig, telemetry: Telemetry) -> Self {
        let config = config.coerced();
        let store = Arc::new(RwLock::new(CacheStore::from_config(&config)));
        let stop = CancellationToken::new();
        let handle = spawn_sweep_task(
            store.clone(),
            config.sweep_interval(),
            stop.clone(),
            telemetry.clone(),
        );

        telemetry.logger().info(
            "cache initialized",
            &[
                field("max_size", config.max_size()),
                field("default_ttl_ms", config.default_ttl().as_millis()),
                field("sweep_interval_ms", config.sweep_interval().as_millis()),
                field("eviction", config.eviction()),
            ],
        );

        Self {
            store,
            config,
            stop,
            sweeper: Mutex::new(Some(handle)),
            telemetry,
        }
    }

    // == Set ==
    pub async fn set(&self, key: impl Into<String>, value: V) {
        self.insert(key.into(), value, None).await;
    }

    /// Like [`ExpiringCache::set`] with a per-entry TTL.
    pub async fn set_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) {
        self.insert(key.into(), value, Some(ttl)).await;
    }

    async fn insert(&self, key: String, value: V, ttl: Option<Duration>) {
        let mut span = self.telemetry.span("cache.set");
        span.set_attribute("cache.key", key.clone());

        let evicted = {
            let mut store = self.store.write().await;
            match ttl {
                Some(ttl) => store.set_with_ttl(key, value, ttl),
                None => store.set(key, value),
            }
        };

        if let Some(victim) = evicted {
            self.telemetry.logger().debug(
                "cache evicted entry",
                &[field("key", &victim), field("policy", self.config.eviction())],
            );
            span.set_attribute("cache.evicted", victim);
        }
        span.end();
    }

    // == Get ==
    /// Returns the live value under `key`; expired entries read as absent.
    pub async fn get(&self, key: &str) -> Option<V> {
        let mut span = self.telemetry.span("cache.get");
        span.set_attribute("cache.key", key.to_string());

        // Write lock: a hit updates access order and counters
        let value = self.store.write().await.get(key);

        span.set_attribute("cache.hit", value.is_some().to_string());
        span.end();
        value
    }

    // == Delete / Clear ==
    pub async fn delete(&self, key: &str) {
        let mut span = self.telemetry.span("cache.delete");
        span.set_attribute("cache.key", key.to_string());
        let removed = self.store.write().await.delete(key);
        span.set_attribute("cache.removed", removed.to_string());
        span.end();
    }

    pub async fn clear(&self) {
        let span = self.telemetry.span("cache.clear");
        let removed = self.store.write().await.clear();
        self.telemetry
            .logger()
            .debug("cache cleared", &[field("removed", removed)]);
        span.end();
    }

    // == Introspection ==
    /// Stored entries, counting expired ones the sweep has not reached yet.
    pub async fn size(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn stats(&self) -> CacheStats {
        self.store.read().await.stats()
    }
}

impl<V> ExpiringCache<V> {
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // == Shutdown ==
    /// Stops the sweep task. Repeated calls are no-ops.
    pub fn shutdown(&self) {
        if self.stop.is_cancelled() {
            return;
        }
        self.stop.cancel();
        self.telemetry.logger().info("cache shut down", &[]);
    }

    /// Whether the sweep task is still alive.
    pub fn is_running(&self) -> bool {
        let guard = self.sweeper.lock().unwrap_or_else(PoisonError::into_inner);
        guard.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Stops the sweep and waits for the task to exit.
    pub async fn shutdown_and_wait(&self) {
        self.shutdown();
        let handle = self
            .sweeper
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            // Cancelled or panicked: either way the task is gone.
            let _ = handle.await;
        }
    }
}

impl<V> Drop for ExpiringCache<V> {
    fn drop(&mut self) {
        self.stop.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::{Level, RecordingLogger, RecordingTracer};

    fn config(max_size: usize, ttl_ms: u64) -> CacheConfig {
        CacheConfig::new()
            .with_max_size(max_size)
            .with_default_ttl(Duration::from_millis(ttl_ms))
            .with_sweep_interval(Duration::from_millis(100))
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_get_and_expire() {
        let cache = ExpiringCache::new(config(10, 50), Telemetry::noop());

        cache.set("a", 1).await;
        assert_eq!(cache.get("a").await, Some(1));

        tokio::time::advance(Duration::from_millis(60)).await;
        assert_eq!(cache.get("a").await, None);

        cache.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_size_counts_expired_until_swept() {
        let cache = ExpiringCache::new(
            config(10, 1000).with_sweep_interval(Duration::from_secs(60)),
            Telemetry::noop(),
        );

        cache.set_with_ttl("short", 1, Duration::from_millis(10)).await;
        tokio::time::advance(Duration::from_millis(20)).await;

        assert_eq!(cache.get("short").await, None);
        assert_eq!(cache.size().await, 1);

        cache.shutdown_and_wait().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_background_sweep_purges() {
        let cache = ExpiringCache::new(config(10, 50), Telemetry::noop());

        cache.set("a", "x".to_string()).await;
        cache.set_with_ttl("b", "y".to_string(), Duration::from_secs(60)).await;

        tokio::time::sleep(Duration::from_millis(250)).await;

        assert_eq!(cache.size().await, 1);
        assert_eq!(cache.get("b").await, Some("y".to_string()));
        assert_eq!(cache.stats().await.expirations, 1);

        cache.shutdown_and_wait().await;
    }

    #[tokio::test]
    async fn test_capacity_and_latest_key_retrievable() {
        let cache = ExpiringCache::new(config(3, 60_000), Telemetry::noop());

        for i in 0..10 {
            let key = format!("k{}", i);
            cache.set(key.clone(), i).await;
            assert!(cache.size().await <= 3);
            assert_eq!(cache.get(&key).await, Some(i));
        }

        assert_eq!(cache.stats().await.evictions, 7);
        cache.shutdown();
    }

    #[tokio::test]
    async fn test_delete_and_clear() {
        let cache = ExpiringCache::new(config(10, 60_000), Telemetry::noop());

        cache.set("a", 1).await;
        cache.set("b", 2).await;
        cache.delete("a").await;
        cache.delete("missing").await;

        assert_eq!(cache.get("a").await, None);
        assert_eq!(cache.size().await, 1);

        cache.clear().await;
        assert_eq!(cache.size().await, 0);
        cache.shutdown();
    }

    #[tokio::test]
    async fn test_shutdown_is_idempotent() {
        let logger = Arc::new(RecordingLogger::default());
        let telemetry = Telemetry::noop().with_logger(logger.clone());
        let cache: ExpiringCache<u8> = ExpiringCache::new(config(10, 1000), telemetry);
        assert!(cache.is_running());

        cache.shutdown();
        cache.shutdown();
        cache.shutdown_and_wait().await;

        assert!(!cache.is_running());
        assert_eq!(
            logger.messages(Level::Info),
            vec!["cache initialized".to_string(), "cache shut down".to_string()]
        );
    }

    #[tokio::test]
    async fn test_operations_open_spans() {
        let tracer = RecordingTracer::default();
        let telemetry = Telemetry::noop().with_tracer(Arc::new(tracer.clone()));
        let cache = ExpiringCache::new(config(10, 1000), telemetry);

        cache.set("a", 1).await;
        cache.get("a").await;

        let events = tracer.events();
        assert!(events.contains(&"start:cache.set".to_string()));
        assert!(events.contains(&"cache.get:cache.hit=true".to_string()));
        assert!(events.contains(&"end:cache.get".to_string()));
        cache.shutdown();
    }

    #[tokio::test]
    async fn test_eviction_is_logged() {
        let logger = Arc::new(RecordingLogger::default());
        let telemetry = Telemetry::noop().with_logger(logger.clone());
        let cache = ExpiringCache::new(config(1, 1000), telemetry);

        cache.set("a", 1).await;
        cache.set("b", 2).await;

        assert_eq!(
            logger.messages(Level::Debug)
                .iter()
                .filter(|m| m.as_str() == "cache evicted entry")
                .count(),
            1
        );
        cache.shutdown();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_sets_respect_capacity() {
        let cache = Arc::new(ExpiringCache::new(config(5, 60_000), Telemetry::noop()));

        let tasks: Vec<_> = (0..50)
            .map(|i| {
                let cache = cache.clone();
                tokio::spawn(async move {
                    cache.set(format!("k{}", i), i).await;
                    cache.size().await
                })
            })
            .collect();

        for task in tasks {
            assert!(task.await.unwrap() <= 5);
        }

        let stats = cache.stats().await;
        assert_eq!(cache.size().await, 5);
        assert_eq!(stats.entries, 5);
        assert_eq!(stats.evictions, 45);
        cache.shutdown();
    }
}
