//! Cache Handle
//!
//! `Cache` is either a live [`ExpiringCache`] or the disabled variant, whose
//! operations are all no-ops. Callers treat "no cache" as a normal state.

use std::future::Future;
use std::time::Duration;

use crate::cache::{CacheConfig, CacheStats, ExpiringCache};
use crate::telemetry::Telemetry;

// == Cache ==
#[derive(Debug)]
pub enum Cache<V> {
    Enabled(ExpiringCache<V>),
    Disabled,
}

impl<V> Cache<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Builds a live cache, or `Disabled` when the config says so.
    ///
    /// A live cache spawns its sweep task, so this must run inside a tokio
    /// runtime.
    pub fn new(config: CacheConfig, telemetry: Telemetry) -> Self {
        if !config.enabled() {
            telemetry.logger().info("cache disabled by configuration", &[]);
            return Cache::Disabled;
        }
        Cache::Enabled(ExpiringCache::new(config, telemetry))
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Cache::Enabled(_))
    }

    pub fn as_enabled(&self) -> Option<&ExpiringCache<V>> {
        match self {
            Cache::Enabled(cache) => Some(cache),
            Cache::Disabled => None,
        }
    }

    // == Operations ==
    pub async fn set(&self, key: impl Into<String>, value: V) {
        if let Cache::Enabled(cache) = self {
            cache.set(key, value).await;
        }
    }

    pub async fn set_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) {
        if let Cache::Enabled(cache) = self {
            cache.set_with_ttl(key, value, ttl).await;
        }
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        match self {
            Cache::Enabled(cache) => cache.get(key).await,
            Cache::Disabled => None,
        }
    }

    pub async fn delete(&self, key: &str) {
        if let Cache::Enabled(cache) = self {
            cache.delete(key).await;
        }
    }

    pub async fn clear(&self) {
        if let Cache::Enabled(cache) = self {
            cache.clear().await;
        }
    }

    pub async fn size(&self) -> usize {
        match self {
            Cache::Enabled(cache) => cache.size().await,
            Cache::Disabled => 0,
        }
    }

    pub async fn stats(&self) -> CacheStats {
        match self {
            Cache::Enabled(cache) => cache.stats().await,
            Cache::Disabled => CacheStats::default(),
        }
    }

    pub fn shutdown(&self) {
        if let Cache::Enabled(cache) = self {
            cache.shutdown();
        }
    }

    // == Get Or Compute ==
    /// Returns the cached value for `key`, or runs `supplier` and caches
    /// its success under the default TTL.
    ///
    /// A supplier error is returned as-is and nothing is cached. On a
    /// disabled cache the supplier always runs.
    pub async fn get_or_compute<F, Fut, E>(&self, key: &str, supplier: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        self.compute_into(key, None, supplier).await
    }

    /// Like [`Cache::get_or_compute`] with an explicit TTL for the stored
    /// value.
    pub async fn get_or_compute_with_ttl<F, Fut, E>(
        &self,
        key: &str,
        ttl: Duration,
        supplier: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        self.compute_into(key, Some(ttl), supplier).await
    }

    async fn compute_into<F, Fut, E>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        supplier: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let cache = match self {
            Cache::Enabled(cache) => cache,
            Cache::Disabled => return supplier().await,
        };

        if let Some(hit) = cache.get(key).await {
            return Ok(hit);
        }

        let value = supplier().await?;
        match ttl {
            Some(ttl) => cache.set_with_ttl(key, value.clone(), ttl).await,
            None => cache.set(key, value.clone()).await,
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn live(ttl_ms: u64) -> Cache<u64> {
        Cache::new(
            CacheConfig::new()
                .with_max_size(10)
                .with_default_ttl(Duration::from_millis(ttl_ms)),
            Telemetry::noop(),
        )
    }

    #[tokio::test]
    async fn test_disabled_config_yields_sentinel() {
        let cache: Cache<u64> = Cache::new(CacheConfig::disabled(), Telemetry::noop());
        assert!(!cache.is_enabled());
        assert!(cache.as_enabled().is_none());
    }

    #[tokio::test]
    async fn test_disabled_operations_are_noops() {
        let cache: Cache<u64> = Cache::Disabled;

        cache.set("a", 1).await;
        cache.set_with_ttl("b", 2, Duration::from_secs(1)).await;
        assert_eq!(cache.get("a").await, None);
        cache.delete("a").await;
        cache.clear().await;
        assert_eq!(cache.size().await, 0);
        assert_eq!(cache.stats().await, CacheStats::default());
        cache.shutdown();
        cache.shutdown();
    }

    #[tokio::test]
    async fn test_get_or_compute_runs_supplier_once() {
        let cache = live(60_000);
        let counter = AtomicUsize::new(0);
        let calls = &counter;

        for _ in 0..2 {
            let value = cache
                .get_or_compute("answer", move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, std::io::Error>(42)
                })
                .await
                .unwrap();
            assert_eq!(value, 42);
        }

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        cache.shutdown();
    }

    #[tokio::test]
    async fn test_get_or_compute_error_is_not_cached() {
        let cache = live(60_000);

        let err = cache
            .get_or_compute("k", || async { Err::<u64, _>("upstream down".to_string()) })
            .await
            .unwrap_err();

        assert_eq!(err, "upstream down");
        assert_eq!(cache.get("k").await, None);
        assert_eq!(cache.size().await, 0);
        cache.shutdown();
    }

    #[tokio::test]
    async fn test_get_or_compute_disabled_always_calls_supplier() {
        let cache: Cache<u64> = Cache::Disabled;
        let counter = AtomicUsize::new(0);
        let calls = &counter;

        for _ in 0..3 {
            cache
                .get_or_compute("k", move || async move {
                    Ok::<_, std::convert::Infallible>(calls.fetch_add(1, Ordering::SeqCst) as u64)
                })
                .await
                .unwrap();
        }

        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_or_compute_with_ttl_recomputes_after_expiry() {
        let cache = live(60_000);
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let compute = move || async move {
            Ok::<_, std::convert::Infallible>(calls.fetch_add(1, Ordering::SeqCst) as u64)
        };

        assert_eq!(
            cache.get_or_compute_with_ttl("k", Duration::from_millis(20), compute).await,
            Ok(0)
        );
        tokio::time::advance(Duration::from_millis(30)).await;
        assert_eq!(
            cache.get_or_compute_with_ttl("k", Duration::from_millis(20), compute).await,
            Ok(1)
        );
        cache.shutdown();
    }
}
