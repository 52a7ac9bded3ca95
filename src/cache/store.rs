//! Cache Store Module
//!
//! The single-threaded cache engine: a map of entries, an eviction index and
//! statistics. `ExpiringCache` wraps it in a lock and adds the sweeper.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

use crate::cache::{CacheConfig, CacheEntry, CacheStats, EvictionIndex, EvictionPolicy};
use crate::config::MIN_DURATION;

// == Cache Store ==
/// Bounded key/value storage with per-entry expiration.
///
/// After any `set` returns, at most `max_size` entries are stored.
#[derive(Debug)]
pub struct CacheStore<V> {
    entries: HashMap<String, CacheEntry<V>>,
    index: EvictionIndex,
    stats: CacheStats,
    max_size: usize,
    default_ttl: Duration,
}

impl<V> CacheStore<V> {
    // == Constructor ==
    /// Creates a store; `max_size` and `default_ttl` are coerced like the
    /// config builders do.
    pub fn new(max_size: usize, default_ttl: Duration, policy: EvictionPolicy) -> Self {
        Self {
            entries: HashMap::new(),
            index: EvictionIndex::new(policy),
            stats: CacheStats::new(),
            max_size: max_size.max(1),
            default_ttl: default_ttl.max(MIN_DURATION),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.max_size(), config.default_ttl(), config.eviction())
    }

    // == Set ==
    /// Stores `value` under `key` for the default TTL.
    ///
    /// Returns the key evicted to make room, if any.
    pub fn set(&mut self, key: String, value: V) -> Option<String> {
        let ttl = self.default_ttl;
        self.set_with_ttl(key, value, ttl)
    }

    /// Stores `value` under `key` for `ttl` (zero becomes 1ms).
    ///
    /// When the store is full and `key` is new, exactly one entry is evicted
    /// first according to the eviction policy.
    pub fn set_with_ttl(&mut self, key: String, value: V, ttl: Duration) -> Option<String> {
        let ttl = ttl.max(MIN_DURATION);

        let evicted = if !self.entries.contains_key(&key) && self.entries.len() >= self.max_size {
            self.evict_one()
        } else {
            None
        };

        self.index.record_insert(&key);
        self.entries.insert(key, CacheEntry::new(value, ttl));
        self.stats.entries = self.entries.len();

        evicted
    }

    // == Get ==
    /// Returns the live value under `key`.
    ///
    /// Expired entries read as absent but stay stored until the sweep
    /// removes them.
    pub fn get(&mut self, key: &str) -> Option<V>
    where
        V: Clone,
    {
        let now = Instant::now();
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired_at(now) => {
                let value = entry.value.clone();
                self.stats.record_hit();
                self.index.record_access(key);
                Some(value)
            }
            _ => {
                self.stats.record_miss();
                None
            }
        }
    }

    /// Whether a live entry exists, without touching stats or access order.
    pub fn contains_live(&self, key: &str) -> bool {
        let now = Instant::now();
        self.entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired_at(now))
    }

    // == Delete ==
    /// Removes `key`; returns whether it was stored.
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.index.remove(key);
            self.stats.entries = self.entries.len();
        }
        removed
    }

    // == Clear ==
    /// Removes every entry; returns how many were stored.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        self.index.clear();
        self.stats.entries = 0;
        count
    }

    // == Purge Expired ==
    /// Removes every entry whose expiration instant has passed.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = Instant::now();
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.entries.remove(key);
            self.index.remove(key);
        }

        self.stats.record_expirations(expired.len());
        self.stats.entries = self.entries.len();
        expired.len()
    }

    // == Accessors ==
    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.entries = self.entries.len();
        stats
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    fn evict_one(&mut self) -> Option<String> {
        // The index tracks exactly the stored keys; the map fallback only
        // guards against the two drifting apart.
        let victim = self
            .index
            .pop_victim()
            .or_else(|| self.entries.keys().next().cloned())?;
        self.entries.remove(&victim);
        self.stats.record_eviction();
        Some(victim)
    }
}
