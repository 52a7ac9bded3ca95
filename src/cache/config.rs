//! Cache Configuration
//!
//! Immutable settings for an expiring cache. Every setter coerces its input
//! into a valid range instead of failing.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::EvictionPolicy;
use crate::config::{millis, MIN_DURATION};

/// Default lifetime of an entry.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Default capacity.
pub const DEFAULT_MAX_SIZE: usize = 1000;

/// Default background sweep period.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

// == Cache Config ==
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    enabled: bool,
    #[serde(rename = "default_ttl_ms", with = "millis")]
    default_ttl: Duration,
    max_size: usize,
    #[serde(rename = "sweep_interval_ms", with = "millis")]
    sweep_interval: Duration,
    eviction: EvictionPolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_ttl: DEFAULT_TTL,
            max_size: DEFAULT_MAX_SIZE,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            eviction: EvictionPolicy::default(),
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// A configuration that yields no cache at all.
    pub fn disabled() -> Self {
        Self::default().with_enabled(false)
    }

    // == Builders ==
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Zero becomes 1ms.
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl.max(MIN_DURATION);
        self
    }

    /// Zero becomes 1.
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size.max(1);
        self
    }

    /// Zero becomes 1ms.
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval.max(MIN_DURATION);
        self
    }

    pub fn with_eviction(mut self, policy: EvictionPolicy) -> Self {
        self.eviction = policy;
        self
    }

    /// Re-applies every coercion, for values that bypassed the builders
    /// (deserialisation).
    pub fn coerced(self) -> Self {
        let (ttl, size, interval) = (self.default_ttl, self.max_size, self.sweep_interval);
        self.with_default_ttl(ttl)
            .with_max_size(size)
            .with_sweep_interval(interval)
    }

    // == Accessors ==
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }

    pub fn eviction(&self) -> EvictionPolicy {
        self.eviction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CacheConfig::default();
        assert!(config.enabled());
        assert_eq!(config.default_ttl(), DEFAULT_TTL);
        assert_eq!(config.max_size(), DEFAULT_MAX_SIZE);
        assert_eq!(config.sweep_interval(), DEFAULT_SWEEP_INTERVAL);
        assert_eq!(config.eviction(), EvictionPolicy::Lru);
    }

    #[test]
    fn test_invalid_values_are_coerced() {
        let config = CacheConfig::new()
            .with_default_ttl(Duration::ZERO)
            .with_max_size(0)
            .with_sweep_interval(Duration::ZERO);

        assert_eq!(config.default_ttl(), Duration::from_millis(1));
        assert_eq!(config.max_size(), 1);
        assert_eq!(config.sweep_interval(), Duration::from_millis(1));
    }

    #[test]
    fn test_disabled() {
        assert!(!CacheConfig::disabled().enabled());
    }

    #[test]
    fn test_deserialize_partial_and_coerce() {
        let config: CacheConfig =
            serde_json::from_str(r#"{"max_size":0,"default_ttl_ms":50,"eviction":"lfu"}"#)
                .unwrap();
        let config = config.coerced();

        assert_eq!(config.max_size(), 1);
        assert_eq!(config.default_ttl(), Duration::from_millis(50));
        assert_eq!(config.sweep_interval(), DEFAULT_SWEEP_INTERVAL);
        assert_eq!(config.eviction(), EvictionPolicy::Lfu);
    }
}
