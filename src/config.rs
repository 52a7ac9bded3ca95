//! Configuration Module
//!
//! Loads the settings for every component from environment variables or a
//! JSON document. Every value passes through the component's coercing
//! builders, so a loaded configuration is always valid.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::{CacheConfig, EvictionPolicy};
use crate::error::ConfigError;
use crate::rate::RateLimitConfig;
use crate::retry::RetryConfig;

/// Smallest duration any component accepts; zero is coerced up to this.
pub const MIN_DURATION: Duration = Duration::from_millis(1);

/// Default HTTP port for the demo server.
pub const DEFAULT_SERVER_PORT: u16 = 3000;

/// Serde adapter storing a `Duration` as whole milliseconds.
pub(crate) mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let ms = u64::try_from(value.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(ms)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

// == Settings ==
/// Settings for the whole process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// HTTP server port
    pub server_port: u16,
    pub cache: CacheConfig,
    pub rate_limit: RateLimitConfig,
    pub retry: RetryConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_port: DEFAULT_SERVER_PORT,
            cache: CacheConfig::default(),
            rate_limit: RateLimitConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl Settings {
    /// Creates settings from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_ENABLED`, `CACHE_DEFAULT_TTL_MS`, `CACHE_MAX_SIZE`,
    ///   `CACHE_SWEEP_INTERVAL_MS`, `CACHE_EVICTION` (`lru|fifo|lfu`)
    /// - `RATE_LIMIT_ENABLED`, `RATE_LIMIT_RPS`, `RATE_LIMIT_BURST`
    /// - `RETRY_MAX_RETRIES`, `RETRY_INITIAL_BACKOFF_MS`,
    ///   `RETRY_MAX_BACKOFF_MS`, `RETRY_BACKOFF_FACTOR`, `RETRY_JITTER_FACTOR`
    /// - `SERVER_PORT` (default: 3000)
    ///
    /// Missing or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`Settings::from_env`] but reads from an arbitrary source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let cache_defaults = &defaults.cache;
        let cache = CacheConfig::new()
            .with_enabled(parse_or(&lookup, "CACHE_ENABLED", cache_defaults.enabled()))
            .with_default_ttl(millis_or(
                &lookup,
                "CACHE_DEFAULT_TTL_MS",
                cache_defaults.default_ttl(),
            ))
            .with_max_size(parse_or(&lookup, "CACHE_MAX_SIZE", cache_defaults.max_size()))
            .with_sweep_interval(millis_or(
                &lookup,
                "CACHE_SWEEP_INTERVAL_MS",
                cache_defaults.sweep_interval(),
            ))
            .with_eviction(parse_or::<EvictionPolicy, _>(
                &lookup,
                "CACHE_EVICTION",
                cache_defaults.eviction(),
            ));

        let rate_defaults = &defaults.rate_limit;
        let rate_limit = RateLimitConfig::new()
            .with_enabled(parse_or(&lookup, "RATE_LIMIT_ENABLED", rate_defaults.enabled()))
            .with_requests_per_second(parse_or(
                &lookup,
                "RATE_LIMIT_RPS",
                rate_defaults.requests_per_second(),
            ))
            .with_burst_size(parse_or(&lookup, "RATE_LIMIT_BURST", rate_defaults.burst_size()));

        let retry_defaults = &defaults.retry;
        let retry = RetryConfig::new()
            .with_max_retries(parse_or(&lookup, "RETRY_MAX_RETRIES", retry_defaults.max_retries()))
            .with_initial_backoff(millis_or(
                &lookup,
                "RETRY_INITIAL_BACKOFF_MS",
                retry_defaults.initial_backoff(),
            ))
            .with_max_backoff(millis_or(
                &lookup,
                "RETRY_MAX_BACKOFF_MS",
                retry_defaults.max_backoff(),
            ))
            .with_backoff_factor(parse_or(
                &lookup,
                "RETRY_BACKOFF_FACTOR",
                retry_defaults.backoff_factor(),
            ))
            .with_jitter_factor(parse_or(
                &lookup,
                "RETRY_JITTER_FACTOR",
                retry_defaults.jitter_factor(),
            ));

        Self {
            server_port: parse_or(&lookup, "SERVER_PORT", defaults.server_port),
            cache,
            rate_limit,
            retry,
        }
    }

    /// Parses a JSON document. Durations are milliseconds, missing fields
    /// take their defaults, and every value is coerced after loading.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        Ok(settings.coerced())
    }

    /// Re-applies every component's coercions.
    pub fn coerced(self) -> Self {
        Self {
            server_port: self.server_port,
            cache: self.cache.coerced(),
            rate_limit: self.rate_limit.coerced(),
            retry: self.retry.coerced(),
        }
    }
}

// == Helpers ==
fn parse_or<T, F>(read: &F, name: &str, default: T) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    read(name)
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(default)
}

fn millis_or<F>(read: &F, name: &str, default: Duration) -> Duration
where
    F: Fn(&str) -> Option<String>,
{
    read(name)
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}
