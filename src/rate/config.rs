//! Rate Limiter Configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{millis, MIN_DURATION};

/// Default refill rate.
pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 10;

/// Default bucket capacity.
pub const DEFAULT_BURST_SIZE: u32 = 20;

/// Default sleep between admission checks in wait mode.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

// == Rate Limit Config ==
/// Token bucket settings. `burst_size` is the capacity, `requests_per_second`
/// the refill rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    enabled: bool,
    requests_per_second: u32,
    burst_size: u32,
    #[serde(rename = "poll_interval_ms", with = "millis")]
    poll_interval: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            requests_per_second: DEFAULT_REQUESTS_PER_SECOND,
            burst_size: DEFAULT_BURST_SIZE,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl RateLimitConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn disabled() -> Self {
        Self::default().with_enabled(false)
    }

    // == Builders ==
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Zero becomes 1.
    pub fn with_requests_per_second(mut self, rps: u32) -> Self {
        self.requests_per_second = rps.max(1);
        self
    }

    /// Zero becomes 1.
    pub fn with_burst_size(mut self, burst: u32) -> Self {
        self.burst_size = burst.max(1);
        self
    }

    /// Zero becomes 1ms.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(MIN_DURATION);
        self
    }

    pub fn coerced(self) -> Self {
        let (rps, burst, poll) = (self.requests_per_second, self.burst_size, self.poll_interval);
        self.with_requests_per_second(rps)
            .with_burst_size(burst)
            .with_poll_interval(poll)
    }

    // == Accessors ==
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn requests_per_second(&self) -> u32 {
        self.requests_per_second
    }

    pub fn burst_size(&self) -> u32 {
        self.burst_size
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RateLimitConfig::default();
        assert!(config.enabled());
        assert_eq!(config.requests_per_second(), 10);
        assert_eq!(config.burst_size(), 20);
        assert_eq!(config.poll_interval(), Duration::from_millis(10));
    }

    #[test]
    fn test_zero_values_are_coerced() {
        let config = RateLimitConfig::new()
            .with_requests_per_second(0)
            .with_burst_size(0)
            .with_poll_interval(Duration::ZERO);

        assert_eq!(config.requests_per_second(), 1);
        assert_eq!(config.burst_size(), 1);
        assert_eq!(config.poll_interval(), MIN_DURATION);
    }

    #[test]
    fn test_deserialized_zero_is_coerced() {
        let config: RateLimitConfig =
            serde_json::from_str(r#"{"requests_per_second":0,"poll_interval_ms":0}"#).unwrap();
        let config = config.coerced();

        assert_eq!(config.requests_per_second(), 1);
        assert_eq!(config.burst_size(), DEFAULT_BURST_SIZE);
        assert_eq!(config.poll_interval(), MIN_DURATION);
    }
}
