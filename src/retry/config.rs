//! Retry Configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{millis, MIN_DURATION};

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_millis(100);
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(10);
pub const DEFAULT_BACKOFF_FACTOR: f64 = 2.0;
pub const DEFAULT_JITTER_FACTOR: f64 = 0.1;

// == Retry Config ==
/// Backoff schedule for the retry executor.
///
/// `max_retries` counts retries, so an operation runs at most
/// `max_retries + 1` times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    max_retries: u32,
    #[serde(rename = "initial_backoff_ms", with = "millis")]
    initial_backoff: Duration,
    #[serde(rename = "max_backoff_ms", with = "millis")]
    max_backoff: Duration,
    backoff_factor: f64,
    jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
            max_backoff: DEFAULT_MAX_BACKOFF,
            backoff_factor: DEFAULT_BACKOFF_FACTOR,
            jitter_factor: DEFAULT_JITTER_FACTOR,
        }
    }
}

impl RetryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    // == Builders ==
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Zero becomes 1ms. Raises `max_backoff` if it would fall below.
    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff.max(MIN_DURATION);
        self.max_backoff = self.max_backoff.max(self.initial_backoff);
        self
    }

    /// Anything below `initial_backoff` (including zero) becomes
    /// `initial_backoff`.
    pub fn with_max_backoff(mut self, backoff: Duration) -> Self {
        self.max_backoff = backoff.max(self.initial_backoff);
        self
    }

    /// Non-positive or non-finite becomes 1.0.
    pub fn with_backoff_factor(mut self, factor: f64) -> Self {
        self.backoff_factor = if factor.is_finite() && factor > 0.0 {
            factor
        } else {
            1.0
        };
        self
    }

    /// Clamped to `[0, 1]`; NaN becomes 0.
    pub fn with_jitter_factor(mut self, jitter: f64) -> Self {
        self.jitter_factor = if jitter.is_nan() {
            0.0
        } else {
            jitter.clamp(0.0, 1.0)
        };
        self
    }

    pub fn coerced(self) -> Self {
        let (initial, max) = (self.initial_backoff, self.max_backoff);
        let (factor, jitter) = (self.backoff_factor, self.jitter_factor);
        self.with_initial_backoff(initial)
            .with_max_backoff(max)
            .with_backoff_factor(factor)
            .with_jitter_factor(jitter)
    }

    // == Accessors ==
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Total attempts including the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    pub fn initial_backoff(&self) -> Duration {
        self.initial_backoff
    }

    pub fn max_backoff(&self) -> Duration {
        self.max_backoff
    }

    pub fn backoff_factor(&self) -> f64 {
        self.backoff_factor
    }

    pub fn jitter_factor(&self) -> f64 {
        self.jitter_factor
    }
}
