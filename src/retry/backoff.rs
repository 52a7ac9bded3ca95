//! Exponential Backoff
//!
//! Tracks the un-jittered delay for one retry loop. Jitter is drawn fresh
//! from the loop's own RNG each time and applied after clamping, so a
//! jittered delay may exceed `max_backoff` by up to the jitter fraction.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::retry::RetryConfig;

/// Maps a uniform sample in `[0, 1)` to a multiplier in
/// `[1 - jitter, 1 + jitter)`.
pub fn jitter_multiplier(sample: f64, jitter: f64) -> f64 {
    1.0 + (sample * 2.0 - 1.0) * jitter
}

/// Scales `backoff` by `multiplier`. Unrepresentable results leave it as is.
pub fn apply_jitter(backoff: Duration, multiplier: f64) -> Duration {
    Duration::try_from_secs_f64(backoff.as_secs_f64() * multiplier).unwrap_or(backoff)
}

// == Backoff ==
#[derive(Debug)]
pub struct Backoff {
    current: Duration,
    max: Duration,
    factor: f64,
    jitter: f64,
    rng: StdRng,
}

impl Backoff {
    /// Starts at `initial_backoff` with an entropy-seeded RNG.
    pub fn new(config: &RetryConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Deterministic variant for tests and reproducible schedules.
    pub fn with_seed(config: &RetryConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: &RetryConfig, rng: StdRng) -> Self {
        Self {
            current: config.initial_backoff(),
            max: config.max_backoff(),
            factor: config.backoff_factor(),
            jitter: config.jitter_factor(),
            rng,
        }
    }

    /// The un-jittered delay for the next wait.
    pub fn current(&self) -> Duration {
        self.current
    }

    /// The next wait with jitter applied.
    pub fn jittered(&mut self) -> Duration {
        if self.jitter == 0.0 {
            return self.current;
        }
        let sample: f64 = self.rng.gen();
        apply_jitter(self.current, jitter_multiplier(sample, self.jitter))
    }

    /// Multiplies the delay by the factor, clamped to the maximum.
    pub fn grow(&mut self) {
        let next = self.current.as_secs_f64() * self.factor;
        self.current = Duration::try_from_secs_f64(next)
            .map(|next| next.min(self.max))
            .unwrap_or(self.max);
    }
}
