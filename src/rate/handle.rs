//! Rate Limiter Handle
//!
//! `RateLimiter` is either a live [`TokenBucketLimiter`] or the disabled
//! variant, which admits everything.

use std::future::Future;

use crate::cancel::Cancellation;
use crate::rate::{RateLimitConfig, RateLimitError, TokenBucketLimiter};
use crate::telemetry::Telemetry;

// == Rate Limiter ==
#[derive(Debug)]
pub enum RateLimiter {
    Enabled(TokenBucketLimiter),
    Disabled,
}

impl RateLimiter {
    /// Builds a live limiter, or `Disabled` when the config says so.
    pub fn new(config: RateLimitConfig, telemetry: Telemetry) -> Self {
        if !config.enabled() {
            telemetry
                .logger()
                .info("rate limiter disabled by configuration", &[]);
            return RateLimiter::Disabled;
        }
        RateLimiter::Enabled(TokenBucketLimiter::new(config, telemetry))
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, RateLimiter::Enabled(_))
    }

    pub fn as_enabled(&self) -> Option<&TokenBucketLimiter> {
        match self {
            RateLimiter::Enabled(limiter) => Some(limiter),
            RateLimiter::Disabled => None,
        }
    }

    /// Always true when disabled.
    pub fn allow(&self) -> bool {
        match self {
            RateLimiter::Enabled(limiter) => limiter.allow(),
            RateLimiter::Disabled => true,
        }
    }

    /// `None` when disabled.
    pub fn available_tokens(&self) -> Option<u64> {
        self.as_enabled().map(TokenBucketLimiter::available_tokens)
    }

    pub fn reset(&self) {
        if let RateLimiter::Enabled(limiter) = self {
            limiter.reset();
        }
    }

    pub async fn execute<F, Fut, T, E>(&self, op: F) -> Result<T, RateLimitError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        match self {
            RateLimiter::Enabled(limiter) => limiter.execute(op).await,
            RateLimiter::Disabled => op().await.map_err(RateLimitError::Operation),
        }
    }

    pub async fn execute_with_wait<F, Fut, T, E>(
        &self,
        cancel: &Cancellation,
        op: F,
    ) -> Result<T, RateLimitError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        match self {
            RateLimiter::Enabled(limiter) => limiter.execute_with_wait(cancel, op).await,
            RateLimiter::Disabled => op().await.map_err(RateLimitError::Operation),
        }
    }
}
