//! Token Bucket Limiter
//!
//! Thread-safe wrapper around [`TokenBucket`] with the immediate and
//! wait-until-available execution helpers.

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::time::Instant;

use crate::cancel::Cancellation;
use crate::error::Interrupted;
use crate::rate::{RateLimitConfig, RateLimitError, TokenBucket};
use crate::telemetry::{field, Telemetry};

// == Token Bucket Limiter ==
#[derive(Debug)]
pub struct TokenBucketLimiter {
    bucket: Mutex<TokenBucket>,
    config: RateLimitConfig,
    telemetry: Telemetry,
}

impl TokenBucketLimiter {
    /// Builds a full bucket. The `enabled` flag is not consulted here; see
    /// [`crate::rate::RateLimiter::new`].
    pub fn new(config: RateLimitConfig, telemetry: Telemetry) -> Self {
        let config = config.coerced();
        let bucket = TokenBucket::new(
            config.burst_size(),
            config.requests_per_second(),
            Instant::now(),
        );

        telemetry.logger().info(
            "rate limiter initialized",
            &[
                field("requests_per_second", config.requests_per_second()),
                field("burst_size", config.burst_size()),
            ],
        );

        Self {
            bucket: Mutex::new(bucket),
            config,
            telemetry,
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    // The bucket is never left half-updated, so a poisoned lock is still
    // consistent.
    fn bucket(&self) -> MutexGuard<'_, TokenBucket> {
        self.bucket.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // == Allow ==
    /// Refills by elapsed time, then takes a token if one is available.
    pub fn allow(&self) -> bool {
        self.bucket().try_acquire(Instant::now())
    }

    /// Tokens currently in the bucket, as of the last refill.
    pub fn available_tokens(&self) -> u64 {
        self.bucket().available()
    }

    // == Reset ==
    /// Refills to capacity and restarts the refill clock.
    pub fn reset(&self) {
        self.bucket().reset(Instant::now());
        self.telemetry.logger().debug("rate limiter reset", &[]);
    }

    // == Execute ==
    /// Runs `op` if a token is available right now, otherwise fails with
    /// [`RateLimitError::Exceeded`] without calling it.
    pub async fn execute<F, Fut, T, E>(&self, op: F) -> Result<T, RateLimitError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut span = self.telemetry.span("rate.execute");

        if !self.allow() {
            self.telemetry.logger().warn(
                "rate limit exceeded",
                &[
                    field("requests_per_second", self.config.requests_per_second()),
                    field("burst_size", self.config.burst_size()),
                ],
            );
            span.set_attribute("rate.allowed", "false".to_string());
            span.record_error(&"rate limit exceeded");
            span.end();
            return Err(RateLimitError::Exceeded);
        }

        span.set_attribute("rate.allowed", "true".to_string());
        let result = op().await.map_err(RateLimitError::Operation);
        span.set_attribute("rate.outcome", outcome(&result).to_string());
        span.end();
        result
    }

    /// Waits for a token, polling every `poll_interval`, then runs `op`.
    ///
    /// Returns [`RateLimitError::Interrupted`] without calling `op` if
    /// `cancel` ends first.
    pub async fn execute_with_wait<F, Fut, T, E>(
        &self,
        cancel: &Cancellation,
        op: F,
    ) -> Result<T, RateLimitError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut span = self.telemetry.span("rate.execute_with_wait");
        let started = Instant::now();

        if let Err(reason) = self.wait_for_token(cancel).await {
            self.telemetry.logger().info(
                "rate limit wait interrupted",
                &[
                    field("reason", reason),
                    field("waited_ms", started.elapsed().as_millis()),
                ],
            );
            span.record_error(&reason);
            span.end();
            return Err(RateLimitError::Interrupted(reason));
        }

        span.set_attribute("rate.waited_ms", started.elapsed().as_millis().to_string());
        let result = op().await.map_err(RateLimitError::Operation);
        span.set_attribute("rate.outcome", outcome(&result).to_string());
        span.end();
        result
    }

    async fn wait_for_token(&self, cancel: &Cancellation) -> Result<(), Interrupted> {
        loop {
            cancel.check()?;
            if self.allow() {
                return Ok(());
            }
            cancel.sleep(self.config.poll_interval()).await?;
        }
    }
}

fn outcome<T, E>(result: &Result<T, E>) -> &'static str {
    if result.is_ok() {
        "ok"
    } else {
        "error"
    }
}
