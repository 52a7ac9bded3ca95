//! Retry Executor
//!
//! Runs a fallible async operation up to `max_retries + 1` times with
//! exponential backoff and jitter, honouring a [`Cancellation`] handle.

use std::error::Error;
use std::fmt::Display;
use std::future::Future;

use crate::cancel::Cancellation;
use crate::retry::{classify, Backoff, RetryConfig, RetryError};
use crate::telemetry::{field, Telemetry};

// == Retrier ==
#[derive(Debug, Clone)]
pub struct Retrier {
    config: RetryConfig,
    telemetry: Telemetry,
}

impl Retrier {
    pub fn new(config: RetryConfig, telemetry: Telemetry) -> Self {
        Self {
            config: config.coerced(),
            telemetry,
        }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Retries every failure.
    pub async fn run<F, Fut, T, E>(&self, cancel: &Cancellation, op: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        self.run_if(cancel, op, |_: &E| true).await
    }

    /// Retries failures the default classifier considers transient.
    pub async fn run_classified<F, Fut, T, E>(
        &self,
        cancel: &Cancellation,
        op: F,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Error + 'static,
    {
        self.run_if(cancel, op, |err: &E| classify::is_retryable(err))
            .await
    }

    // == Run If ==
    /// Retries failures for which `should_retry` returns true.
    ///
    /// - Cancellation is checked before each attempt and raced against each
    ///   backoff wait; either way the result is [`RetryError::Interrupted`].
    /// - A failure on the last attempt is [`RetryError::Exhausted`], whatever
    ///   the predicate says.
    /// - A rejected failure is returned as [`RetryError::Aborted`] with the
    ///   original error untouched. It displays exactly like that error; use
    ///   [`RetryError::into_inner`] or match on `Aborted(err)` to take it back.
    pub async fn run_if<F, Fut, T, E, P>(
        &self,
        cancel: &Cancellation,
        mut op: F,
        should_retry: P,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
        P: Fn(&E) -> bool,
    {
        let mut span = self.telemetry.span("retry.execute");
        span.set_attribute("retry.max_attempts", self.config.max_attempts().to_string());

        let logger = self.telemetry.logger();
        let max_retries = self.config.max_retries();
        let mut backoff = Backoff::new(&self.config);
        let mut attempt: u32 = 0;
        let mut invocations: u32 = 0;

        let result = loop {
            if let Err(reason) = cancel.check() {
                logger.info(
                    "retry cancelled before attempt",
                    &[field("attempt", attempt + 1), field("reason", reason)],
                );
                break Err(RetryError::Interrupted(reason));
            }

            invocations += 1;
            let err = match op().await {
                Ok(value) => {
                    if attempt > 0 {
                        logger.debug("retry succeeded", &[field("attempt", attempt + 1)]);
                    }
                    break Ok(value);
                }
                Err(err) => err,
            };

            if attempt == max_retries {
                logger.error(
                    "retry exhausted",
                    &[
                        field("attempts", attempt + 1),
                        field("max_attempts", self.config.max_attempts()),
                        field("error", &err),
                    ],
                );
                break Err(RetryError::Exhausted {
                    attempts: attempt + 1,
                    max_attempts: self.config.max_attempts(),
                    source: err,
                });
            }

            if !should_retry(&err) {
                logger.debug(
                    "retry aborted on non-retryable error",
                    &[field("attempt", attempt + 1), field("error", &err)],
                );
                break Err(RetryError::Aborted(err));
            }

            let delay = backoff.jittered();
            logger.warn(
                "attempt failed, retrying",
                &[
                    field("attempt", attempt + 1),
                    field("max_attempts", self.config.max_attempts()),
                    field("delay_ms", delay.as_millis()),
                    field("error", &err),
                ],
            );

            if let Err(reason) = cancel.sleep(delay).await {
                logger.info(
                    "retry cancelled during backoff",
                    &[field("attempt", attempt + 1), field("reason", reason)],
                );
                break Err(RetryError::Interrupted(reason));
            }

            backoff.grow();
            attempt += 1;
        };

        span.set_attribute("retry.attempts", invocations.to_string());
        if let Err(err) = &result {
            span.record_error(err);
        }
        span.end();
        result
    }
}
