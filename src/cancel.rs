//! Cancellation Handle
//!
//! Combines an explicit cancel signal (`CancellationToken`) with an optional
//! deadline. Long waits in the rate limiter and retry executor race their
//! timers against this handle.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::Interrupted;

// == Cancellation ==
/// A cloneable cancellation handle with an optional deadline.
///
/// Clones share the same token: cancelling one cancels all of them.
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Cancellation {
    /// A handle that only ends when [`Cancellation::cancel`] is called.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing token, e.g. a child of a shutdown coordinator.
    pub fn from_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Attaches a deadline. An earlier existing deadline wins.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    /// Attaches a deadline `timeout` from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        let deadline = Instant::now()
            .checked_add(timeout)
            .unwrap_or_else(far_future);
        self.with_deadline(deadline)
    }

    /// A handle that ends when this one does, but can be cancelled alone.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    // == Check ==
    /// Returns why the handle has ended, if it has.
    ///
    /// Explicit cancellation takes precedence over an expired deadline.
    pub fn check(&self) -> Result<(), Interrupted> {
        if self.token.is_cancelled() {
            return Err(Interrupted::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(Interrupted::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    pub fn is_done(&self) -> bool {
        self.check().is_err()
    }

    // == Wait ==
    /// Resolves once the handle ends, yielding the reason.
    pub async fn interrupted(&self) -> Interrupted {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    biased;
                    _ = self.token.cancelled() => Interrupted::Cancelled,
                    _ = tokio::time::sleep_until(deadline) => Interrupted::DeadlineExceeded,
                }
            }
            None => {
                self.token.cancelled().await;
                Interrupted::Cancelled
            }
        }
    }

    /// Sleeps for `duration` unless the handle ends first.
    pub async fn sleep(&self, duration: Duration) -> Result<(), Interrupted> {
        self.check()?;
        tokio::select! {
            biased;
            reason = self.interrupted() => Err(reason),
            _ = tokio::time::sleep(duration) => Ok(()),
        }
    }
}

/// Roughly 30 years out, the same horizon tokio uses for "never".
fn far_future() -> Instant {
    Instant::now() + Duration::from_secs(86_400 * 365 * 30)
}
