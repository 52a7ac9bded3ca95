//! Retry Errors

use thiserror::Error;

use crate::error::Interrupted;

/// How a retried operation ultimately failed.
#[derive(Error, Debug)]
pub enum RetryError<E> {
    /// The cancellation handle ended before an attempt or during a backoff
    /// wait.
    #[error(transparent)]
    Interrupted(#[from] Interrupted),

    /// Every attempt failed; `source` is the last failure.
    #[error("retry exhausted after {attempts}/{max_attempts} attempts: {source}")]
    Exhausted {
        attempts: u32,
        max_attempts: u32,
        source: E,
    },

    /// The predicate rejected the failure; carried unchanged.
    #[error(transparent)]
    Aborted(E),
}

impl<E> RetryError<E> {
    pub fn is_interrupted(&self) -> bool {
        matches!(self, RetryError::Interrupted(_))
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, RetryError::Exhausted { .. })
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, RetryError::Aborted(_))
    }

    /// The operation's own error, or `None` for an interruption.
    pub fn into_inner(self) -> Option<E> {
        match self {
            RetryError::Exhausted { source, .. } | RetryError::Aborted(source) => Some(source),
            RetryError::Interrupted(_) => None,
        }
    }

    /// Why the loop was interrupted, if it was.
    pub fn interrupted(&self) -> Option<Interrupted> {
        match self {
            RetryError::Interrupted(reason) => Some(*reason),
            _ => None,
        }
    }
}
