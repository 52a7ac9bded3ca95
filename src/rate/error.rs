//! Rate Limiter Errors

use thiserror::Error;

use crate::error::Interrupted;

/// Failure of a rate-limited execution.
///
/// `Exceeded` only comes from immediate mode, `Interrupted` only from wait
/// mode. The wrapped operation's own failure is passed through as
/// `Operation`.
#[derive(Error, Debug)]
pub enum RateLimitError<E> {
    #[error("rate limit exceeded")]
    Exceeded,

    #[error(transparent)]
    Interrupted(#[from] Interrupted),

    #[error(transparent)]
    Operation(E),
}

impl<E> RateLimitError<E> {
    pub fn is_exceeded(&self) -> bool {
        matches!(self, RateLimitError::Exceeded)
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(self, RateLimitError::Interrupted(_))
    }

    /// The operation's own error, if that is what this is.
    pub fn into_operation(self) -> Option<E> {
        match self {
            RateLimitError::Operation(err) => Some(err),
            _ => None,
        }
    }
}
