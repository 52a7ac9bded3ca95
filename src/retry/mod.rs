//! Retry Module
//!
//! Exponential backoff with jitter, a pluggable retryability predicate and
//! cancellation-aware waits.

mod backoff;
pub mod classify;
mod config;
mod error;
mod executor;

pub use backoff::{apply_jitter, jitter_multiplier, Backoff};
pub use classify::is_retryable;
pub use config::{
    RetryConfig, DEFAULT_BACKOFF_FACTOR, DEFAULT_INITIAL_BACKOFF, DEFAULT_JITTER_FACTOR,
    DEFAULT_MAX_BACKOFF, DEFAULT_MAX_RETRIES,
};
pub use error::RetryError;
pub use executor::Retrier;
