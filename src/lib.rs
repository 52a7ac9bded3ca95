//! infrakit - In-process infrastructure primitives
//!
//! A generic expiring cache with bounded size and background sweep, a
//! token-bucket rate limiter, and a retry executor with exponential backoff
//! and jitter. Each component takes its settings from a coercing config
//! builder, reports through injected [`telemetry`] seams, and has a
//! disabled variant whose operations are no-ops.

pub mod api;
pub mod cache;
pub mod cancel;
pub mod config;
pub mod error;
pub mod models;
pub mod rate;
pub mod retry;
pub mod telemetry;

pub use api::AppState;
pub use cache::{Cache, CacheConfig, EvictionPolicy, ExpiringCache};
pub use cancel::Cancellation;
pub use config::Settings;
pub use error::{ApiError, ConfigError, Interrupted};
pub use rate::{RateLimitConfig, RateLimitError, RateLimiter, TokenBucketLimiter};
pub use retry::{Retrier, RetryConfig, RetryError};
pub use telemetry::Telemetry;
