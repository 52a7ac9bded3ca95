//! Rate Limiter Module
//!
//! Token-bucket admission control with lazy refill, offering immediate-reject
//! and wait-until-available execution.

mod bucket;
mod config;
mod error;
mod handle;
mod limiter;

pub use bucket::TokenBucket;
pub use config::{
    RateLimitConfig, DEFAULT_BURST_SIZE, DEFAULT_POLL_INTERVAL, DEFAULT_REQUESTS_PER_SECOND,
};
pub use error::RateLimitError;
pub use handle::RateLimiter;
pub use limiter::TokenBucketLimiter;
