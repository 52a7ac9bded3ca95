//! Response models for the demo server API
//!
//! DTOs serialized into HTTP response bodies.

pub mod responses;

// Re-export commonly used types
pub use responses::{
    CacheHealth, ErrorResponse, HealthResponse, LookupResponse, RateLimiterHealth, StatsResponse,
};
