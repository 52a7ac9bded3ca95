//! Cache Module
//!
//! Generic in-memory cache with per-entry TTL, bounded size with a
//! configurable eviction policy, and a background expiration sweep.

mod config;
mod entry;
mod eviction;
mod expiring;
mod handle;
mod stats;
mod store;
mod sweep;


// Re-export public types
pub use config::{CacheConfig, DEFAULT_MAX_SIZE, DEFAULT_SWEEP_INTERVAL, DEFAULT_TTL};
pub use entry::CacheEntry;
pub use eviction::{EvictionIndex, EvictionPolicy};
pub use expiring::ExpiringCache;
pub use handle::Cache;
pub use stats::CacheStats;
pub use store::CacheStore;
