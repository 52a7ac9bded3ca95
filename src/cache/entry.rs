//! Cache Entry Module
//!
//! Defines a single stored value together with its expiration instant.

use std::time::Duration;

use tokio::time::Instant;

/// Horizon used when `now + ttl` would overflow the clock.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

// == Cache Entry ==
/// A stored value and the instant after which it is logically absent.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Insertion instant
    pub created_at: Instant,
    /// Expiration instant, always `created_at + ttl`
    pub expires_at: Instant,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an entry inserted now that lives for `ttl`.
    pub fn new(value: V, ttl: Duration) -> Self {
        Self::inserted_at(value, ttl, Instant::now())
    }

    /// Creates an entry as if inserted at `now`.
    pub fn inserted_at(value: V, ttl: Duration, now: Instant) -> Self {
        let expires_at = now
            .checked_add(ttl)
            .unwrap_or_else(|| now + FAR_FUTURE);

        Self {
            value,
            created_at: now,
            expires_at,
        }
    }

    // == Is Expired ==
    /// An entry is expired strictly after its expiration instant.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now > self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    // == Time To Live ==
    /// Remaining lifetime, zero once expired.
    pub fn ttl_remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}
