//! Token Bucket
//!
//! Plain state machine with no locking and no clock of its own; callers pass
//! `now` in. Token counts are whole numbers and fractional refill is
//! truncated.

use std::time::Duration;

use tokio::time::Instant;

const NANOS_PER_SEC: u128 = 1_000_000_000;

// == Token Bucket ==
#[derive(Debug, Clone)]
pub struct TokenBucket {
    tokens: u64,
    capacity: u64,
    refill_per_second: u64,
    last_refill: Instant,
}

impl TokenBucket {
    /// A full bucket of `capacity` tokens refilling at `refill_per_second`.
    pub fn new(capacity: u32, refill_per_second: u32, now: Instant) -> Self {
        let capacity = u64::from(capacity.max(1));
        Self {
            tokens: capacity,
            capacity,
            refill_per_second: u64::from(refill_per_second.max(1)),
            last_refill: now,
        }
    }

    /// Adds `floor(elapsed * rate)` tokens, capped at capacity.
    ///
    /// The refill clock only moves when at least one whole token was added,
    /// so frequent callers still accrue tokens over time.
    pub fn refill(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill);
        let earned = tokens_for(elapsed, self.refill_per_second);
        if earned == 0 {
            return;
        }
        self.tokens = self.tokens.saturating_add(earned).min(self.capacity);
        self.last_refill = now;
    }

    /// Refills, then takes one token if any is available.
    pub fn try_acquire(&mut self, now: Instant) -> bool {
        self.refill(now);
        if self.tokens == 0 {
            return false;
        }
        self.tokens -= 1;
        true
    }

    /// Back to full capacity with the refill clock restarted at `now`.
    pub fn reset(&mut self, now: Instant) {
        self.tokens = self.capacity;
        self.last_refill = now;
    }

    pub fn available(&self) -> u64 {
        self.tokens
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }
}

fn tokens_for(elapsed: Duration, per_second: u64) -> u64 {
    let earned = elapsed.as_nanos().saturating_mul(u128::from(per_second)) / NANOS_PER_SEC;
    u64::try_from(earned).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_starts_full_and_drains_exactly_burst() {
        let now = Instant::now();
        let mut bucket = TokenBucket::new(5, 10, now);

        let results: Vec<bool> = (0..6).map(|_| bucket.try_acquire(now)).collect();

        assert_eq!(results, vec![true, true, true, true, true, false]);
        assert_eq!(bucket.available(), 0);
    }

    #[test]
    fn test_refill_after_one_period() {
        let start = Instant::now();
        let mut bucket = TokenBucket::new(2, 10, start);
        assert!(bucket.try_acquire(start));
        assert!(bucket.try_acquire(start));
        assert!(!bucket.try_acquire(start));

        let later = start + Duration::from_millis(100);
        assert!(bucket.try_acquire(later));
        assert!(!bucket.try_acquire(later));
    }

    #[test]
    fn test_fractional_tokens_are_truncated() {
        let start = Instant::now();
        let mut bucket = TokenBucket::new(10, 10, start);
        for _ in 0..10 {
            bucket.try_acquire(start);
        }

        // 150ms at 10/s is 1.5 tokens: one is granted, the half is dropped
        let t1 = start + Duration::from_millis(150);
        bucket.refill(t1);
        assert_eq!(bucket.available(), 1);

        // 50ms after that is not enough for another whole token
        bucket.refill(t1 + Duration::from_millis(50));
        assert_eq!(bucket.available(), 1);
    }

    #[test]
    fn test_frequent_polling_still_accrues() {
        let start = Instant::now();
        let mut bucket = TokenBucket::new(1, 10, start);
        assert!(bucket.try_acquire(start));

        // Polling every 10ms never earns a whole token per poll, but the
        // clock does not move until one is earned
        let mut granted = false;
        for step in 1..=10 {
            granted = bucket.try_acquire(start + Duration::from_millis(10 * step));
            if granted {
                assert_eq!(step, 10);
                break;
            }
        }
        assert!(granted);
    }

    #[test]
    fn test_refill_caps_at_capacity() {
        let start = Instant::now();
        let mut bucket = TokenBucket::new(3, 100, start);
        bucket.try_acquire(start);
        bucket.refill(start + Duration::from_secs(3600));
        assert_eq!(bucket.available(), 3);
    }

    #[test]
    fn test_reset_restores_full_burst() {
        let start = Instant::now();
        let mut bucket = TokenBucket::new(4, 1, start);
        for _ in 0..4 {
            bucket.try_acquire(start);
        }
        assert!(!bucket.try_acquire(start));

        bucket.reset(start);
        assert_eq!(bucket.available(), 4);
        assert!((0..4).all(|_| bucket.try_acquire(start)));
        assert!(!bucket.try_acquire(start));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        // 0 <= tokens <= capacity under any interleaving of waits and acquires.
        #[test]
        fn prop_tokens_stay_within_capacity(
            capacity in 1u32..50,
            rate in 1u32..1000,
            steps in prop::collection::vec((0u64..500, any::<bool>()), 1..100)
        ) {
            let start = Instant::now();
            let mut bucket = TokenBucket::new(capacity, rate, start);
            let mut now = start;

            for (advance_ms, acquire) in steps {
                now += Duration::from_millis(advance_ms);
                if acquire {
                    bucket.try_acquire(now);
                } else {
                    bucket.refill(now);
                }
                prop_assert!(bucket.available() <= u64::from(capacity));
            }
        }

        // With no time passing, exactly `capacity` acquisitions succeed.
        #[test]
        fn prop_burst_admits_exactly_capacity(capacity in 1u32..200, rate in 1u32..1000) {
            let now = Instant::now();
            let mut bucket = TokenBucket::new(capacity, rate, now);

            let admitted = (0..capacity + 5).filter(|_| bucket.try_acquire(now)).count();
            prop_assert_eq!(admitted, capacity as usize);
        }
    }
}
