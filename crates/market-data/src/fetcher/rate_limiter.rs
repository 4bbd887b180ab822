//! Token bucket rate limiter shared by concurrent fetches.
//!
//! Each provider id owns one bucket. Buckets are created lazily from the
//! provider's [`RateLimit`], so every batch worker drawing on the same
//! provider competes for the same tokens.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::provider::RateLimit;

/// Burst allowance when a provider does not configure one.
const DEFAULT_BURST: f64 = 10.0;

#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    last_update: Instant,
    /// Tokens per second.
    rate: f64,
    capacity: f64,
}

impl TokenBucket {
    fn new(requests_per_minute: u32, capacity: f64) -> Self {
        Self {
            tokens: capacity,
            last_update: Instant::now(),
            rate: f64::from(requests_per_minute.max(1)) / 60.0,
            capacity,
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.rate).min(self.capacity);
        self.last_update = now;
    }

    fn try_acquire(&mut self) -> bool {
        self.refill();
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    fn time_until_available(&mut self) -> Duration {
        self.refill();
        if self.tokens >= 1.0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64((1.0 - self.tokens) / self.rate)
        }
    }
}

/// Per-provider token bucket rate limiter.
#[derive(Default)]
pub struct RateLimiter {
    buckets: Mutex<HashMap<String, TokenBucket>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the buckets, recovering from poison.
    ///
    /// A poisoned bucket map only means slightly wrong pacing.
    fn lock_buckets(&self) -> MutexGuard<'_, HashMap<String, TokenBucket>> {
        self.buckets.lock().unwrap_or_else(|poisoned| {
            warn!("Rate limiter buckets mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn bucket_for<'a>(
        buckets: &'a mut HashMap<String, TokenBucket>,
        provider: &str,
        limit: &RateLimit,
    ) -> &'a mut TokenBucket {
        buckets.entry(provider.to_string()).or_insert_with(|| {
            let burst = (limit.max_concurrency as f64).max(1.0).min(DEFAULT_BURST);
            TokenBucket::new(limit.requests_per_minute, burst)
        })
    }

    /// Wait until a token for `provider` is available, then take it.
    pub async fn acquire(&self, provider: &str, limit: &RateLimit) {
        loop {
            let wait_time = {
                let mut buckets = self.lock_buckets();
                let bucket = Self::bucket_for(&mut buckets, provider, limit);
                if bucket.try_acquire() {
                    return;
                }
                bucket.time_until_available()
            };

            let wait_time = wait_time.max(limit.min_delay);
            debug!(
                "Rate limiter: waiting {:?} for provider '{}'",
                wait_time, provider
            );
            tokio::time::sleep(wait_time).await;
        }
    }
}
