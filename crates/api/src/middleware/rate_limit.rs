//! Per-session submission throttling.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Token bucket rate limiter keyed by guest session.
///
/// Server-side backstop for the double-submit guard in the flows: a guest
/// hammering "submit" gets `RATE_001` instead of a pile of duplicates.
pub struct RateLimiter {
    buckets: Mutex<HashMap<String, TokenBucket>>,
    config: RateLimitConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Sustained submissions per second
    #[serde(default = "default_rate")]
    pub rate: f64,
    /// Burst size
    #[serde(default = "default_burst")]
    pub burst: u32,
}

fn default_rate() -> f64 {
    0.5
}

fn default_burst() -> u32 {
    5
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            rate: default_rate(),
            burst: default_burst(),
        }
    }
}

impl RateLimitConfig {
    /// Seconds until one token is available again.
    pub fn retry_after_secs(&self) -> u64 {
        if self.rate <= 0.0 {
            return 60;
        }
        (1.0 / self.rate).ceil().max(1.0) as u64
    }
}

struct TokenBucket {
    tokens: f64,
    last_update: Instant,
}

impl TokenBucket {
    fn new(burst: u32) -> Self {
        Self {
            tokens: burst as f64,
            last_update: Instant::now(),
        }
    }

    fn try_acquire(&mut self, rate: f64, burst: u32) -> bool {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();
        self.last_update = now;

        // Replenish tokens
        self.tokens = (self.tokens + elapsed * rate).min(burst as f64);

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            config,
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Check if request is allowed for the given key.
    pub fn check(&self, key: &str) -> bool {
        let mut buckets = self.buckets.lock();

        let bucket = buckets
            .entry(key.to_string())
            .or_insert_with(|| TokenBucket::new(self.config.burst));

        bucket.try_acquire(self.config.rate, self.config.burst)
    }

    /// Drops buckets idle for longer than `max_age`. Returns how many.
    pub fn cleanup(&self, max_age: Duration) -> usize {
        let mut buckets = self.buckets.lock();
        let now = Instant::now();
        let before = buckets.len();

        buckets.retain(|_, bucket| now.duration_since(bucket.last_update) < max_age);
        before - buckets.len()
    }

    pub fn tracked_keys(&self) -> usize {
        self.buckets.lock().len()
    }
}

/// Shared rate limiter state.
pub type SharedRateLimiter = Arc<RateLimiter>;
