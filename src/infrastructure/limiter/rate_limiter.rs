use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use dashmap::DashMap;
use parking_lot::Mutex;

/// A token bucket which allows fractional tokens for precise refill
#[derive(Debug)]
struct TokenBucket {
    capacity: f64,
    tokens: f64,
    refill_per_sec: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn new(capacity: f64, refill_per_sec: f64, now: Instant) -> Self {
        Self {
            capacity,
            tokens: capacity,
            refill_per_sec,
            last_refill: now,
        }
    }

    fn refill(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        if elapsed > 0.0 {
            self.tokens = (self.tokens + elapsed * self.refill_per_sec).min(self.capacity);
            self.last_refill = now;
        }
    }

    /// Takes one token, or returns the whole seconds until one is available.
    fn try_acquire(&mut self, now: Instant) -> Result<(), u64> {
        self.refill(now);
        // Small epsilon to avoid fp surprises
        if self.tokens + 1e-12 >= 1.0 {
            self.tokens -= 1.0;
            return Ok(());
        }
        let missing = 1.0 - self.tokens;
        Err(((missing / self.refill_per_sec).ceil() as u64).max(1))
    }

    fn is_idle(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.last_refill) >= ttl
    }
}

/// Per-client throttle for the sign-in and sign-up endpoints: a burst of
/// `attempts_per_minute`, refilled evenly over a minute.
#[derive(Clone)]
pub struct LoginLimiter {
    buckets: Arc<DashMap<String, Arc<Mutex<TokenBucket>>>>,
    capacity: f64,
    refill_per_sec: f64,
}

impl LoginLimiter {
    pub fn new(attempts_per_minute: u32) -> Self {
        let capacity = f64::from(attempts_per_minute.max(1));
        Self {
            buckets: Arc::new(DashMap::new()),
            capacity,
            refill_per_sec: capacity / 60.0,
        }
    }

    /// `Err(retry_after_secs)` when `key` has used up its attempts.
    pub fn check(&self, key: &str) -> Result<(), u64> {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> Result<(), u64> {
        let bucket = self
            .buckets
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(TokenBucket::new(self.capacity, self.refill_per_sec, now))))
            .clone();
        let mut bucket = bucket.lock();
        bucket.try_acquire(now)
    }

    /// Drops buckets untouched for longer than `ttl`. Returns how many went.
    pub fn evict_idle(&self, ttl: Duration) -> usize {
        let now = Instant::now();
        let before = self.buckets.len();
        self.buckets.retain(|_, bucket| !bucket.lock().is_idle(now, ttl));
        before.saturating_sub(self.buckets.len())
    }

    pub fn tracked_clients(&self) -> usize {
        self.buckets.len()
    }
}
