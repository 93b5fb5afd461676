//! Per-caller admission limiting.
//!
//! One token bucket per caller identifier (the raw `Authorization` header
//! value, empty for anonymous callers). A single mutex covers lookup-or-create
//! and the refill/debit step so that concurrent requests from the same caller
//! never race on a bucket.
//!
//! Buckets idle for longer than the configured TTL are dropped by a periodic
//! sweep. The TTL is validated to exceed the full-refill time, so a recreated
//! bucket starts in the same state the old one would have reached.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::config::RateLimitConfig;
use crate::observability::metrics;

/// A simple token bucket rate limiter.
#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    last_update: Instant,
}

impl TokenBucket {
    fn new(capacity: f64, now: Instant) -> Self {
        Self {
            tokens: capacity,
            last_update: now,
        }
    }

    fn try_acquire(&mut self, capacity: f64, refill_rate: f64, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.last_update).as_secs_f64();

        // Refill tokens
        self.tokens = (self.tokens + elapsed * refill_rate).min(capacity);
        if now > self.last_update {
            self.last_update = now;
        }

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Token-bucket limiter keyed by caller identifier.
#[derive(Debug)]
pub struct AdmissionLimiter {
    buckets: Mutex<HashMap<String, TokenBucket>>,
    refill_rate: f64,
    capacity: f64,
    idle_ttl: Duration,
}

impl AdmissionLimiter {
    pub fn new(requests_per_second: u32, burst_size: u32, idle_ttl: Duration) -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            refill_rate: f64::from(requests_per_second),
            capacity: f64::from(burst_size),
            idle_ttl,
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(
            config.requests_per_second,
            config.burst_size,
            Duration::from_secs(config.idle_ttl_secs),
        )
    }

    /// Admit one request for `caller` if its bucket has a token.
    ///
    /// Never blocks or queues. A denied call only refills; it does not debit.
    pub fn allow(&self, caller: &str) -> bool {
        self.allow_at(caller, Instant::now())
    }

    pub fn allow_at(&self, caller: &str, now: Instant) -> bool {
        let mut buckets = self.buckets.lock().expect("rate limiter mutex poisoned");
        if let Some(bucket) = buckets.get_mut(caller) {
            return bucket.try_acquire(self.capacity, self.refill_rate, now);
        }

        let mut bucket = TokenBucket::new(self.capacity, now);
        let allowed = bucket.try_acquire(self.capacity, self.refill_rate, now);
        buckets.insert(caller.to_string(), bucket);
        metrics::record_limiter_buckets(buckets.len());
        allowed
    }

    /// Drop buckets untouched for at least the idle TTL. Returns how many
    /// were evicted.
    pub fn sweep_idle(&self, now: Instant) -> usize {
        let mut buckets = self.buckets.lock().expect("rate limiter mutex poisoned");
        let before = buckets.len();
        buckets.retain(|_, bucket| now.saturating_duration_since(bucket.last_update) < self.idle_ttl);
        metrics::record_limiter_buckets(buckets.len());
        before - buckets.len()
    }

    /// Number of tracked callers.
    pub fn len(&self) -> usize {
        self.buckets.lock().expect("rate limiter mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run [`sweep_idle`](Self::sweep_idle) every `interval` until shutdown.
    pub fn spawn_sweeper(
        self: Arc<Self>,
        interval: Duration,
        mut shutdown: broadcast::Receiver<()>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let evicted = self.sweep_idle(Instant::now());
                        if evicted > 0 {
                            tracing::debug!(evicted, remaining = self.len(), "Swept idle rate limit buckets");
                        }
                    }
                    _ = shutdown.recv() => break,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter() -> AdmissionLimiter {
        AdmissionLimiter::new(2, 10, Duration::from_secs(600))
    }

    #[test]
    fn test_burst_then_deny() {
        let limiter = limiter();
        let now = Instant::now();

        let allowed = (0..11).filter(|_| limiter.allow_at("caller", now)).count();
        assert_eq!(allowed, 10);
        assert!(!limiter.allow_at("caller", now));
    }

    #[test]
    fn test_refill_after_wait() {
        let limiter = limiter();
        let now = Instant::now();
        for _ in 0..10 {
            assert!(limiter.allow_at("caller", now));
        }
        assert!(!limiter.allow_at("caller", now));

        // 2 rps: one token after 500ms.
        let later = now + Duration::from_millis(500);
        assert!(limiter.allow_at("caller", later));
        assert!(!limiter.allow_at("caller", later));
    }

    #[test]
    fn test_refill_is_capped_at_burst() {
        let limiter = limiter();
        let now = Instant::now();
        assert!(limiter.allow_at("caller", now));

        let much_later = now + Duration::from_secs(3_600);
        let allowed = (0..20).filter(|_| limiter.allow_at("caller", much_later)).count();
        assert_eq!(allowed, 10);
    }

    #[test]
    fn test_denied_request_does_not_debit() {
        let limiter = limiter();
        let now = Instant::now();
        for _ in 0..10 {
            limiter.allow_at("caller", now);
        }
        // Hammering while empty must not push the bucket into debt.
        for _ in 0..50 {
            assert!(!limiter.allow_at("caller", now));
        }
        assert!(limiter.allow_at("caller", now + Duration::from_millis(500)));
    }

    #[test]
    fn test_callers_are_isolated() {
        let limiter = limiter();
        let now = Instant::now();
        for _ in 0..10 {
            limiter.allow_at("Bearer a", now);
        }
        assert!(!limiter.allow_at("Bearer a", now));
        assert!(limiter.allow_at("Bearer b", now));
        assert!(limiter.allow_at("", now));
        assert_eq!(limiter.len(), 3);
    }

    #[test]
    fn test_bucket_is_reused_not_recreated() {
        let limiter = limiter();
        let now = Instant::now();
        for _ in 0..10 {
            limiter.allow_at("", now);
        }
        assert!(!limiter.allow_at("", now));
        assert_eq!(limiter.len(), 1);
    }

    #[test]
    fn test_sweep_evicts_only_idle_buckets() {
        let limiter = AdmissionLimiter::new(2, 10, Duration::from_secs(60));
        let now = Instant::now();
        limiter.allow_at("stale", now);
        limiter.allow_at("fresh", now + Duration::from_secs(50));

        assert_eq!(limiter.sweep_idle(now + Duration::from_secs(61)), 1);
        assert_eq!(limiter.len(), 1);
        assert_eq!(limiter.sweep_idle(now + Duration::from_secs(61)), 0);
    }

    #[test]
    fn test_concurrent_callers_share_one_budget() {
        let limiter = Arc::new(AdmissionLimiter::new(1, 10, Duration::from_secs(600)));
        let now = Instant::now();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = limiter.clone();
                std::thread::spawn(move || (0..5).filter(|_| limiter.allow_at("shared", now)).count())
            })
            .collect();

        let allowed: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(allowed, 10);
    }

    #[tokio::test]
    async fn test_sweeper_stops_on_shutdown() {
        let limiter = Arc::new(limiter());
        let (tx, rx) = broadcast::channel(1);
        let handle = limiter.spawn_sweeper(Duration::from_millis(10), rx);

        tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweeper did not stop")
            .unwrap();
    }
}
