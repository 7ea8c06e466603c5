//! Token-bucket request pacing.
//!
//! Discovery hits each seed once, back to back. The bucket spaces those
//! requests out; `requests` tokens are refilled evenly over `interval`.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

pub const DEFAULT_PACE: Duration = Duration::from_millis(500);

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

#[derive(Debug)]
pub struct RateLimiter {
    capacity: f64,
    /// Tokens added per second. Zero means no limit.
    refill_per_sec: f64,
    bucket: Mutex<Bucket>,
}

impl RateLimiter {
    /// Allow `requests` per `interval`, with bursts of up to `requests`.
    pub fn new(requests: u32, interval: Duration) -> Self {
        let capacity = f64::from(requests.max(1));
        let refill_per_sec = if interval.is_zero() || requests == 0 {
            0.0
        } else {
            capacity / interval.as_secs_f64()
        };

        Self {
            capacity,
            refill_per_sec,
            bucket: Mutex::new(Bucket {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
        }
    }

    /// One request per `interval`.
    pub fn fixed_interval(interval: Duration) -> Self {
        Self::new(1, interval)
    }

    pub fn unlimited() -> Self {
        Self::new(0, Duration::ZERO)
    }

    pub fn is_unlimited(&self) -> bool {
        self.refill_per_sec == 0.0
    }

    /// Wait for a token and consume it.
    pub async fn acquire(&self) {
        if self.is_unlimited() {
            return;
        }

        loop {
            let wait = {
                let mut bucket = self.bucket.lock().await;
                let now = Instant::now();
                let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
                bucket.tokens = (bucket.tokens + elapsed * self.refill_per_sec).min(self.capacity);
                bucket.last_refill = now;

                if bucket.tokens >= 1.0 {
                    bucket.tokens -= 1.0;
                    return;
                }

                Duration::from_secs_f64((1.0 - bucket.tokens) / self.refill_per_sec)
            };

            debug!("Pacing: waiting {:?}", wait);
            tokio::time::sleep(wait).await;
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::fixed_interval(DEFAULT_PACE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_fixed_interval_spaces_requests() {
        let limiter = RateLimiter::fixed_interval(Duration::from_millis(500));
        let start = Instant::now();

        limiter.acquire().await;
        assert!(start.elapsed() < Duration::from_millis(10));

        limiter.acquire().await;
        limiter.acquire().await;
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(1000), "elapsed {:?}", elapsed);
        assert!(elapsed < Duration::from_millis(1100), "elapsed {:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_up_to_capacity() {
        let limiter = RateLimiter::new(3, Duration::from_secs(3));
        let start = Instant::now();

        for _ in 0..3 {
            limiter.acquire().await;
        }
        assert!(start.elapsed() < Duration::from_millis(10));

        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unlimited_never_waits() {
        let limiter = RateLimiter::unlimited();
        assert!(limiter.is_unlimited());
        let start = Instant::now();
        for _ in 0..100 {
            limiter.acquire().await;
        }
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_zero_interval_is_unlimited() {
        assert!(RateLimiter::fixed_interval(Duration::ZERO).is_unlimited());
        assert!(!RateLimiter::default().is_unlimited());
    }
}
