///! Token-bucket rate limiter for the notification sink
///!
///! The sink tolerates a documented sustained message rate; the bucket
///! refills at that rate and each dispatch spends one token, so bursts are
///! bounded by the bucket capacity and a drained bucket waits exactly as
///! long as the refill requires instead of a guessed constant delay.

use std::time::Duration;
use tokio::time::Instant;

pub struct RateLimiter {
    capacity: f64,
    tokens: f64,
    refill_per_second: f64,
    last_refill: Instant,
}

impl RateLimiter {
    /// Build a limiter for a sustained per-minute message rate.
    ///
    /// The bucket starts full, so the first burst after startup goes out
    /// immediately.
    pub fn per_minute(messages_per_minute: u32) -> Self {
        let rate = messages_per_minute.max(1) as f64;
        Self {
            capacity: rate,
            tokens: rate,
            refill_per_second: rate / 60.0,
            last_refill: Instant::now(),
        }
    }

    /// Take one token, sleeping until the bucket has refilled enough.
    ///
    /// Only the discovery-cycle job calls this; the rollup job dispatches
    /// its single daily message without pacing.
    pub async fn acquire(&mut self) {
        loop {
            self.refill();
            if self.tokens >= 1.0 {
                self.tokens -= 1.0;
                return;
            }

            let deficit = 1.0 - self.tokens;
            let wait = Duration::from_secs_f64(deficit / self.refill_per_second);
            tracing::debug!("Rate limit reached, waiting {:?} before next dispatch", wait);
            tokio::time::sleep(wait).await;
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_per_second).min(self.capacity);
        self.last_refill = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_full_bucket_does_not_wait() {
        let mut limiter = RateLimiter::per_minute(30);
        let start = Instant::now();

        limiter.acquire().await;
        limiter.acquire().await;

        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drained_bucket_waits_for_refill() {
        let mut limiter = RateLimiter::per_minute(1);
        let start = Instant::now();

        limiter.acquire().await; // takes the only token
        limiter.acquire().await; // must wait one refill period

        assert!(start.elapsed() >= Duration::from_secs(59));
    }

    #[tokio::test(start_paused = true)]
    async fn test_refill_caps_at_capacity() {
        let mut limiter = RateLimiter::per_minute(2);
        limiter.acquire().await;
        limiter.acquire().await;

        // A long idle stretch must not bank more than the capacity.
        tokio::time::advance(Duration::from_secs(3600)).await;
        let start = Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);

        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_secs(29));
    }
}
