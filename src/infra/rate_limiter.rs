use crate::app::ports::RateLimiterPort;
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Requests-per-minute token bucket shared by every collector
#[derive(Debug)]
pub struct RateLimiter {
    requests_per_min: u64,
    // (available tokens, time of last refill)
    tokens: Mutex<(f64, Instant)>,
}

impl RateLimiter {
    pub fn per_minute(requests_per_min: u64) -> Self {
        Self {
            requests_per_min,
            tokens: Mutex::new((requests_per_min as f64, Instant::now())),
        }
    }

    /// A limiter that never waits
    pub fn unlimited() -> Self {
        Self::per_minute(0)
    }

    pub async fn acquire(&self) {
        if self.requests_per_min == 0 {
            return;
        }
        let capacity = self.requests_per_min as f64;
        let refill_rate = capacity / 60.0;
        loop {
            let mut guard = self.tokens.lock().await;
            let (ref mut tokens, ref mut last) = *guard;
            let now = Instant::now();
            let elapsed = now.duration_since(*last).as_secs_f64();
            *tokens = (*tokens + elapsed * refill_rate).min(capacity);
            *last = now;
            if *tokens >= 1.0 {
                *tokens -= 1.0;
                break;
            }
            let wait = (1.0 - *tokens) / refill_rate;
            drop(guard);
            tokio::time::sleep(Duration::from_secs_f64(wait.max(0.001))).await;
        }
    }
}

#[async_trait]
impl RateLimiterPort for RateLimiter {
    async fn acquire(&self) {
        RateLimiter::acquire(self).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unlimited_never_blocks() {
        let limiter = RateLimiter::unlimited();
        for _ in 0..1000 {
            limiter.acquire().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn waits_once_bucket_is_drained() {
        let limiter = RateLimiter::per_minute(2);
        let start = tokio::time::Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        assert!(start.elapsed() < Duration::from_millis(10));
        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_secs(29));
    }
}
