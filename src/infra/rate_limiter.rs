use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Token bucket pacing outgoing API requests.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    requests_per_second: u32,
    // (available tokens, time of last refill)
    bucket: Mutex<(f64, Instant)>,
}

impl RateLimiter {
    /// A limit of 0 disables pacing.
    pub fn new(requests_per_second: u32) -> Self {
        Self {
            inner: Arc::new(Inner {
                requests_per_second,
                bucket: Mutex::new((requests_per_second as f64, Instant::now())),
            }),
        }
    }

    pub fn unlimited() -> Self {
        Self::new(0)
    }

    /// Wait until one request may be sent.
    pub async fn acquire(&self) {
        let capacity = self.inner.requests_per_second as f64;
        if capacity <= 0.0 {
            return;
        }
        loop {
            let mut guard = self.inner.bucket.lock().await;
            let (ref mut tokens, ref mut last) = *guard;
            let now = Instant::now();
            let elapsed = now.duration_since(*last).as_secs_f64();
            *tokens = (*tokens + elapsed * capacity).min(capacity);
            *last = now;
            if *tokens >= 1.0 {
                *tokens -= 1.0;
                return;
            }
            let wait = (1.0 - *tokens) / capacity;
            drop(guard);
            tokio::time::sleep(Duration::from_secs_f64(wait.max(0.001))).await;
        }
    }
}
