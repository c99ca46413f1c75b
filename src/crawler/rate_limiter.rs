use std::time::Duration;
use tokio::time::Instant;

/// Enforces a minimum delay between consecutive page requests
///
/// The crawl has only one request in flight at a time, so a single
/// timestamp is all the state needed.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    delay: Duration,
    last_request_time: Option<Instant>,
}

impl RateLimiter {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_request_time: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Waits until at least `delay` has passed since the previous call
    /// returned
    ///
    /// The first call returns immediately.
    pub async fn wait(&mut self) {
        if let Some(last) = self.last_request_time {
            let elapsed = last.elapsed();
            if elapsed < self.delay {
                tokio::time::sleep(self.delay - elapsed).await;
            }
        }

        self.last_request_time = Some(Instant::now());
    }
}
