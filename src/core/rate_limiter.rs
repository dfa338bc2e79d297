use crate::domain::model::RateLimit;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Sliding-log limiter: at most `max_calls` admissions in any window of `interval`.
///
/// Waiting callers sleep until the oldest admission leaves the window, so
/// nothing spins. The limiter never fails, it only delays.
#[derive(Debug)]
pub struct RateLimiter {
    max_calls: usize,
    interval: Duration,
    admitted: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(limit: RateLimit) -> Self {
        let max_calls = limit.max_calls.max(1);
        Self {
            max_calls,
            interval: limit.interval,
            admitted: Mutex::new(VecDeque::with_capacity(max_calls)),
        }
    }

    pub async fn admit(&self) {
        loop {
            let wait = {
                let mut admitted = self.admitted.lock().await;
                let now = Instant::now();

                while let Some(&oldest) = admitted.front() {
                    if now.duration_since(oldest) >= self.interval {
                        admitted.pop_front();
                    } else {
                        break;
                    }
                }

                if admitted.len() < self.max_calls {
                    admitted.push_back(now);
                    return;
                }

                match admitted.front() {
                    Some(&oldest) => self.interval.saturating_sub(now.duration_since(oldest)),
                    None => Duration::ZERO,
                }
            };

            tracing::trace!("Rate limit reached, waiting {:?}", wait);
            tokio::time::sleep(wait).await;
        }
    }
}
