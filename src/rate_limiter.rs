//! Request pacing with adaptive backoff for the Web API client.
//!
//! Enforces a minimum interval between requests.  A rate-limit response
//! doubles the interval (up to a maximum, or to the server's `Retry-After`
//! when that is longer); a run of successes halves it back towards the base.

use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

pub struct RateLimiter {
    name: String,
    last_request: Option<Instant>,
    current_interval: Duration,
    base_interval: Duration,
    max_interval: Duration,
    success_count: u32,
    successes_to_reduce: u32,
}

impl RateLimiter {
    /// * `name`: label for log messages
    /// * `base_interval`: minimum time between requests
    /// * `max_interval`: upper bound after repeated failures
    /// * `successes_to_reduce`: consecutive successes before halving the
    ///   interval (0 disables the reduction)
    pub fn new(name: &str, base_interval: Duration, max_interval: Duration, successes_to_reduce: u32) -> Self {
        RateLimiter {
            name: name.to_string(),
            last_request: None,
            current_interval: base_interval,
            base_interval,
            max_interval,
            success_count: 0,
            successes_to_reduce,
        }
    }

    /// Base interval in milliseconds; max = 64× base (at least 30 s), reduce after 10 successes.
    pub fn from_millis(name: &str, millis: u64) -> Self {
        let base = Duration::from_millis(millis);
        let max = (base * 64).max(Duration::from_secs(30));
        Self::new(name, base, max, 10)
    }

    pub fn current_interval(&self) -> Duration {
        self.current_interval
    }

    /// Sleep until the interval since the previous request has elapsed.
    /// Call before every request.
    pub fn wait_if_needed(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.current_interval {
                let wait_time = self.current_interval - elapsed;
                debug!("[{}] Rate limiting: waiting {:.2}s", self.name, wait_time.as_secs_f64());
                thread::sleep(wait_time);
            }
        }
        self.last_request = Some(Instant::now());
    }

    pub fn report_success(&mut self) {
        if self.successes_to_reduce == 0 {
            return;
        }

        self.success_count += 1;

        if self.success_count >= self.successes_to_reduce && self.current_interval > self.base_interval {
            self.current_interval = (self.current_interval / 2).max(self.base_interval);
            info!(
                "[{}] Request interval reduced to {:.2}s after {} successes",
                self.name,
                self.current_interval.as_secs_f64(),
                self.success_count
            );
            self.success_count = 0;
        }
    }

    /// Report a rate-limited request.  `retry_after` is the server's hint, if any.
    pub fn report_rate_limited(&mut self, retry_after: Option<Duration>) {
        let doubled = (self.current_interval * 2).min(self.max_interval);
        self.current_interval = match retry_after {
            Some(hint) if hint > doubled => hint,
            _ => doubled,
        };
        warn!(
            "[{}] Rate limited, request interval raised to {:.2}s",
            self.name,
            self.current_interval.as_secs_f64()
        );
        self.success_count = 0;
    }
}
