use std::sync::Mutex;
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Per-email login brute force limiter over a fixed window.
pub struct LoginRateLimiter {
    /// lowercased email -> (failed_count, window_start)
    entries: DashMap<String, (u32, Instant)>,
    max_failures: u32,
    window: Duration,
    last_sweep: Mutex<Instant>,
}

impl LoginRateLimiter {
    pub fn new(max_failures: u32, window: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            max_failures,
            window,
            last_sweep: Mutex::new(Instant::now()),
        }
    }

    /// Whether another attempt is allowed. Err carries the seconds until the window resets.
    /// Does not count the attempt; call `record_failure()` on a bad password.
    pub fn check(&self, email: &str) -> Result<(), u64> {
        self.check_at(email, Instant::now())
    }

    pub fn record_failure(&self, email: &str) {
        self.record_failure_at(email, Instant::now());
    }

    /// A successful login forgives earlier failures.
    pub fn record_success(&self, email: &str) {
        self.entries.remove(&email.to_lowercase());
    }

    /// Drop every entry whose window has run out.
    fn cleanup_at(&self, now: Instant) {
        self.entries
            .retain(|_, (_, start)| now.duration_since(*start) <= self.window);
    }

    /// Sweeps at most once per window, from the failure path.
    fn sweep_if_due(&self, now: Instant) {
        let Ok(mut last) = self.last_sweep.try_lock() else {
            return;
        };
        if now.duration_since(*last) < self.window {
            return;
        }
        *last = now;
        drop(last);
        self.cleanup_at(now);
    }

    fn check_at(&self, email: &str, now: Instant) -> Result<(), u64> {
        let Some(entry) = self.entries.get(&email.to_lowercase()) else {
            return Ok(());
        };
        let (count, start) = *entry.value();
        drop(entry);

        let elapsed = now.duration_since(start);
        if elapsed > self.window {
            self.entries.remove(&email.to_lowercase());
            return Ok(());
        }

        if count >= self.max_failures {
            return Err(self.window.saturating_sub(elapsed).as_secs().max(1));
        }

        Ok(())
    }

    fn record_failure_at(&self, email: &str, now: Instant) {
        self.sweep_if_due(now);

        let mut entry = self.entries.entry(email.to_lowercase()).or_insert((0, now));
        let (count, start) = entry.value_mut();

        if now.duration_since(*start) > self.window {
            *count = 1;
            *start = now;
        } else {
            *count += 1;
        }
    }
}
