//! Minimum-interval pacing shared by all upload workers

use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

/// Spaces request starts at least `interval` apart across every caller.
///
/// Callers reserve a slot under a short lock and then wait for it outside the
/// lock, so a slow waker never pushes later slots closer together.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    last_permitted: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_permitted: Mutex::new(None),
        }
    }

    /// A limiter that never waits
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_enabled(&self) -> bool {
        !self.interval.is_zero()
    }

    /// Wait for the next free slot and return the instant it was granted at
    pub async fn acquire(&self) -> Instant {
        if !self.is_enabled() {
            return Instant::now();
        }

        let slot = self.reserve(Instant::now());
        tokio::time::sleep_until(slot).await;
        slot
    }

    /// Compute and record the next slot no earlier than `now`
    fn reserve(&self, now: Instant) -> Instant {
        let mut last = self
            .last_permitted
            .lock()
            .unwrap_or_else(|e| e.into_inner());

        let slot = match *last {
            Some(prev) => now.max(prev + self.interval),
            None => now,
        };
        *last = Some(slot);
        slot
    }
}
