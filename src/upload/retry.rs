//! Bounded retry with backoff for rate-limited attempts

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use super::rate_limiter::RateLimiter;
use crate::config::{secs_to_duration, Config};
use crate::error::{classify_failure, FailureClass, UploadError};

/// Upper bound on a single backoff sleep
const MAX_BACKOFF: Duration = Duration::from_secs(3600);

/// What to do after one attempt
#[derive(Debug)]
pub enum RetryOutcome<T> {
    Success(T),
    Failure(UploadError),
    RateLimitedRetry { delay: Duration, reason: String },
}

/// Final result of a retried operation
#[derive(Debug)]
pub struct Attempted<T> {
    pub result: Result<T, UploadError>,
    pub attempts: u32,
}

/// Retry settings.
///
/// The delay before attempt `n + 1` is `backoff_floor + backoff_multiplier^n`
/// seconds. The floor is normally the rate-limit interval.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_floor: Duration,
    pub backoff_multiplier: f64,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff_floor: Duration, backoff_multiplier: f64) -> Self {
        Self {
            max_retries: max_retries.max(1),
            backoff_floor,
            backoff_multiplier,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.max_retries,
            secs_to_duration(config.rate_limit_interval_secs),
            config.backoff_multiplier,
        )
    }

    /// Delay after failed attempt number `attempt` (1-based)
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let exponential = self.backoff_multiplier.powi(exponent);
        let delay = Duration::try_from_secs_f64(exponential)
            .map(|d| self.backoff_floor.saturating_add(d))
            .unwrap_or(MAX_BACKOFF);
        delay.min(MAX_BACKOFF)
    }

    /// Decide the next step after attempt number `attempt` (1-based)
    pub fn evaluate<T>(&self, attempt: u32, result: Result<T, UploadError>) -> RetryOutcome<T> {
        match result {
            Ok(value) => RetryOutcome::Success(value),
            Err(e) => match classify_failure(&e) {
                FailureClass::RateLimited if attempt < self.max_retries => {
                    RetryOutcome::RateLimitedRetry {
                        delay: self.backoff_delay(attempt),
                        reason: e.to_string(),
                    }
                }
                _ => RetryOutcome::Failure(e),
            },
        }
    }

    /// Run `operation` until it succeeds, fails permanently or runs out of
    /// attempts. The limiter is acquired before every attempt.
    pub async fn run<T, F, Fut>(
        &self,
        limiter: &RateLimiter,
        label: &str,
        mut operation: F,
    ) -> Attempted<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, UploadError>>,
    {
        let mut attempt = 1;
        loop {
            limiter.acquire().await;

            match self.evaluate(attempt, operation(attempt).await) {
                RetryOutcome::Success(value) => {
                    return Attempted {
                        result: Ok(value),
                        attempts: attempt,
                    };
                }
                RetryOutcome::Failure(e) => {
                    return Attempted {
                        result: Err(e),
                        attempts: attempt,
                    };
                }
                RetryOutcome::RateLimitedRetry { delay, reason } => {
                    warn!(
                        "Rate limited on {}; retrying in {:.1}s (attempt {}/{}): {}",
                        label,
                        delay.as_secs_f64(),
                        attempt,
                        self.max_retries,
                        reason
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
