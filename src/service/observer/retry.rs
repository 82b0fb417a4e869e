//! Retry policy shared by every outbound game API call.

use rand::Rng;
use std::{future::Future, time::Duration};

use crate::error::observer::ObserverError;

/// Exponent cap for the doubling backoff, the delay stops growing after 16x.
const MAX_DOUBLINGS: u32 = 4;

/// Bounded exponential backoff that honours provider `Retry-After` hints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total tries including the first one, at least 1.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Add up to a quarter of the delay at random.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// A policy that tries once and never waits.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            jitter: false,
        }
    }

    /// Delay before retry number `attempt` (0-based), ignoring provider hints.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.min(MAX_DOUBLINGS);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Delay before retrying after `err`.
    ///
    /// A rate limit carrying `retry_after` waits exactly that long, even past
    /// `max_delay`; the provider will refuse anything sooner.
    pub fn delay_for(&self, attempt: u32, err: &ObserverError) -> Duration {
        if let ObserverError::RateLimited {
            retry_after: Some(retry_after),
        } = err
        {
            return *retry_after;
        }

        let delay = self.backoff(attempt);
        if !self.jitter || delay.is_zero() {
            return delay;
        }

        let spread = delay.as_millis() as u64 / 4;
        delay + Duration::from_millis(rand::rng().random_range(0..=spread))
    }

    /// Runs `op` until it succeeds, fails with a non-retryable error, or the attempt
    /// budget is spent.
    ///
    /// # Arguments
    /// - `label` - Short operation name for logs
    /// - `op` - Produces a fresh future for every attempt
    ///
    /// # Returns
    /// - `Ok(T)` - The first successful result
    /// - `Err(ObserverError)` - The last error seen
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T, ObserverError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ObserverError>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt + 1 < self.max_attempts => {
                    let delay = self.delay_for(attempt, &err);
                    tracing::warn!(
                        "{} failed on attempt {}/{}: {}, retrying in {:?}",
                        label,
                        attempt + 1,
                        self.max_attempts,
                        err,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
