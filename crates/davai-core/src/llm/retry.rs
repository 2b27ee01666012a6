//! Retry with exponential backoff around a single provider call.

use super::LlmError;
use std::time::Duration;

/// Retry behaviour for transient LLM failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt (0 = no retries).
    pub max_retries: u32,

    /// Delay before the first retry.
    pub initial_delay: Duration,

    /// Upper bound for any single delay.
    pub max_delay: Duration,

    /// Multiplier applied per retry.
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Policy with the given retry count and default delays.
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    /// Fail on the first error.
    pub fn no_retry() -> Self {
        Self::with_max_retries(0)
    }

    /// Delay before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32, error: &LlmError) -> Duration {
        if let LlmError::RateLimited {
            retry_after: Some(seconds),
        } = error
        {
            return Duration::from_secs(*seconds).min(self.max_delay);
        }

        let base = self.initial_delay.as_millis() as f64
            * self.backoff_multiplier.powi(retry.saturating_sub(1) as i32);
        Duration::from_millis(base.min(self.max_delay.as_millis() as f64) as u64)
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or retries run out.
    ///
    /// `op` receives the 1-based attempt number.
    pub fn run<T>(
        &self,
        mut op: impl FnMut(u32) -> Result<T, LlmError>,
    ) -> Result<T, LlmError> {
        let mut attempt = 1;
        loop {
            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt <= self.max_retries => {
                    let delay = self.delay_for(attempt, &err);
                    tracing::warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "LLM call failed, retrying"
                    );
                    std::thread::sleep(delay);
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
