use crate::error::ExtractError;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{info, warn};

/// One failed attempt against the completion service. The policy keys its
/// backoff schedule off the variant; everything here is retryable.
#[derive(Debug, Error)]
pub enum CallError {
    #[error("rate limited")]
    RateLimited,

    #[error("completion service returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("completion response contained no choices")]
    NoChoices,
}

/// Retry discipline for the completion call: a fixed attempt ceiling with
/// exponential backoff, on a longer base when the service is shedding load.
///
/// A rate-limit signal waits out its delay even on the final attempt, so a
/// persistently throttled call takes the full 2+4+8s schedule before failing.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: usize,
    rate_limit_base: Duration,
    error_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            rate_limit_base: Duration::from_secs(2),
            error_base: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, rate_limit_base: Duration, error_base: Duration) -> Self {
        Self {
            max_attempts,
            rate_limit_base,
            error_base,
        }
    }

    fn rate_limit_delay(&self, attempt: usize) -> Duration {
        self.rate_limit_base * 2u32.pow(attempt as u32)
    }

    fn error_delay(&self, attempt: usize) -> Duration {
        self.error_base * 2u32.pow(attempt as u32)
    }

    /// Drive `attempt_fn` until it succeeds or the attempt ceiling is hit.
    /// The whole call either yields one complete response or a
    /// `Transport` error carrying the last failure.
    pub async fn run<T, F, Fut>(
        &self,
        operation: &'static str,
        mut attempt_fn: F,
    ) -> Result<T, ExtractError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CallError>>,
    {
        let mut last_error = String::new();
        for attempt in 0..self.max_attempts {
            match attempt_fn().await {
                Ok(value) => {
                    if attempt > 0 {
                        info!(
                            operation,
                            attempts = attempt + 1,
                            "operation succeeded after retries"
                        );
                    }
                    return Ok(value);
                }
                Err(CallError::RateLimited) => {
                    let delay = self.rate_limit_delay(attempt);
                    warn!(
                        operation,
                        attempt = attempt + 1,
                        delay_secs = delay.as_secs(),
                        "rate limit hit, backing off"
                    );
                    last_error = CallError::RateLimited.to_string();
                    sleep(delay).await;
                }
                Err(err) => {
                    last_error = err.to_string();
                    if attempt + 1 < self.max_attempts {
                        let delay = self.error_delay(attempt);
                        warn!(
                            operation,
                            attempt = attempt + 1,
                            delay_secs = delay.as_secs(),
                            error = %last_error,
                            "attempt failed, retrying"
                        );
                        sleep(delay).await;
                    }
                }
            }
        }

        Err(ExtractError::Transport {
            attempts: self.max_attempts,
            reason: last_error,
        })
    }
}
