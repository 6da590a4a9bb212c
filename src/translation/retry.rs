/*!
 * Bounded retry with a fixed delay for provider calls.
 *
 * A text whose translation keeps failing is not an error for the run: the
 * caller supplies a fallback value (the original text) which is returned
 * once the attempts are exhausted.
 */

use log::{debug, warn};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use crate::app_config::TranslationCommonConfig;
use crate::errors::ProviderError;

/// Retry configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first one); 0 acts as 1
    pub max_attempts: u32,
    /// Delay before each retry
    pub delay: Duration,
}

/// Result of [`RetryPolicy::run`]
#[derive(Debug, Clone, PartialEq)]
pub struct RetryOutcome<T> {
    /// Operation result, or the fallback
    pub value: T,
    /// Attempts actually made
    pub attempts: u32,
    /// Last error when the fallback was used
    pub error: Option<ProviderError>,
}

impl<T> RetryOutcome<T> {
    /// Whether the fallback value was returned
    pub fn fell_back(&self) -> bool {
        self.error.is_some()
    }
}

impl RetryPolicy {
    /// Create a new retry policy
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self { max_attempts, delay }
    }

    /// `retry_count` retries after the first attempt
    pub fn from_config(config: &TranslationCommonConfig) -> Self {
        Self::new(
            config.retry_count.saturating_add(1),
            Duration::from_millis(config.retry_delay_ms),
        )
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Execute `operation` until it succeeds, fails with a non-retryable
    /// error, or runs out of attempts; `fallback` is returned in the last
    /// two cases.
    pub async fn run<T, F, Fut>(&self, operation_name: &str, fallback: T, mut operation: F) -> RetryOutcome<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let max_attempts = self.attempts();
        let mut last_error = None;
        let mut attempts = 0;

        for attempt in 0..max_attempts {
            if attempt > 0 && !self.delay.is_zero() {
                debug!(
                    "{}: Retry attempt {}/{} after {:?}",
                    operation_name,
                    attempt + 1,
                    max_attempts,
                    self.delay
                );
                sleep(self.delay).await;
            }

            attempts += 1;
            match operation().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!("{}: Succeeded on attempt {}/{}", operation_name, attempt + 1, max_attempts);
                    }
                    return RetryOutcome {
                        value,
                        attempts,
                        error: None,
                    };
                }
                Err(e) => {
                    let retryable = e.is_retryable();
                    let remaining = max_attempts - attempt - 1;
                    if retryable && remaining > 0 {
                        debug!(
                            "{}: Attempt {}/{} failed ({}), {} retries remaining",
                            operation_name,
                            attempt + 1,
                            max_attempts,
                            e,
                            remaining
                        );
                    }
                    last_error = Some(e);
                    if !retryable {
                        break;
                    }
                }
            }
        }

        if let Some(e) = &last_error {
            warn!(
                "{}: Giving up after {} attempt(s), keeping original text. Last error: {}",
                operation_name, attempts, e
            );
        }

        RetryOutcome {
            value: fallback,
            attempts,
            error: last_error,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&TranslationCommonConfig::default())
    }
}
