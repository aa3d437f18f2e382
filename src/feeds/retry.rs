//! Retry with exponential backoff for upstream feed calls
//!
//! The retry policy is deliberately decoupled from the cache TTL: cache
//! validity decides *when* a fetch happens, this module decides what happens
//! *within* one fetch. The default is a single attempt (no retries), which
//! keeps the TTL-based re-attempt on the next call as the de facto retry
//! policy; deployments behind flaky networks can opt in to retries via
//! configuration.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retry attempts after the initial one (0 = single attempt)
    pub max_retries: u32,

    /// Initial backoff duration
    pub initial_backoff: Duration,

    /// Maximum backoff duration
    pub max_backoff: Duration,

    /// Backoff multiplier per attempt
    pub multiplier: f64,

    /// Add random jitter to avoid synchronized retries
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(30),
            multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Backoff duration for a given attempt number
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let base = self.initial_backoff.as_secs_f64() * self.multiplier.powi(attempt as i32);
        let capped = base.min(self.max_backoff.as_secs_f64());

        let with_jitter = if self.jitter {
            // 0-25% jitter on top of the capped backoff
            capped * (1.0 + subsec_jitter() * 0.25)
        } else {
            capped
        };

        Duration::from_secs_f64(with_jitter)
    }
}

/// Pseudo-random jitter factor (0.0 to 1.0) without an RNG dependency
fn subsec_jitter() -> f64 {
    use std::time::SystemTime;
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    (nanos % 1000) as f64 / 1000.0
}

/// Retry classification for errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry the operation
    Retry,
    /// Retry after a specific duration (e.g. from a Retry-After header)
    RetryAfter(Duration),
    /// The error is permanent, do not retry
    NoRetry,
}

/// Trait for errors that can indicate whether to retry
pub trait RetryableError {
    fn retry_decision(&self) -> RetryDecision;
}

/// Execute an async operation under the given retry policy
///
/// Returns the first success, or the last error once the attempt budget is
/// exhausted or a permanent error is seen.
pub async fn with_retry<F, Fut, T, E>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: RetryableError + std::fmt::Display,
{
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => match e.retry_decision() {
                RetryDecision::NoRetry => {
                    debug!(
                        operation = operation_name,
                        attempt = attempt,
                        "Non-retryable error: {}",
                        e
                    );
                    return Err(e);
                }
                decision => {
                    if attempt >= config.max_retries {
                        if attempt > 0 {
                            warn!(
                                operation = operation_name,
                                attempts = attempt + 1,
                                "Giving up after {} attempts: {}",
                                attempt + 1,
                                e
                            );
                        }
                        return Err(e);
                    }

                    let backoff = match decision {
                        RetryDecision::RetryAfter(d) => d.min(config.max_backoff),
                        _ => config.backoff_for(attempt),
                    };

                    warn!(
                        operation = operation_name,
                        attempt = attempt + 1,
                        backoff_secs = backoff.as_secs_f64(),
                        "Retrying after error: {}",
                        e
                    );

                    sleep(backoff).await;
                    attempt += 1;
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_progression_without_jitter() {
        let config = RetryConfig {
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(8),
            multiplier: 2.0,
            jitter: false,
            ..Default::default()
        };

        assert_eq!(config.backoff_for(0), Duration::from_secs(1));
        assert_eq!(config.backoff_for(1), Duration::from_secs(2));
        assert_eq!(config.backoff_for(2), Duration::from_secs(4));
        assert_eq!(config.backoff_for(5), Duration::from_secs(8)); // capped
    }

    #[test]
    fn test_backoff_jitter_bounds() {
        let config = RetryConfig {
            initial_backoff: Duration::from_secs(1),
            jitter: true,
            ..Default::default()
        };

        let backoff = config.backoff_for(0);
        assert!(backoff >= Duration::from_secs(1));
        assert!(backoff <= Duration::from_millis(1250));
    }

    #[derive(Debug)]
    struct TestError {
        retryable: bool,
    }

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "TestError(retryable={})", self.retryable)
        }
    }

    impl RetryableError for TestError {
        fn retry_decision(&self) -> RetryDecision {
            if self.retryable {
                RetryDecision::Retry
            } else {
                RetryDecision::NoRetry
            }
        }
    }

    #[tokio::test]
    async fn test_default_policy_is_single_attempt() {
        let config = RetryConfig::default();
        let mut attempts = 0;

        let result: Result<&str, TestError> = with_retry(&config, "test", || {
            attempts += 1;
            async move { Err(TestError { retryable: true }) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempts, 1);
    }

    #[tokio::test]
    async fn test_retry_succeeds_eventually() {
        let config = RetryConfig {
            max_retries: 3,
            initial_backoff: Duration::from_millis(1),
            ..Default::default()
        };
        let mut attempts = 0;

        let result: Result<&str, TestError> = with_retry(&config, "test", || {
            attempts += 1;
            async move {
                if attempts < 3 {
                    Err(TestError { retryable: true })
                } else {
                    Ok("success")
                }
            }
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(attempts, 3);
    }

    #[tokio::test]
    async fn test_no_retry_on_permanent_error() {
        let config = RetryConfig {
            max_retries: 3,
            initial_backoff: Duration::from_millis(1),
            ..Default::default()
        };
        let mut attempts = 0;

        let result: Result<&str, TestError> = with_retry(&config, "test", || {
            attempts += 1;
            async move { Err(TestError { retryable: false }) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempts, 1);
    }
}
