//! Remote call retries with exponential backoff, timeouts and cancellation.
//!
//! Every listing call made against AWS goes through [`with_retry`]: each
//! attempt is bounded by a per-call timeout, throttling and transient
//! failures are retried with jittered exponential backoff, and anything
//! else is returned to the caller immediately.

use crate::aws::error::AwsError;
use anyhow::Result;
use backon::{BackoffBuilder, ExponentialBuilder};
use cfn_inventory_common::defaults::{DEFAULT_CALL_TIMEOUT_SECS, DEFAULT_MAX_ATTEMPTS};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Configuration for retrying remote calls with exponential backoff.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Maximum delay between retries (cap for exponential growth)
    pub max_delay: Duration,
    /// Maximum attempts per call, first try included
    pub max_attempts: usize,
    /// Time allowed for a single attempt
    pub call_timeout: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(10),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            call_timeout: Duration::from_secs(DEFAULT_CALL_TIMEOUT_SECS),
        }
    }
}

/// Retry configuration plus the run-wide cancellation token
#[derive(Debug, Clone, Default)]
pub struct CallPolicy {
    pub retry: RetryConfig,
    pub cancel: CancellationToken,
}

impl CallPolicy {
    pub fn new(retry: RetryConfig, cancel: CancellationToken) -> Self {
        Self { retry, cancel }
    }
}

/// Check whether a failed call is worth another attempt.
pub fn is_retryable(error: &anyhow::Error) -> bool {
    error
        .chain()
        .any(|cause| cause.downcast_ref::<AwsError>().is_some_and(AwsError::is_retryable))
}

/// Run `call` until it succeeds, fails permanently, runs out of attempts or
/// the policy's token is cancelled.
///
/// # Arguments
/// * `policy` - Retry configuration and cancellation token
/// * `operation` - API operation name for logging and errors
/// * `call` - Produces a fresh future for each attempt
///
/// # Example
/// ```ignore
/// let page = with_retry(&policy, "ListStacks", || async {
///     client.list_stacks().send().await.map_err(|e| classify_sdk_error("ListStacks", &e).into())
/// })
/// .await?;
/// ```
pub async fn with_retry<T, F, Fut>(policy: &CallPolicy, operation: &'static str, mut call: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let config = &policy.retry;
    let max_attempts = config.max_attempts.max(1);
    let mut attempts = 0usize;

    let mut delays = ExponentialBuilder::default()
        .with_min_delay(config.initial_delay)
        .with_max_delay(config.max_delay)
        .with_factor(2.0)
        .with_jitter()
        .with_max_times(max_attempts)
        .build();

    loop {
        attempts += 1;

        // Check cancellation before each attempt
        if policy.cancel.is_cancelled() {
            anyhow::bail!("{} cancelled", operation);
        }

        let outcome = tokio::select! {
            result = tokio::time::timeout(config.call_timeout, call()) => result,
            _ = policy.cancel.cancelled() => {
                anyhow::bail!("{} cancelled", operation);
            }
        };

        let error = match outcome {
            Ok(Ok(value)) => {
                if attempts > 1 {
                    debug!(operation, attempts, "Call succeeded after retry");
                }
                return Ok(value);
            }
            Ok(Err(e)) if is_retryable(&e) => e,
            Ok(Err(e)) => return Err(e),
            Err(_) => anyhow::Error::new(AwsError::Transient {
                operation,
                message: format!("no response within {:?}", config.call_timeout),
            }),
        };

        if attempts >= max_attempts {
            return Err(error.context(format!("{operation} failed after {attempts} attempts")));
        }

        let delay = delays.next().unwrap_or(config.max_delay);
        warn!(
            operation,
            attempt = attempts,
            delay_ms = delay.as_millis() as u64,
            error = %error,
            "Call failed, retrying"
        );

        // Wait with cancellation support
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = policy.cancel.cancelled() => {
                anyhow::bail!("{} cancelled", operation);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fast_policy(max_attempts: usize) -> CallPolicy {
        CallPolicy::new(
            RetryConfig {
                initial_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(5),
                max_attempts,
                call_timeout: Duration::from_millis(200),
            },
            CancellationToken::new(),
        )
    }

    fn throttled() -> anyhow::Error {
        AwsError::Throttled {
            operation: "ListStacks",
        }
        .into()
    }

    #[tokio::test]
    async fn retries_throttling_until_success() {
        let calls = AtomicUsize::new(0);
        let result = with_retry(&fast_policy(5), "ListStacks", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { if n < 2 { Err(throttled()) } else { Ok(n) } }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_failure_is_not_retried() {
        let calls = AtomicUsize::new(0);
        let result: Result<()> = with_retry(&fast_policy(5), "ListRoles", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(AwsError::AccessDenied {
                    operation: "ListRoles",
                    message: "denied".to_string(),
                }
                .into())
            }
        })
        .await;

        let err = result.unwrap_err();
        assert!(err.downcast_ref::<AwsError>().is_some());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let calls = AtomicUsize::new(0);
        let result: Result<()> = with_retry(&fast_policy(3), "ListStacks", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(throttled()) }
        })
        .await;

        let err = result.unwrap_err();
        assert!(err.to_string().contains("failed after 3 attempts"));
        assert!(is_retryable(&err));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn slow_call_times_out_and_is_retried() {
        let mut policy = fast_policy(2);
        policy.retry.call_timeout = Duration::from_millis(10);
        let calls = AtomicUsize::new(0);

        let result = with_retry(&policy, "DescribeLogGroups", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                }
                Ok("done")
            }
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn cancelled_policy_stops_immediately() {
        let policy = fast_policy(5);
        policy.cancel.cancel();
        let calls = AtomicUsize::new(0);

        let result: Result<()> = with_retry(&policy, "ListStacks", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        })
        .await;

        assert!(result.unwrap_err().to_string().contains("cancelled"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
