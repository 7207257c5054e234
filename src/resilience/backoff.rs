//! # Backoff Executor
//!
//! Wraps a fallible remote call and retries transient failures with
//! exponential delay and full jitter. Non-retryable errors pass through
//! immediately; exhausting the attempt budget surfaces the last error.
//!
//! The delay before attempt *n+1* is `starting_delay * 2^n`, scaled by a
//! uniformly random factor in `[0, 1]` so that many concurrent fan-out items
//! hitting the same rate limit do not retry in lockstep.

use crate::constants::system;
use crate::resilience::classification::RemoteError;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Retry policy for a single external call.
///
/// Created fresh per call; the attempt counter never outlives the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Base delay before the first retry
    pub starting_delay: Duration,

    /// Total number of attempts, including the first
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            starting_delay: Duration::from_millis(system::DEFAULT_STARTING_DELAY_MS),
            max_attempts: system::DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Errors surfaced by [`BackoffExecutor::execute`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RetryError {
    /// All attempts were consumed by transient failures
    #[error("retry exhausted after {attempts} attempts: {source}")]
    Exhausted {
        attempts: u32,
        #[source]
        source: RemoteError,
    },

    /// The call failed with a non-retryable error and was not retried
    #[error("terminal error: {0}")]
    Terminal(#[from] RemoteError),
}

impl RetryError {
    /// The underlying remote error, whichever way the retry ended
    pub fn remote_error(&self) -> &RemoteError {
        match self {
            RetryError::Exhausted { source, .. } => source,
            RetryError::Terminal(source) => source,
        }
    }
}

/// Throttling-aware retry wrapper for remote calls
///
/// ```rust
/// use provision_core::resilience::{BackoffExecutor, RemoteError};
///
/// # tokio_test::block_on(async {
/// let executor = BackoffExecutor::new();
/// let value = executor
///     .execute(|| async { Ok::<_, RemoteError>(42) })
///     .await
///     .unwrap();
/// assert_eq!(value, 42);
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct BackoffExecutor {
    policy: RetryPolicy,
}

impl BackoffExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Pre-jitter delay for attempt `n` (0-indexed): `starting_delay * 2^n`
    pub fn base_delay(&self, attempt: u32) -> Duration {
        self.policy
            .starting_delay
            .saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Full jitter: uniform in `[0, base_delay]`
    fn jittered_delay(&self, attempt: u32) -> Duration {
        self.base_delay(attempt).mul_f64(fastrand::f64())
    }

    /// Execute `op`, retrying transient failures up to the policy's attempt
    /// budget. Terminal errors are re-raised immediately without sleeping.
    pub async fn execute<T, F, Fut>(&self, mut op: F) -> Result<T, RetryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RemoteError>>,
    {
        let max_attempts = self.policy.max_attempts.max(1);

        for attempt in 0..max_attempts {
            match op().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(attempt = attempt + 1, "Remote call succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(error) if !error.is_transient() => {
                    debug!(code = %error.code, "Remote call failed with terminal error");
                    return Err(RetryError::Terminal(error));
                }
                Err(error) => {
                    if attempt + 1 >= max_attempts {
                        warn!(
                            code = %error.code,
                            attempts = max_attempts,
                            "Remote call exhausted retry budget"
                        );
                        return Err(RetryError::Exhausted {
                            attempts: max_attempts,
                            source: error,
                        });
                    }

                    let delay = self.jittered_delay(attempt);
                    warn!(
                        code = %error.code,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        "Transient remote error, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }

        unreachable!("retry loop always returns within max_attempts")
    }
}
