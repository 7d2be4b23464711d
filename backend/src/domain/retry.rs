//! Bounded retries with exponential backoff.
//!
//! [`RetryExecutor::run`] invokes an async operation up to `retries` times.
//! Between consecutive failures it sleeps for the current delay, then
//! multiplies the delay by `backoff_factor`. No sleep follows the final
//! attempt. Each failed attempt is logged at `warn`.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use super::ports::Sleeper;

/// Retry policy.
///
/// # Examples
/// ```
/// use backend::domain::RetryOptions;
/// use std::time::Duration;
///
/// let options = RetryOptions::default();
/// assert_eq!(options.retries, 5);
/// assert_eq!(options.delay, Duration::from_millis(200));
/// assert_eq!(options.backoff_factor, 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryOptions {
    /// Total number of attempts, including the first.
    pub retries: u32,
    /// Wait before the second attempt.
    pub delay: Duration,
    /// Multiplier applied to the delay after each wait.
    pub backoff_factor: u32,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            retries: 5,
            delay: Duration::from_millis(200),
            backoff_factor: 2,
        }
    }
}

/// Outcome of a retry run that never succeeded.
#[derive(Debug, thiserror::Error)]
pub enum RetryError<E> {
    /// Every attempt failed; `last` is the final attempt's error.
    #[error("operation failed after {attempts} attempt(s): {last}")]
    Exhausted {
        /// Number of attempts made.
        attempts: u32,
        /// Error from the last attempt.
        last: E,
    },
    /// The policy allowed zero attempts, so the operation never ran.
    #[error("retry policy allows no attempts")]
    NoAttempts,
}

impl<E> RetryError<E> {
    /// The last attempt's error, if any attempt ran.
    pub fn into_last(self) -> Option<E> {
        match self {
            Self::Exhausted { last, .. } => Some(last),
            Self::NoAttempts => None,
        }
    }
}

/// Tokio-based sleeper implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Runs async operations under a [`RetryOptions`] policy.
#[derive(Clone)]
pub struct RetryExecutor {
    options: RetryOptions,
    sleeper: Arc<dyn Sleeper>,
}

impl RetryExecutor {
    /// Executor sleeping on the Tokio timer.
    pub fn new(options: RetryOptions) -> Self {
        Self::with_sleeper(options, Arc::new(TokioSleeper))
    }

    /// Executor using a caller-supplied sleeper.
    pub fn with_sleeper(options: RetryOptions, sleeper: Arc<dyn Sleeper>) -> Self {
        Self { options, sleeper }
    }

    /// Invoke `operation` until it succeeds or the attempt budget is spent.
    ///
    /// # Errors
    /// [`RetryError::Exhausted`] carries the last attempt's error when every
    /// attempt failed. [`RetryError::NoAttempts`] is returned, without
    /// calling `operation`, when `retries` is zero.
    pub async fn run<T, E, Op, Fut>(&self, mut operation: Op) -> Result<T, RetryError<E>>
    where
        Op: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let RetryOptions {
            retries,
            backoff_factor,
            ..
        } = self.options;
        let mut delay = self.options.delay;
        let mut last = None;

        for attempt in 1..=retries {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    warn!(
                        attempt,
                        retries,
                        error = %error,
                        "attempt failed"
                    );
                    last = Some(error);
                }
            }
            if attempt < retries {
                if !delay.is_zero() {
                    self.sleeper.sleep(delay).await;
                }
                delay = delay.saturating_mul(backoff_factor);
            }
        }

        match last {
            Some(last) => Err(RetryError::Exhausted {
                attempts: retries,
                last,
            }),
            None => Err(RetryError::NoAttempts),
        }
    }
}

impl std::fmt::Debug for RetryExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryExecutor")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
