//! Retry executor
//!
//! Wraps one logical endpoint call. Capacity-class failures (rate limit, quota,
//! overload, unavailable) are waited out with jittered exponential backoff;
//! everything else fails on the spot. Attempts are strictly sequential.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::backoff::Backoff;
use crate::client::error_classification::{is_transient, standard_code};
use crate::error_code::StandardErrorCode;
use crate::{Error, Result};

/// Configuration for retry logic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    /// Upper bound of the additive jitter as a fraction of the nominal delay.
    pub jitter_ratio: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 2000,
            jitter_ratio: 0.3,
        }
    }
}

impl RetryConfig {
    pub fn with_max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn with_jitter_ratio(mut self, ratio: f64) -> Self {
        self.jitter_ratio = ratio;
        self
    }
}

/// Decision for how to proceed after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Retry { delay: Duration },
    /// Transient failure on the final attempt.
    Exhausted,
    Fail,
}

/// Bounded, cancellable retry loop around a single async operation.
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    max_attempts: u32,
    backoff: Backoff,
}

impl Default for RetryExecutor {
    fn default() -> Self {
        Self::new(&RetryConfig::default())
    }
}

impl RetryExecutor {
    pub fn new(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            backoff: Backoff::new(
                Duration::from_millis(config.base_delay_ms),
                config.jitter_ratio,
            ),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn backoff(&self) -> &Backoff {
        &self.backoff
    }

    /// Decide what to do after `attempt` (0-based) failed with `err`.
    pub fn decide(&self, err: &Error, attempt: u32) -> Decision {
        if !is_transient(err) {
            return Decision::Fail;
        }
        if attempt.saturating_add(1) >= self.max_attempts {
            return Decision::Exhausted;
        }
        Decision::Retry {
            delay: self.backoff.delay(attempt),
        }
    }

    /// Run `operation` until it succeeds, fails permanently, or the attempt budget runs out.
    ///
    /// `operation` receives the 0-based attempt number. When the budget is spent on
    /// transient failures the last error is replaced by [`Error::Overloaded`].
    /// A triggered `cancel` token aborts the in-flight attempt or the pending wait.
    pub async fn execute<T, F, Fut>(
        &self,
        cancel: Option<&CancellationToken>,
        mut operation: F,
    ) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt: u32 = 0;
        loop {
            if cancel.map_or(false, CancellationToken::is_cancelled) {
                return Err(Error::Cancelled);
            }

            let result = match cancel {
                Some(token) => tokio::select! {
                    biased;
                    _ = token.cancelled() => return Err(Error::Cancelled),
                    r = operation(attempt) => r,
                },
                None => operation(attempt).await,
            };

            let err = match result {
                Ok(value) => {
                    if attempt == 0 {
                        debug!("request succeeded on first attempt");
                    } else {
                        info!(retries = attempt, "request succeeded after retries");
                    }
                    return Ok(value);
                }
                Err(e) => e,
            };

            let code = standard_code(&err).unwrap_or(StandardErrorCode::Unknown);
            match self.decide(&err, attempt) {
                Decision::Fail => {
                    warn!(
                        attempt = attempt + 1,
                        error_code = code.code(),
                        error_category = code.category(),
                        error = %err,
                        "non-retryable failure"
                    );
                    return Err(err);
                }
                Decision::Exhausted => {
                    warn!(
                        max_attempts = self.max_attempts,
                        error_code = code.code(),
                        error = %err,
                        "retry budget exhausted on transient failures"
                    );
                    return Err(Error::Overloaded {
                        attempts: attempt + 1,
                    });
                }
                Decision::Retry { delay } => {
                    warn!(
                        attempt = attempt + 1,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error_code = code.code(),
                        error = %err,
                        "transient failure, backing off"
                    );
                    wait(delay, cancel).await?;
                    attempt += 1;
                }
            }
        }
    }
}

async fn wait(delay: Duration, cancel: Option<&CancellationToken>) -> Result<()> {
    match cancel {
        Some(token) => tokio::select! {
            biased;
            _ = token.cancelled() => Err(Error::Cancelled),
            _ = tokio::time::sleep(delay) => Ok(()),
        },
        None => {
            tokio::time::sleep(delay).await;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(status: u16) -> Error {
        Error::Remote {
            status,
            class: String::new(),
            message: String::new(),
        }
    }

    #[test]
    fn test_decide() {
        let exec = RetryExecutor::new(&RetryConfig::default().with_jitter_ratio(0.0));
        assert_eq!(exec.decide(&remote(401), 0), Decision::Fail);
        assert_eq!(
            exec.decide(&remote(429), 0),
            Decision::Retry {
                delay: Duration::from_secs(2)
            }
        );
        assert_eq!(
            exec.decide(&remote(503), 3),
            Decision::Retry {
                delay: Duration::from_secs(16)
            }
        );
        assert_eq!(exec.decide(&remote(503), 4), Decision::Exhausted);
    }

    #[test]
    fn test_zero_attempts_means_one() {
        let exec = RetryExecutor::new(&RetryConfig::default().with_max_attempts(0));
        assert_eq!(exec.max_attempts(), 1);
        assert_eq!(exec.decide(&remote(429), 0), Decision::Exhausted);
    }

    #[tokio::test]
    async fn test_success_passes_value_through() {
        let exec = RetryExecutor::default();
        let v = exec.execute(None, |_| async { Ok::<_, Error>(42) }).await.unwrap();
        assert_eq!(v, 42);
    }

    #[tokio::test]
    async fn test_pre_cancelled_token_skips_call() {
        let exec = RetryExecutor::default();
        let token = CancellationToken::new();
        token.cancel();
        let mut calls = 0;
        let res = exec
            .execute(Some(&token), |_| {
                calls += 1;
                async { Ok::<_, Error>(()) }
            })
            .await;
        assert!(matches!(res, Err(Error::Cancelled)));
        assert_eq!(calls, 0);
    }
}
