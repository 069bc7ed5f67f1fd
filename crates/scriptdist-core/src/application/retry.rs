//! Bounded exponential backoff for remote calls.

use std::time::Duration;

use backon::{BlockingRetryable, ExponentialBuilder};
use tracing::warn;

use crate::error::{ScriptdistError, ScriptdistResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts including the first one.
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no sleeping.
    pub const fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Doubling delays from `initial_delay`, capped at `max_delay`, one per retry.
    pub fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.initial_delay)
            .with_max_delay(self.max_delay)
            .with_factor(2.0)
            .with_max_times(self.max_attempts.saturating_sub(1) as usize)
    }
}

/// Run `op` until it succeeds, fails with a non-retryable error, or the
/// attempts run out.
pub fn with_retry<T>(
    policy: &RetryPolicy,
    operation: &str,
    op: impl FnMut() -> ScriptdistResult<T>,
) -> ScriptdistResult<T> {
    op.retry(policy.backoff())
        .sleep(std::thread::sleep)
        .when(ScriptdistError::is_retryable)
        .notify(|error: &ScriptdistError, delay: Duration| {
            warn!(
                operation,
                max_attempts = policy.max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Retrying"
            );
        })
        .call()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ApplicationError;
    use backon::BackoffBuilder;

    fn instant(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    #[test]
    fn delays_grow_and_cap() {
        let p = RetryPolicy {
            max_attempts: 5,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(350),
        };
        let delays: Vec<Duration> = p.backoff().build().collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(350),
                Duration::from_millis(350),
            ]
        );
    }

    #[test]
    fn single_attempt_policy_never_sleeps() {
        assert_eq!(RetryPolicy::none().backoff().build().count(), 0);
    }

    #[test]
    fn retries_transient_errors_until_success() {
        let mut calls = 0;
        let result = with_retry(&instant(3), "op", || {
            calls += 1;
            if calls < 3 {
                Err(ApplicationError::Network { reason: "reset".into() }.into())
            } else {
                Ok(calls)
            }
        });
        assert_eq!(result.unwrap(), 3);
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let mut calls = 0;
        let result: ScriptdistResult<()> = with_retry(&instant(2), "op", || {
            calls += 1;
            Err(ApplicationError::Network { reason: "reset".into() }.into())
        });
        assert!(result.is_err());
        assert_eq!(calls, 2);
    }

    #[test]
    fn fatal_errors_are_not_retried() {
        let mut calls = 0;
        let result: ScriptdistResult<()> = with_retry(&instant(5), "op", || {
            calls += 1;
            Err(ApplicationError::Auth { reason: "401".into() }.into())
        });
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }
}
