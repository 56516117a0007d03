//! Fixed-delay retry policy for message source calls.

use std::time::Duration;

use crate::config::RetryConfig;
use crate::error::{Error, Result};

pub const DEFAULT_ATTEMPTS: u32 = 3;
pub const DEFAULT_DELAY_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            delay: Duration::from_secs(DEFAULT_DELAY_SECS),
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            attempts: config.attempts,
            delay: Duration::from_secs(config.delay_secs),
        }
    }
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
        }
    }

    /// Single attempt, no delay.
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Run `op` until it succeeds or the attempts run out.
    ///
    /// The last failure is wrapped in [`Error::RetriesExhausted`]. Errors that
    /// are not retryable (bad input, unknown space) return immediately.
    pub fn run<T, F>(&self, operation: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Result<T>,
    {
        let attempts = self.attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match op() {
                Ok(value) => return Ok(value),
                Err(err) if !err.is_retryable() => return Err(err),
                Err(err) if attempt >= attempts => {
                    tracing::error!(operation, attempts, error = %err, "giving up");
                    return Err(Error::RetriesExhausted {
                        operation: operation.to_string(),
                        attempts,
                        last: Box::new(err),
                    });
                }
                Err(err) => {
                    tracing::warn!(
                        operation,
                        attempt,
                        delay_secs = self.delay.as_secs_f64(),
                        error = %err,
                        "attempt failed, retrying"
                    );
                    if !self.delay.is_zero() {
                        std::thread::sleep(self.delay);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn failure() -> Error {
        Error::Source {
            space: "spaces/S".to_string(),
            message: "unavailable".to_string(),
        }
    }

    #[test]
    fn succeeds_after_transient_failures() {
        let calls = Cell::new(0);
        let policy = RetryPolicy::new(3, Duration::ZERO);
        let value = policy
            .run("list", || {
                calls.set(calls.get() + 1);
                if calls.get() < 3 {
                    Err(failure())
                } else {
                    Ok(42)
                }
            })
            .expect("eventual success");
        assert_eq!(value, 42);
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn exhausting_attempts_surfaces_error() {
        let calls = Cell::new(0);
        let policy = RetryPolicy::new(3, Duration::ZERO);
        let err = policy
            .run::<(), _>("list", || {
                calls.set(calls.get() + 1);
                Err(failure())
            })
            .expect_err("exhausted");
        assert_eq!(calls.get(), 3);
        match err {
            Error::RetriesExhausted { attempts, last, .. } => {
                assert_eq!(attempts, 3);
                assert!(matches!(*last, Error::Source { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn user_errors_are_not_retried() {
        let calls = Cell::new(0);
        let policy = RetryPolicy::new(3, Duration::ZERO);
        let err = policy
            .run::<(), _>("list", || {
                calls.set(calls.get() + 1);
                Err(Error::SpaceNotFound("spaces/X".to_string()))
            })
            .expect_err("not found");
        assert_eq!(calls.get(), 1);
        assert!(matches!(err, Error::SpaceNotFound(_)));
    }

    #[test]
    fn zero_attempts_still_tries_once() {
        let calls = Cell::new(0);
        let policy = RetryPolicy {
            attempts: 0,
            delay: Duration::ZERO,
        };
        let _ = policy.run::<(), _>("list", || {
            calls.set(calls.get() + 1);
            Err(failure())
        });
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn default_policy_is_three_fixed_attempts() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.attempts, 3);
        assert_eq!(policy.delay, Duration::from_secs(30));
    }
}
