//! Bounded retry-with-feedback for collaborator calls.
//!
//! Collaborators that parse free-form upstream output retry until the output
//! is well formed. Each attempt receives the reason the previous one was
//! rejected so it can be fed back upstream.

use std::{future::Future, time::Duration};

use log::{debug, warn};

use crate::error::{MeridianError, Result};

/// How many times to try and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(200),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Retries immediately; used where waiting buys nothing.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_backoff: Duration::ZERO,
            multiplier: 1.0,
        }
    }

    /// Delay before the given retry (1 for the first retry).
    ///
    /// Saturates at [`Duration::MAX`] instead of overflowing.
    pub fn backoff(&self, retry: u32) -> Duration {
        if self.initial_backoff.is_zero() {
            return Duration::ZERO;
        }
        let exponent = i32::try_from(retry.saturating_sub(1)).unwrap_or(i32::MAX);
        let factor = self.multiplier.max(1.0).powi(exponent);
        let seconds = self.initial_backoff.as_secs_f64() * factor;
        Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX)
    }
}

/// Outcome of a single attempt that did not produce a value.
#[derive(Debug)]
pub enum AttemptError {
    /// Output was malformed; the reason goes to the next attempt
    Rejected(String),
    /// Failure that retrying cannot fix
    Fatal(MeridianError),
}

impl From<MeridianError> for AttemptError {
    fn from(error: MeridianError) -> Self {
        AttemptError::Fatal(error)
    }
}

/// Calls `attempt` until it succeeds or the policy runs out.
///
/// The closure receives `None` on the first call and the previous rejection
/// reason afterwards. Fatal errors are returned immediately.
///
/// # Errors
///
/// Returns `RetriesExhausted` carrying the last rejection reason once
/// `max_attempts` attempts have been rejected.
pub async fn retry_with_feedback<T, F, Fut>(
    policy: RetryPolicy,
    label: &str,
    mut attempt: F,
) -> Result<T>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = std::result::Result<T, AttemptError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut feedback: Option<String> = None;

    for number in 1..=max_attempts {
        if number > 1 {
            let delay = policy.backoff(number - 1);
            if !delay.is_zero() {
                debug!("Waiting {delay:?} before retrying {label}");
                tokio::time::sleep(delay).await;
            }
        }

        match attempt(feedback.take()).await {
            Ok(value) => return Ok(value),
            Err(AttemptError::Fatal(error)) => return Err(error),
            Err(AttemptError::Rejected(reason)) => {
                warn!("{label} attempt {number}/{max_attempts} rejected: {reason}");
                feedback = Some(reason);
            }
        }
    }

    Err(MeridianError::RetriesExhausted {
        label: label.to_string(),
        attempts: max_attempts,
        last_reason: feedback.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[tokio::test]
    async fn test_first_success_returns_immediately() {
        let value = retry_with_feedback(RetryPolicy::immediate(3), "scorer", |_| async {
            Ok::<_, AttemptError>(7)
        })
        .await
        .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_feedback_reaches_next_attempt() {
        let seen = Mutex::new(Vec::new());
        let value = retry_with_feedback(RetryPolicy::immediate(3), "mutator", |feedback| {
            seen.lock().unwrap().push(feedback.clone());
            async move {
                match feedback {
                    None => Err(AttemptError::Rejected("missing action".into())),
                    Some(reason) => Ok(format!("fixed {reason}")),
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(value, "fixed missing action");
        assert_eq!(
            *seen.lock().unwrap(),
            vec![None, Some("missing action".to_string())]
        );
    }

    #[tokio::test]
    async fn test_exhaustion_reports_last_reason() {
        let mut calls = 0;
        let err = retry_with_feedback(RetryPolicy::immediate(2), "choice oracle", |_| {
            calls += 1;
            let reason = format!("bad output {calls}");
            async move { Err::<(), _>(AttemptError::Rejected(reason)) }
        })
        .await
        .unwrap_err();

        assert_eq!(calls, 2);
        match err {
            MeridianError::RetriesExhausted {
                label,
                attempts,
                last_reason,
            } => {
                assert_eq!(label, "choice oracle");
                assert_eq!(attempts, 2);
                assert_eq!(last_reason, "bad output 2");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_fatal_error_is_not_retried() {
        let mut calls = 0;
        let err = retry_with_feedback(RetryPolicy::immediate(5), "executor", |_| {
            calls += 1;
            async {
                Err::<(), _>(AttemptError::Fatal(MeridianError::collaborator(
                    "step executor",
                    "connection refused",
                )))
            }
        })
        .await
        .unwrap_err();

        assert_eq!(calls, 1);
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_backoff_grows_by_multiplier() {
        let policy = RetryPolicy {
            max_attempts: 4,
            initial_backoff: Duration::from_millis(100),
            multiplier: 2.0,
        };
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(3), Duration::from_millis(400));
        assert_eq!(RetryPolicy::immediate(3).backoff(2), Duration::ZERO);
    }

    #[test]
    fn test_backoff_saturates_on_huge_exponents() {
        let policy = RetryPolicy {
            max_attempts: 2000,
            initial_backoff: Duration::from_millis(100),
            multiplier: 2.0,
        };
        assert_eq!(policy.backoff(1100), Duration::MAX);
        assert_eq!(policy.backoff(u32::MAX), Duration::MAX);
    }

    #[tokio::test]
    async fn test_zero_backoff_with_many_attempts_exhausts() {
        let policy = RetryPolicy {
            max_attempts: 1100,
            initial_backoff: Duration::ZERO,
            multiplier: 2.0,
        };
        let mut calls = 0;
        let err = retry_with_feedback(policy, "plan scorer", |_| {
            calls += 1;
            async { Err::<(), _>(AttemptError::Rejected("not a score".into())) }
        })
        .await
        .unwrap_err();

        assert_eq!(calls, 1100);
        assert!(matches!(
            err,
            MeridianError::RetriesExhausted { attempts: 1100, .. }
        ));
    }
}
