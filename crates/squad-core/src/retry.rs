//! Bounded retry with a validity predicate.
//!
//! [`retry_bounded`] knows nothing about collaborators or actions: it runs
//! an async attempt function up to `1 + max_retries` times, checks each
//! produced value with a predicate, and feeds the previous failure reason
//! into the next attempt. An attempt may also abort the loop outright,
//! which is how non-retryable errors such as timeouts stop early.

use std::future::Future;

/// How many attempts to make.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts allowed after the first.
    pub max_retries: u32,
}

impl RetryPolicy {
    /// Total attempts allowed, including the first.
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// Input handed to each attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptContext {
    /// 1-based attempt number.
    pub number: u32,
    /// Why the previous attempt failed.
    pub prior_failure: Option<String>,
}

/// What one attempt produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptResult<T> {
    /// A value, still to be checked.
    Produced(T),
    /// A retryable failure.
    Failed(String),
    /// A non-retryable failure; stop now.
    Abort(String),
}

/// Diagnostic record of one attempt.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AttemptRecord {
    /// 1-based attempt number.
    pub number: u32,
    /// Why the attempt was not accepted. `None` for the accepted attempt.
    pub failure: Option<String>,
}

/// How the loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryOutcome<T> {
    /// A value passed the check.
    Accepted(T),
    /// Every allowed attempt failed.
    Exhausted,
    /// An attempt aborted the loop.
    Aborted(String),
}

/// Outcome plus the per-attempt diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryReport<T> {
    /// How the loop ended.
    pub outcome: RetryOutcome<T>,
    /// One record per attempt made, in order.
    pub attempts: Vec<AttemptRecord>,
}

impl<T> RetryReport<T> {
    /// Attempts made beyond the first.
    pub fn retries(&self) -> u32 {
        u32::try_from(self.attempts.len())
            .unwrap_or(u32::MAX)
            .saturating_sub(1)
    }

    /// The last recorded failure reason.
    pub fn last_failure(&self) -> Option<&str> {
        self.attempts.iter().rev().find_map(|a| a.failure.as_deref())
    }
}

/// Run `attempt` until `check` accepts a value, the policy is exhausted, or
/// an attempt aborts.
pub async fn retry_bounded<T, F, Fut, C>(policy: RetryPolicy, mut attempt: F, check: C) -> RetryReport<T>
where
    F: FnMut(AttemptContext) -> Fut,
    Fut: Future<Output = AttemptResult<T>>,
    C: Fn(&T) -> Result<(), String>,
{
    let mut attempts = Vec::new();
    let mut prior_failure = None;

    for number in 1..=policy.max_attempts() {
        let ctx = AttemptContext {
            number,
            prior_failure: prior_failure.take(),
        };
        let failure = match attempt(ctx).await {
            AttemptResult::Produced(value) => match check(&value) {
                Ok(()) => {
                    attempts.push(AttemptRecord {
                        number,
                        failure: None,
                    });
                    return RetryReport {
                        outcome: RetryOutcome::Accepted(value),
                        attempts,
                    };
                }
                Err(reason) => reason,
            },
            AttemptResult::Failed(reason) => reason,
            AttemptResult::Abort(reason) => {
                attempts.push(AttemptRecord {
                    number,
                    failure: Some(reason.clone()),
                });
                return RetryReport {
                    outcome: RetryOutcome::Aborted(reason),
                    attempts,
                };
            }
        };
        attempts.push(AttemptRecord {
            number,
            failure: Some(failure.clone()),
        });
        prior_failure = Some(failure);
    }

    RetryReport {
        outcome: RetryOutcome::Exhausted,
        attempts,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    fn even(value: &u32) -> Result<(), String> {
        if value % 2 == 0 {
            Ok(())
        } else {
            Err(format!("{value} is odd"))
        }
    }

    #[tokio::test]
    async fn first_valid_value_is_accepted() {
        let report = retry_bounded(
            RetryPolicy { max_retries: 2 },
            |_ctx| async { AttemptResult::Produced(4_u32) },
            even,
        )
        .await;
        assert_eq!(report.outcome, RetryOutcome::Accepted(4));
        assert_eq!(report.retries(), 0);
    }

    #[tokio::test]
    async fn prior_failure_is_fed_forward() {
        let seen = RefCell::new(Vec::new());
        let report = retry_bounded(
            RetryPolicy { max_retries: 2 },
            |ctx: AttemptContext| {
                seen.borrow_mut().push(ctx.prior_failure.clone());
                let value = ctx.number.saturating_mul(3);
                async move { AttemptResult::Produced(value) }
            },
            even,
        )
        .await;
        assert_eq!(report.outcome, RetryOutcome::Accepted(6));
        assert_eq!(report.retries(), 1);
        assert_eq!(
            seen.into_inner(),
            vec![None, Some("3 is odd".to_owned())]
        );
    }

    #[tokio::test]
    async fn exhaustion_makes_exactly_max_attempts() {
        let calls = RefCell::new(0_u32);
        let report = retry_bounded(
            RetryPolicy { max_retries: 2 },
            |_ctx| {
                let mut n = calls.borrow_mut();
                *n = n.saturating_add(1);
                drop(n);
                async { AttemptResult::<u32>::Failed("garbled".to_owned()) }
            },
            even,
        )
        .await;
        assert_eq!(report.outcome, RetryOutcome::Exhausted);
        assert_eq!(*calls.borrow(), 3);
        assert_eq!(report.retries(), 2);
        assert_eq!(report.last_failure(), Some("garbled"));
    }

    #[tokio::test]
    async fn abort_stops_immediately() {
        let calls = RefCell::new(0_u32);
        let report = retry_bounded(
            RetryPolicy { max_retries: 5 },
            |_ctx| {
                let mut n = calls.borrow_mut();
                *n = n.saturating_add(1);
                drop(n);
                async { AttemptResult::<u32>::Abort("timed out".to_owned()) }
            },
            even,
        )
        .await;
        assert_eq!(report.outcome, RetryOutcome::Aborted("timed out".to_owned()));
        assert_eq!(*calls.borrow(), 1);
        assert_eq!(report.retries(), 0);
    }

    #[tokio::test]
    async fn zero_retries_means_one_attempt() {
        let report = retry_bounded(
            RetryPolicy { max_retries: 0 },
            |_ctx| async { AttemptResult::Produced(1_u32) },
            even,
        )
        .await;
        assert_eq!(report.outcome, RetryOutcome::Exhausted);
        assert_eq!(report.attempts.len(), 1);
    }
}
