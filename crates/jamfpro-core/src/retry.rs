// ── Deadline-bounded retry ──
//
// Wraps a single backend call in a retry loop. Transient failures are
// absorbed until the deadline, which also bounds each attempt in flight;
// NotFound and terminal failures stop the loop at once. Calls that may create something on the server are only
// retried when the failed attempt provably never reached it.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use jamfpro_api::ErrorClass;
use thiserror::Error;
use tokio::time::{Instant, sleep, timeout_at};
use tracing::{debug, warn};

/// Whether repeating a call can duplicate its effect on the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Idempotency {
    /// Reads, full-replacement updates, deletes.
    Idempotent,
    /// Creates: a repeated `POST` may create a second object.
    NonIdempotent,
}

/// Deadline and backoff settings for one kind of operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total time budget, measured from the first attempt. A budget too
    /// large to represent as an instant means no deadline at all.
    pub timeout: Duration,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }
}

/// Errors that can be classified for retry purposes.
pub trait Retryable {
    fn class(&self) -> ErrorClass;

    /// The error reported when the deadline cuts off an attempt before
    /// any earlier attempt has failed.
    fn timed_out(budget: Duration) -> Self
    where
        Self: Sized;

    /// The failed attempt never reached the server's mutation logic.
    fn is_pre_dispatch(&self) -> bool {
        false
    }

    /// Server-requested delay before the next attempt.
    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

impl Retryable for jamfpro_api::Error {
    fn class(&self) -> ErrorClass {
        jamfpro_api::Error::class(self)
    }

    fn timed_out(budget: Duration) -> Self {
        jamfpro_api::Error::Timeout {
            timeout_secs: budget.as_secs(),
        }
    }

    fn is_pre_dispatch(&self) -> bool {
        jamfpro_api::Error::is_pre_dispatch(self)
    }

    fn retry_after(&self) -> Option<Duration> {
        jamfpro_api::Error::retry_after(self)
    }
}

/// Why the retry loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum GiveUp {
    #[strum(to_string = "deadline elapsed")]
    DeadlineElapsed,
    #[strum(to_string = "non-retryable error")]
    Terminal,
    #[strum(to_string = "transient error on a non-idempotent call")]
    UnsafeMutation,
}

/// The error of the last attempt, with how the loop got there.
#[derive(Debug, Error)]
#[error("{reason} after {attempts} attempt(s): {source}")]
pub struct RetryError<E> {
    pub attempts: u32,
    pub elapsed: Duration,
    pub reason: GiveUp,
    #[source]
    pub source: E,
}

impl<E: Retryable> Retryable for RetryError<E> {
    fn class(&self) -> ErrorClass {
        self.source.class()
    }

    fn timed_out(budget: Duration) -> Self {
        Self {
            attempts: 0,
            elapsed: budget,
            reason: GiveUp::DeadlineElapsed,
            source: E::timed_out(budget),
        }
    }

    fn is_pre_dispatch(&self) -> bool {
        self.source.is_pre_dispatch()
    }

    fn retry_after(&self) -> Option<Duration> {
        self.source.retry_after()
    }
}

/// Invoke `op` until it succeeds, fails terminally, or the policy's
/// deadline elapses. An attempt still running at the deadline is dropped.
pub async fn with_retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    idempotency: Idempotency,
    mut op: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + fmt::Display,
{
    let started = Instant::now();
    let deadline = started.checked_add(policy.timeout);
    let mut backoff = policy.initial_backoff;
    let mut attempts: u32 = 0;
    let mut last_err: Option<E> = None;

    loop {
        attempts += 1;
        let stop = |reason: GiveUp, source: E| RetryError {
            attempts,
            elapsed: started.elapsed(),
            reason,
            source,
        };

        let outcome = match deadline {
            Some(deadline) => match timeout_at(deadline, op()).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    warn!(attempts, "retry deadline elapsed during an attempt");
                    let source = last_err.unwrap_or_else(|| E::timed_out(policy.timeout));
                    return Err(stop(GiveUp::DeadlineElapsed, source));
                }
            },
            None => op().await,
        };
        let err = match outcome {
            Ok(value) => {
                if attempts > 1 {
                    debug!(attempts, "call succeeded after retrying");
                }
                return Ok(value);
            }
            Err(err) => err,
        };

        if err.class() != ErrorClass::Transient {
            return Err(stop(GiveUp::Terminal, err));
        }

        if idempotency == Idempotency::NonIdempotent && !err.is_pre_dispatch() {
            warn!(attempt = attempts, error = %err, "not retrying non-idempotent call");
            return Err(stop(GiveUp::UnsafeMutation, err));
        }

        let delay = err.retry_after().map_or(backoff, |hint| hint.max(backoff));
        let crosses_deadline = deadline.is_some_and(|deadline| {
            Instant::now()
                .checked_add(delay)
                .is_none_or(|next| next >= deadline)
        });
        if crosses_deadline {
            warn!(attempts, error = %err, "retry deadline elapsed");
            return Err(stop(GiveUp::DeadlineElapsed, err));
        }

        warn!(attempt = attempts, ?delay, error = %err, "transient backend error, retrying");
        last_err = Some(err);
        sleep(delay).await;
        backoff = backoff.saturating_mul(2).min(policy.max_backoff);
    }
}
