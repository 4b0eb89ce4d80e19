//! Retry helper for the per-item operations run by the pool.
//!
//! The pool itself never retries; wrap a processing step in [`do_with_retry`] when a
//! transient failure should not abort the whole run.

use std::future::Future;
use tracing::{debug, warn};

/// Outcome of a retried action.
///
/// `Error` carries every error recorded across all attempts, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryResult<T, E> {
    Success(T),
    Error(Vec<E>),
}

impl<T, E> RetryResult<T, E> {
    pub fn is_success(&self) -> bool {
        matches!(self, RetryResult::Success(_))
    }

    pub fn into_result(self) -> Result<T, Vec<E>> {
        match self {
            RetryResult::Success(value) => Ok(value),
            RetryResult::Error(errors) => Err(errors),
        }
    }
}

/// Runs `perform` until it succeeds, at most `max_retries + 1` times.
pub async fn do_with_retry<T, E, F, Fut>(perform: F, max_retries: usize) -> RetryResult<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    do_with_retry_with(perform, max_retries, |_, _| false, |_, _| None).await
}

/// Like [`do_with_retry`], with two hooks receiving the 1-based attempt number:
///
/// - `should_give_up` is asked after every error; `true` stops retrying at once.
/// - `error_when_none_thrown` inspects every successful value; returning `Some`
///   records that error and treats the attempt as failed.
///
/// Recorded errors are discarded as soon as an attempt succeeds.
pub async fn do_with_retry_with<T, E, F, Fut, G, V>(
    mut perform: F,
    max_retries: usize,
    should_give_up: G,
    error_when_none_thrown: V,
) -> RetryResult<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    G: Fn(&E, usize) -> bool,
    V: Fn(&T, usize) -> Option<E>,
{
    let mut errors = Vec::new();
    let mut attempt = 0;

    loop {
        attempt += 1;
        match perform().await {
            Ok(value) => match error_when_none_thrown(&value, attempt) {
                None => return RetryResult::Success(value),
                Some(error) => errors.push(error),
            },
            Err(error) => {
                let give_up = should_give_up(&error, attempt);
                errors.push(error);
                if give_up {
                    warn!(attempt, "giving up on error");
                    return RetryResult::Error(errors);
                }
            }
        }

        if attempt > max_retries {
            warn!(attempt, max_retries, "retries exhausted");
            return RetryResult::Error(errors);
        }
        debug!(attempt, max_retries, "attempt failed, retrying");
    }
}
