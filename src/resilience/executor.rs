//! Generic retry loop

use crate::error::{DirectoryError, Result};
use crate::resilience::policy::RetryPolicy;
use std::future::Future;
use tracing::{debug, error, warn};

/// Run `operation` under `policy`.
///
/// ```text
/// Attempting(n) -> Ok                               => return value
///               -> Err, not retryable               => return error as is
///               -> Err, retryable, n < max_attempts => sleep backoff(n), Attempting(n + 1)
///               -> Err, retryable, n = max_attempts => return RetriesExhausted
/// ```
///
/// Errors that survive at least one retry are wrapped in
/// [`DirectoryError::RetriesExhausted`], which reports the kind of the last
/// error. A policy with a single attempt returns errors unwrapped.
///
/// Retrying a write is only safe if the backend applies it idempotently. A
/// create that timed out after the server applied it will fail or duplicate on
/// the next attempt. Callers that cannot tolerate this should check for
/// existence before retrying or pass [`RetryPolicy::no_retry`].
///
/// Dropping the returned future cancels any pending backoff sleep.
pub async fn execute_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    mut call: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts().max(1);
    let mut attempt = 1;

    loop {
        match call().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!("{} succeeded on attempt {}/{}", operation, attempt, max_attempts);
                }
                return Ok(value);
            }
            Err(e) if !policy.is_retryable(&e) => {
                debug!("{} failed with non-retryable {} error: {}", operation, e.kind(), e);
                return Err(e);
            }
            Err(e) if attempt >= max_attempts => {
                if attempt == 1 {
                    return Err(e);
                }

                error!(
                    "{} failed after {} attempts, giving up: {}",
                    operation, attempt, e
                );
                return Err(DirectoryError::RetriesExhausted {
                    attempts: attempt,
                    source: Box::new(e),
                });
            }
            Err(e) => {
                let delay = policy.delay_for(attempt);
                warn!(
                    "{} failed (attempt {}/{}), retrying after {:?}: {}",
                    operation, attempt, max_attempts, delay, e
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
