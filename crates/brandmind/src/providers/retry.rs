//! Bounded retry around a single provider call.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use super::errors::ProviderError;

pub const DEFAULT_MAX_ATTEMPTS: usize = 3;

/// Advisory per-attempt bound. When it fires the executor stops waiting;
/// the underlying future is dropped, so any in-flight HTTP exchange is
/// abandoned rather than aborted gracefully.
pub const ATTEMPT_TIMEOUT: Duration = Duration::from_secs(45);

const BACKOFF_STEP: Duration = Duration::from_millis(1000);

/// Run `operation` up to `max_attempts` times. Each attempt races the
/// operation against [`ATTEMPT_TIMEOUT`]; success short-circuits immediately.
/// Between failed attempts the executor sleeps `1000ms * attempt`. On
/// exhaustion the last recorded error is propagated.
pub async fn execute_with_retry<F, Fut, T>(
    mut operation: F,
    max_attempts: usize,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut last_error =
        ProviderError::ExecutionError("retry executor invoked with zero attempts".to_string());

    for attempt in 1..=max_attempts {
        match tokio::time::timeout(ATTEMPT_TIMEOUT, operation()).await {
            Ok(Ok(value)) => {
                if attempt > 1 {
                    debug!(attempt, "provider call recovered after retry");
                }
                return Ok(value);
            }
            Ok(Err(err)) => {
                warn!(attempt, max_attempts, error = %err, "provider call failed");
                last_error = err;
            }
            Err(_) => {
                warn!(attempt, max_attempts, "provider call timed out");
                last_error = ProviderError::Timeout(format!(
                    "no response within {}s",
                    ATTEMPT_TIMEOUT.as_secs()
                ));
            }
        }

        if attempt < max_attempts {
            tokio::time::sleep(BACKOFF_STEP * attempt as u32).await;
        }
    }

    Err(last_error)
}
