//! Retry policy shared by every call.
//!
//! Only two conditions are retried: transport failures (backoff of
//! `2^attempt` seconds) and HTTP 429 (the server's `Retry-After`). Every other
//! classified error ends the call on the attempt that produced it, 5xx included.

use log::{debug, warn};
use std::future::Future;
use std::time::Duration;

use super::transport::TransportError;
use crate::error::{Error, Result};
use crate::runtime::Runtime;

/// Delay before the attempt following a transport failure on `attempt` (0-based).
pub fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(2u64.saturating_pow(attempt))
}

/// Runs `send` up to `max_attempts` times, feeding each response to `classify`.
///
/// `send` receives the 0-based attempt number. A transport error or a
/// [`Error::RateLimit`] from `classify` sleeps through `runtime` and tries
/// again while attempts remain; anything else is returned as is.
pub async fn with_retry<T, R, S, Fut, C>(
    operation_name: &str,
    max_attempts: u32,
    runtime: &dyn Runtime,
    mut send: S,
    classify: C,
) -> Result<T>
where
    S: FnMut(u32) -> Fut,
    Fut: Future<Output = std::result::Result<R, TransportError>>,
    C: Fn(R) -> Result<T>,
{
    for attempt in 0..max_attempts {
        let last = attempt + 1 >= max_attempts;

        let (delay, reason) = match send(attempt).await {
            Ok(response) => match classify(response) {
                Ok(value) => return Ok(value),
                Err(Error::RateLimit { retry_after }) if !last => (
                    Duration::from_secs(retry_after),
                    "rate limited".to_string(),
                ),
                Err(e) => {
                    debug!("{}: terminal error on attempt {}: {}", operation_name, attempt + 1, e);
                    return Err(e);
                }
            },
            Err(e) if !last => (backoff_delay(attempt), e.to_string()),
            Err(e) => {
                debug!("{}: transport failed on final attempt: {}", operation_name, e);
                return Err(Error::Connection(e.to_string()));
            }
        };

        warn!(
            "{}: attempt {}/{} failed ({}), retrying in {}s...",
            operation_name,
            attempt + 1,
            max_attempts,
            reason,
            delay.as_secs()
        );
        runtime.sleep(delay).await;
    }

    Err(Error::Api {
        status: 0,
        message: format!("{}: max retries exceeded", operation_name),
    })
}
