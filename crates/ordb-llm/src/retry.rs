//! Retry with exponential back-off for the completion client.
//!
//! [`retry_with_backoff`] wraps any fallible async operation and retries on
//! transient errors (network failures, 5xx). Non-transient errors such as
//! [`LlmError::ApiKey`] and [`LlmError::Deserialize`] are returned
//! immediately without any retry.

use std::future::Future;
use std::time::Duration;

use crate::error::LlmError;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:**
/// - Network-level failures: timeout, connection reset.
/// - HTTP 5xx responses: transient server/infrastructure errors.
///
/// **Not retriable (hard stop):**
/// - [`LlmError::ApiKey`]: the credential is wrong; retrying won't fix it.
/// - [`LlmError::RateLimited`]: surfaced to the caller rather than
///   hammered; the caller decides when to try again.
/// - [`LlmError::Deserialize`] / [`LlmError::EmptyCompletion`]: malformed
///   response; retrying won't fix it.
/// - [`LlmError::Api`]: application-level error.
pub(crate) fn is_retriable(err: &LlmError) -> bool {
    match err {
        LlmError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        LlmError::Server { .. } => true,
        LlmError::ApiKey(_)
        | LlmError::RateLimited(_)
        | LlmError::Api(_)
        | LlmError::EmptyCompletion
        | LlmError::Deserialize { .. } => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// The delay before attempt *n* is `backoff_base_ms × 2^(n−1)`, capped at
/// 60s. With the default base of 1000ms the schedule is 1s, 2s, 4s.
/// Non-retriable errors are returned immediately.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, LlmError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LlmError>>,
{
    const MAX_DELAY_MS: u64 = 60_000;
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let delay_ms = backoff_base_ms
                    .saturating_mul(1u64 << (attempt - 1).min(10))
                    .min(MAX_DELAY_MS);
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "completion API transient error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
