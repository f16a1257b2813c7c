//! Bounded retry with differentiated backoff.
//!
//! Every gateway call goes through [`execute_with_retry`]. The AI backend
//! fails in two very different ways: a saturated model ("503" / "overloaded"
//! in the error text) recovers on a longer horizon than a generic transport
//! hiccup, so overload-class failures wait twice as long between attempts.
//! Failures classified as [`FailureClass::Fatal`] (bad credentials, unusable
//! payloads) are returned immediately without burning the retry budget.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// How a failed attempt is treated by [`execute_with_retry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Backend saturated. Wait `base_delay * attempt * 2` before retrying.
    Overload,
    /// Generic transport/status failure. Wait `base_delay * attempt`.
    Transient,
    /// Repeating the call cannot help. Returned to the caller unchanged.
    Fatal,
}

/// Retry budget for a single call. Immutable, passed per call.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// At least one attempt is always made, whatever the caller asks for.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }
}

/// Case-insensitive overload sniffing on an error's display message.
pub fn is_overload_message(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    message.contains("503") || message.contains("overloaded")
}

/// Runs `operation` up to `policy.max_attempts` times (attempts are
/// 1-indexed in the backoff schedule).
///
/// Always resolves to a value or an error, never silently drops a request.
/// If the final failing attempt was overload-class, the raw error is replaced
/// by `overload_exhausted()` so callers surface a "try again later" message
/// instead of the backend's status text; any other final failure is the
/// operation's own error, unchanged.
pub async fn execute_with_retry<T, E, Op, Fut, Classify, Exhausted>(
    mut operation: Op,
    policy: RetryPolicy,
    classify: Classify,
    overload_exhausted: Exhausted,
) -> Result<T, E>
where
    E: std::fmt::Display,
    Op: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    Classify: Fn(&E) -> FailureClass,
    Exhausted: FnOnce() -> E,
{
    let mut attempt: u32 = 1;
    loop {
        let error = match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        let class = classify(&error);
        if class == FailureClass::Fatal {
            return Err(error);
        }

        if attempt >= policy.max_attempts {
            return Err(match class {
                FailureClass::Overload => overload_exhausted(),
                _ => error,
            });
        }

        let factor = if class == FailureClass::Overload { 2 } else { 1 };
        let delay = policy.base_delay * attempt * factor;
        warn!(
            attempt,
            max_attempts = policy.max_attempts,
            delay_ms = delay.as_millis() as u64,
            "attempt failed ({error}), retrying"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
