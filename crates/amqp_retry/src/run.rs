// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use tokio::time::Instant;

use crate::{RetryPolicy, Retryable};

/// Runs `operation` until it succeeds or `policy` refuses another attempt.
///
/// Every call starts a new operation chain: the policy is reset first, and `operation` receives
/// the zero-based attempt index. After every failure the policy counts a retry and is asked for
/// the next interval, given the time left until `timeout` elapses. When it grants one, the loop
/// sleeps for that interval and tries again; otherwise the last error is returned.
///
/// The count is incremented before each interval request, so a policy with a retry ceiling of
/// `N` runs `operation` at most `N` times: the first attempt plus `N - 1` retries.
///
/// Sleeping uses [`tokio::time`], so paused test clocks advance through the backoff.
///
/// # Errors
///
/// Returns the error of the last attempt once the policy denies a retry, either because the
/// error is permanent, the retry ceiling is reached, or the next interval would not fit into
/// the remaining time.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
///
/// use amqp_retry::{AmqpError, RetryPolicy, retry_with_policy};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let mut policy = RetryPolicy::default_retry();
///
/// let value = retry_with_policy(&mut policy, Duration::from_secs(60), |attempt| async move {
///     if attempt == 0 {
///         Err(AmqpError::transient("connection dropped"))
///     } else {
///         Ok(attempt)
///     }
/// })
/// .await;
///
/// assert_eq!(value.unwrap(), 1);
/// # }
/// ```
#[cfg_attr(test, mutants::skip)] // mutating the loop exit causes test timeouts
pub async fn retry_with_policy<T, E, F, Fut>(policy: &mut RetryPolicy, timeout: Duration, mut operation: F) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable,
{
    let deadline = Instant::now().checked_add(timeout);
    policy.reset();

    loop {
        let attempt = policy.retry_count();

        let error = match operation(attempt).await {
            Ok(value) => {
                policy.reset();
                return Ok(value);
            }
            Err(error) => error,
        };

        policy.increment_retry_count();

        let remaining = deadline.map_or(Duration::MAX, |deadline| deadline.saturating_duration_since(Instant::now()));
        let Some(delay) = policy.next_retry_interval_for(&error, remaining) else {
            return Err(error);
        };

        emit_retry(&error, attempt, delay);
        tokio::time::sleep(delay).await;
    }
}

#[cfg_attr(
    not(any(feature = "logs", test)),
    expect(unused_variables, reason = "unused when logs feature not used")
)]
fn emit_retry(error: &impl Retryable, attempt: u32, delay: Duration) {
    #[cfg(any(feature = "logs", test))]
    {
        let context = error.context().map(ToString::to_string).unwrap_or_default();

        tracing::event!(
            name: "amqp_retry.retry",
            tracing::Level::WARN,
            retry.attempt = attempt,
            retry.delay = delay.as_secs_f32(),
            error.condition = error.condition().map_or("none", crate::ErrorCondition::symbol),
            error.context = %context,
        );
    }
}
