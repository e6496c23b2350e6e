// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use crate::constants::SERVER_BUSY_BASE_WAIT;
use crate::{ErrorCondition, ExponentialRetry, Retryable};

/// Decides whether, and after how long, a failed AMQP operation should be retried.
///
/// A policy owns the retry counter of one operation chain, such as the attempts to open one
/// link. The caller drives it:
///
/// 1. After a failed attempt, call [`increment_retry_count`][Self::increment_retry_count].
/// 2. Ask [`next_retry_interval_for`][Self::next_retry_interval_for] (or
///    [`next_retry_interval`][Self::next_retry_interval]) how long to wait, passing the time
///    left until the operation deadline.
/// 3. On `Some(delay)`, sleep for `delay` and try again. On `None`, give up and surface the
///    last failure.
/// 4. When the chain succeeds and the policy is reused, call [`reset`][Self::reset].
///
/// Because the count is incremented before each interval request, a retry ceiling of `N`
/// grants at most `N - 1` retries after the first failure: once the count reaches `N`, no
/// interval is granted.
///
/// The policy never sleeps, performs no I/O, and has no clock of its own; the remaining time
/// budget passed on every call is the only notion of time it has.
///
/// # Thread Safety
///
/// Mutating methods take `&mut self`, so a policy is driven by one task at a time. Concurrent
/// operation chains each need their own policy: [`Clone`] a configured policy, or call
/// [`default_retry`][Self::default_retry] again, instead of sharing one.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
///
/// use amqp_retry::{AmqpError, ErrorCondition, RetryPolicy};
///
/// let mut policy = RetryPolicy::default_retry();
/// let error = AmqpError::new(ErrorCondition::Timeout, "link attach timed out");
///
/// assert_eq!(policy.increment_retry_count(), 0);
/// let delay = policy.next_retry_interval_for(&error, Duration::from_secs(60));
/// assert!(delay.is_some());
///
/// let denied = AmqpError::new(ErrorCondition::UnauthorizedAccess, "token expired");
/// assert_eq!(policy.next_retry_interval_for(&denied, Duration::from_secs(60)), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RetryPolicy {
    /// Retries are disabled: no interval is ever granted and no retries are counted.
    NoRetry,

    /// Exponential backoff with jitter.
    Exponential(ExponentialRetry),
}

impl RetryPolicy {
    /// Returns a new exponential policy configured with the production defaults.
    ///
    /// See [`DEFAULT_MIN_BACKOFF`][crate::DEFAULT_MIN_BACKOFF],
    /// [`DEFAULT_MAX_BACKOFF`][crate::DEFAULT_MAX_BACKOFF], and
    /// [`DEFAULT_MAX_RETRY_COUNT`][crate::DEFAULT_MAX_RETRY_COUNT]. Every call returns a fresh,
    /// independent instance.
    #[must_use]
    pub fn default_retry() -> Self {
        Self::Exponential(ExponentialRetry::default())
    }

    /// Returns a policy that never retries.
    #[must_use]
    pub fn no_retry() -> Self {
        Self::NoRetry
    }

    /// Counts one more retry and returns the count before the increment.
    ///
    /// The first call on a fresh policy returns `0`, which callers use to recognize the first
    /// failure of a chain. [`RetryPolicy::NoRetry`] always returns `0` and counts nothing.
    pub fn increment_retry_count(&mut self) -> u32 {
        match self {
            Self::NoRetry => 0,
            Self::Exponential(retry) => retry.increment_retry_count(),
        }
    }

    /// Returns the number of retries counted so far.
    #[must_use]
    pub fn retry_count(&self) -> u32 {
        match self {
            Self::NoRetry => 0,
            Self::Exponential(retry) => retry.retry_count(),
        }
    }

    /// Returns the retry ceiling.
    #[must_use]
    pub fn max_retry_count(&self) -> u32 {
        match self {
            Self::NoRetry => 0,
            Self::Exponential(retry) => retry.max_retry_count(),
        }
    }

    /// Sets the retry count back to zero so the policy can serve a new operation chain.
    ///
    /// The configuration is left untouched.
    pub fn reset(&mut self) {
        match self {
            Self::NoRetry => {}
            Self::Exponential(retry) => retry.reset(),
        }
    }

    /// Computes how long to wait before the next attempt.
    ///
    /// `base_wait` is added to the computed backoff before clamping. Returns `None` when
    /// retries are disabled, when the retry ceiling has been reached, or when the interval
    /// would not fit into `remaining`. The retry count is not changed.
    #[must_use]
    pub fn next_retry_interval(&self, base_wait: Duration, remaining: Duration) -> Option<Duration> {
        match self {
            Self::NoRetry => None,
            Self::Exponential(retry) => retry.next_retry_interval(base_wait, remaining),
        }
    }

    /// Computes how long to wait before retrying after `error`.
    ///
    /// Permanent failures are never retried, regardless of the remaining attempts or time.
    /// Failures reporting [`ErrorCondition::ServerBusy`] wait an extra
    /// [`SERVER_BUSY_BASE_WAIT`][crate::SERVER_BUSY_BASE_WAIT]. Otherwise this behaves like
    /// [`next_retry_interval`][Self::next_retry_interval] with no base wait.
    #[must_use]
    pub fn next_retry_interval_for(&self, error: &impl Retryable, remaining: Duration) -> Option<Duration> {
        if !error.is_transient() {
            emit_permanent(error, self.retry_count());
            return None;
        }

        let base_wait = match error.condition() {
            Some(ErrorCondition::ServerBusy) => SERVER_BUSY_BASE_WAIT,
            _ => Duration::ZERO,
        };

        self.next_retry_interval(base_wait, remaining)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::default_retry()
    }
}

impl From<ExponentialRetry> for RetryPolicy {
    fn from(retry: ExponentialRetry) -> Self {
        Self::Exponential(retry)
    }
}

#[cfg_attr(
    not(any(feature = "logs", test)),
    expect(unused_variables, reason = "unused when logs feature not used")
)]
fn emit_permanent(error: &impl Retryable, retry_count: u32) {
    #[cfg(any(feature = "logs", test))]
    {
        let condition = error.condition().map_or("none", ErrorCondition::symbol);
        let context = error.context().map(ToString::to_string).unwrap_or_default();

        tracing::event!(
            name: "amqp_retry.retry_denied",
            tracing::Level::DEBUG,
            reason = "permanent_error",
            retry.count = retry_count,
            error.condition = condition,
            error.context = %context,
        );
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rstest::rstest;
    use static_assertions::assert_impl_all;

    use super::*;
    use crate::rnd::Rnd;
    use crate::testing::LogCapture;
    use crate::{AmqpError, DEFAULT_MAX_RETRY_COUNT, ErrorContext};

    assert_impl_all!(RetryPolicy: Send, Sync, Clone, Default, Eq, std::hash::Hash, std::fmt::Debug);

    const SIXTY_SECONDS: Duration = Duration::from_secs(60);

    fn exponential(min_secs: u64, max_secs: u64, max_retry_count: u32) -> RetryPolicy {
        ExponentialRetry::new(Duration::from_secs(min_secs), Duration::from_secs(max_secs), max_retry_count)
            .unwrap()
            .into()
    }

    fn fixed_jitter(min_secs: u64, max_secs: u64, max_retry_count: u32) -> RetryPolicy {
        ExponentialRetry::new(Duration::from_secs(min_secs), Duration::from_secs(max_secs), max_retry_count)
            .unwrap()
            .with_rnd(Rnd::new_fixed(0.5))
            .into()
    }

    #[test]
    fn no_retry_never_grants_wait() {
        let mut policy = RetryPolicy::no_retry();

        for _ in 0..5 {
            assert_eq!(policy.increment_retry_count(), 0);
        }

        assert_eq!(policy.retry_count(), 0);
        assert_eq!(policy.max_retry_count(), 0);
        assert_eq!(policy.next_retry_interval(Duration::ZERO, Duration::MAX), None);
        assert_eq!(
            policy.next_retry_interval_for(&AmqpError::transient("dropped"), Duration::MAX),
            None
        );

        policy.reset();
        assert_eq!(policy, RetryPolicy::NoRetry);
    }

    #[test]
    fn default_increments_and_resets() {
        let mut policy = RetryPolicy::default_retry();

        assert_eq!(policy.increment_retry_count(), 0);
        assert_eq!(policy.increment_retry_count(), 1);
        assert_eq!(policy.increment_retry_count(), 2);
        assert_eq!(policy.retry_count(), 3);

        policy.reset();
        assert_eq!(policy.retry_count(), 0);
        assert_eq!(policy.increment_retry_count(), 0);
        assert_eq!(policy.max_retry_count(), DEFAULT_MAX_RETRY_COUNT);
    }

    #[test]
    fn default_ceiling_denies_retry() {
        let mut policy = RetryPolicy::default_retry();

        for _ in 0..policy.max_retry_count() {
            policy.increment_retry_count();
        }

        assert_eq!(policy.retry_count(), DEFAULT_MAX_RETRY_COUNT);
        assert_eq!(policy.next_retry_interval(Duration::ZERO, SIXTY_SECONDS), None);
        assert_eq!(
            policy.next_retry_interval_for(&AmqpError::new(ErrorCondition::Timeout, "slow"), SIXTY_SECONDS),
            None
        );
    }

    #[test]
    fn factories_return_independent_instances() {
        let mut first = RetryPolicy::default_retry();
        let second = RetryPolicy::default_retry();

        first.increment_retry_count();

        assert_eq!(second.retry_count(), 0);
        assert_ne!(first, second);
        assert_eq!(RetryPolicy::default(), second);
    }

    #[rstest]
    #[case(ErrorCondition::UnauthorizedAccess)]
    #[case(ErrorCondition::NotFound)]
    #[case(ErrorCondition::ArgumentError)]
    #[case(ErrorCondition::LinkStolen)]
    fn permanent_condition_short_circuits(#[case] condition: ErrorCondition) {
        let policy = exponential(0, 30, 10);
        let error = AmqpError::new(condition, "rejected");

        assert_eq!(policy.retry_count(), 0);
        assert_eq!(policy.next_retry_interval_for(&error, Duration::MAX), None);
    }

    #[test]
    fn classification_override_is_respected() {
        let policy = fixed_jitter(15, 45, 4);

        let permanent_timeout = AmqpError::new(ErrorCondition::Timeout, "slow").retryable(false);
        assert_eq!(policy.next_retry_interval_for(&permanent_timeout, SIXTY_SECONDS), None);

        let transient_not_found = AmqpError::new(ErrorCondition::NotFound, "creating").retryable(true);
        assert!(policy.next_retry_interval_for(&transient_not_found, SIXTY_SECONDS).is_some());
    }

    #[test]
    fn server_busy_adds_base_wait() {
        let mut policy = fixed_jitter(15, 45, 4);
        policy.increment_retry_count();

        let timeout = AmqpError::new(ErrorCondition::Timeout, "slow");
        let busy = AmqpError::new(ErrorCondition::ServerBusy, "throttled");

        // 15s + 30s * 2^(1 - 4), centered jitter
        assert_eq!(
            policy.next_retry_interval_for(&timeout, SIXTY_SECONDS),
            Some(Duration::from_millis(18_750))
        );
        assert_eq!(
            policy.next_retry_interval_for(&busy, SIXTY_SECONDS),
            Some(Duration::from_millis(18_750) + SERVER_BUSY_BASE_WAIT)
        );
    }

    #[test]
    fn clone_equal_at_creation() {
        let mut policy = exponential(15, 45, 4);
        policy.increment_retry_count();

        let clone = policy.clone();

        assert_eq!(clone, policy);
        assert_eq!(clone.retry_count(), policy.retry_count());
        assert_eq!(clone.max_retry_count(), policy.max_retry_count());

        let set: HashSet<_> = [policy, clone].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn clone_diverges_independently() {
        let error = AmqpError::new(ErrorCondition::Timeout, "slow");
        let mut policy = exponential(15, 45, 5);
        policy.increment_retry_count();

        let mut clone = policy.clone();

        policy.increment_retry_count();
        clone.increment_retry_count();
        clone.increment_retry_count();
        clone.increment_retry_count();

        let interval = policy.next_retry_interval_for(&error, SIXTY_SECONDS).unwrap();
        let clone_interval = clone.next_retry_interval_for(&error, SIXTY_SECONDS).unwrap();

        assert_eq!(policy.retry_count(), 2);
        assert_eq!(clone.retry_count(), 4);
        assert_ne!(policy, clone);
        assert!(clone_interval > interval, "{clone_interval:?} <= {interval:?}");
    }

    #[test]
    fn permanent_denial_is_logged_with_context() {
        let capture = LogCapture::new();
        let _guard = tracing::subscriber::set_default(capture.subscriber());

        let policy = exponential(0, 30, 10);
        let error = AmqpError::new(ErrorCondition::UnauthorizedAccess, "token expired")
            .with_context(ErrorContext::new("contoso.servicebus.windows.net").entity_path("orders"));

        assert_eq!(policy.next_retry_interval_for(&error, SIXTY_SECONDS), None);

        capture.assert_contains("permanent_error");
        capture.assert_contains("amqp:unauthorized-access");
        capture.assert_field("error.context", "contoso.servicebus.windows.net/orders");
    }

    #[test]
    fn exhausted_and_deadline_denials_are_logged() {
        let capture = LogCapture::new();
        let _guard = tracing::subscriber::set_default(capture.subscriber());

        let mut policy = fixed_jitter(15, 45, 1);
        assert_eq!(policy.next_retry_interval(Duration::ZERO, Duration::from_secs(1)), None);
        capture.assert_contains("deadline");

        policy.increment_retry_count();
        assert_eq!(policy.next_retry_interval(Duration::ZERO, SIXTY_SECONDS), None);
        capture.assert_contains("retries_exhausted");
    }
}
