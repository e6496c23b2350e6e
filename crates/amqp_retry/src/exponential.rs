// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::hash::{Hash, Hasher};
use std::time::Duration;

use crate::RetryConfigError;
use crate::backoff::BackoffRange;
use crate::constants::{DEFAULT_MAX_BACKOFF, DEFAULT_MAX_RETRY_COUNT, DEFAULT_MIN_BACKOFF};
use crate::rnd::Rnd;

/// Exponential backoff with jitter, bounded by a minimal and a maximum backoff.
///
/// Each interval is the minimal backoff plus a growth term that doubles with every attempt and
/// reaches the full `max - min` span at the retry ceiling. The growth term is jittered by ±25%
/// so that many clients failing at once do not retry in lockstep, and the result is clamped to
/// `[min_backoff, max_backoff]`.
///
/// The policy keeps a retry counter for a single operation chain. Use [`Clone`] to obtain an
/// independent policy for another chain. Equality and hashing consider the configuration and
/// the current retry count; the jitter source is ignored.
///
/// Most callers use this type through [`RetryPolicy`][crate::RetryPolicy].
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
///
/// use amqp_retry::ExponentialRetry;
///
/// let mut retry = ExponentialRetry::new(Duration::from_secs(15), Duration::from_secs(45), 4)?;
///
/// retry.increment_retry_count();
/// let first = retry.next_retry_interval(Duration::ZERO, Duration::from_secs(60)).unwrap();
///
/// retry.increment_retry_count();
/// let second = retry.next_retry_interval(Duration::ZERO, Duration::from_secs(60) - first).unwrap();
///
/// assert!(second > first);
/// # Ok::<(), amqp_retry::RetryConfigError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ExponentialRetry {
    range: BackoffRange,
    max_retry_count: u32,
    retry_count: u32,
    rnd: Rnd,
}

impl ExponentialRetry {
    /// Creates a policy with the given bounds and retry ceiling.
    ///
    /// # Errors
    ///
    /// Returns [`RetryConfigError::BackoffRange`] when `max_backoff` is smaller than
    /// `min_backoff`.
    pub fn new(min_backoff: Duration, max_backoff: Duration, max_retry_count: u32) -> Result<Self, RetryConfigError> {
        if max_backoff < min_backoff {
            return Err(RetryConfigError::BackoffRange {
                min: min_backoff,
                max: max_backoff,
            });
        }

        Ok(Self {
            range: BackoffRange {
                min: min_backoff,
                max: max_backoff,
            },
            max_retry_count,
            retry_count: 0,
            rnd: Rnd::default(),
        })
    }

    /// Makes the jitter deterministic.
    ///
    /// With a seed, the interval for a given retry count is always the same, which keeps
    /// tests and reproductions stable. Policies with the same seed and configuration produce
    /// identical interval sequences.
    #[must_use]
    pub fn with_jitter_seed(self, seed: u64) -> Self {
        Self {
            rnd: Rnd::Seeded(seed),
            ..self
        }
    }

    #[cfg(test)]
    pub(crate) fn with_rnd(self, rnd: Rnd) -> Self {
        Self { rnd, ..self }
    }

    /// Returns the floor applied to every interval.
    #[must_use]
    pub fn min_backoff(&self) -> Duration {
        self.range.min
    }

    /// Returns the cap applied to every interval.
    #[must_use]
    pub fn max_backoff(&self) -> Duration {
        self.range.max
    }

    /// Returns the retry ceiling.
    #[must_use]
    pub fn max_retry_count(&self) -> u32 {
        self.max_retry_count
    }

    /// Returns the number of retries counted so far.
    #[must_use]
    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Counts one more retry and returns the count before the increment.
    pub fn increment_retry_count(&mut self) -> u32 {
        let previous = self.retry_count;
        self.retry_count = previous.saturating_add(1);
        previous
    }

    /// Sets the retry count back to zero, keeping the configuration.
    pub fn reset(&mut self) {
        self.retry_count = 0;
    }

    /// Computes how long to wait before the next attempt.
    ///
    /// Returns `None` when the retry ceiling has been reached or when the interval would not
    /// fit into `remaining`. Calling this method does not change the retry count.
    #[must_use]
    pub fn next_retry_interval(&self, base_wait: Duration, remaining: Duration) -> Option<Duration> {
        if self.retry_count >= self.max_retry_count {
            self.emit_denied("retries_exhausted", remaining);
            return None;
        }

        let interval = self.range.interval(base_wait, self.retry_count, self.max_retry_count, &self.rnd);

        if interval > remaining {
            self.emit_denied("deadline", remaining);
            return None;
        }

        Some(interval)
    }

    #[cfg_attr(
        not(any(feature = "logs", test)),
        expect(unused_variables, clippy::unused_self, reason = "unused when logs feature not used")
    )]
    fn emit_denied(&self, reason: &'static str, remaining: Duration) {
        #[cfg(any(feature = "logs", test))]
        tracing::event!(
            name: "amqp_retry.retry_denied",
            tracing::Level::DEBUG,
            reason,
            retry.count = self.retry_count,
            retry.max_count = self.max_retry_count,
            retry.remaining = remaining.as_secs_f32(),
        );
    }
}

impl Default for ExponentialRetry {
    fn default() -> Self {
        Self {
            range: BackoffRange {
                min: DEFAULT_MIN_BACKOFF,
                max: DEFAULT_MAX_BACKOFF,
            },
            max_retry_count: DEFAULT_MAX_RETRY_COUNT,
            retry_count: 0,
            rnd: Rnd::default(),
        }
    }
}

impl PartialEq for ExponentialRetry {
    fn eq(&self, other: &Self) -> bool {
        self.range == other.range && self.max_retry_count == other.max_retry_count && self.retry_count == other.retry_count
    }
}

impl Eq for ExponentialRetry {}

impl Hash for ExponentialRetry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.range.hash(state);
        self.max_retry_count.hash(state);
        self.retry_count.hash(state);
    }
}
