// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use crate::constants::{DEFAULT_MAX_BACKOFF, DEFAULT_MAX_RETRY_COUNT, DEFAULT_MIN_BACKOFF};
use crate::{ExponentialRetry, RetryConfigError, RetryPolicy};

/// Selects the kind of [`RetryPolicy`] built from [`RetryOptions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[non_exhaustive]
pub enum RetryMode {
    /// Build [`RetryPolicy::NoRetry`].
    NoRetry,

    /// Build [`RetryPolicy::Exponential`].
    #[default]
    Exponential,
}

/// Configuration for a [`RetryPolicy`], suitable for loading from configuration files.
///
/// Defaults match [`RetryPolicy::default_retry`].
///
/// With the `serde` feature, the options can be deserialized. Durations are serialized in the
/// ISO 8601 format of `jiff::SignedDuration` (for example `"PT15S"`); the friendly form
/// (`"15s"`) is accepted on input as well. Every field is optional.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
///
/// use amqp_retry::{RetryOptions, RetryPolicy};
///
/// let policy = RetryOptions::default()
///     .min_backoff(Duration::from_secs(1))
///     .max_backoff(Duration::from_secs(20))
///     .max_retries(5)
///     .build()?;
///
/// assert_eq!(policy.max_retry_count(), 5);
/// # Ok::<(), amqp_retry::RetryConfigError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RetryOptions {
    mode: RetryMode,
    #[cfg_attr(feature = "serde", serde(with = "serde_duration"))]
    min_backoff: Duration,
    #[cfg_attr(feature = "serde", serde(with = "serde_duration"))]
    max_backoff: Duration,
    max_retries: u32,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            mode: RetryMode::default(),
            min_backoff: DEFAULT_MIN_BACKOFF,
            max_backoff: DEFAULT_MAX_BACKOFF,
            max_retries: DEFAULT_MAX_RETRY_COUNT,
        }
    }
}

impl RetryOptions {
    /// Sets the kind of policy to build.
    #[must_use]
    pub fn mode(self, mode: RetryMode) -> Self {
        Self { mode, ..self }
    }

    /// Sets the minimal backoff.
    #[must_use]
    pub fn min_backoff(self, min_backoff: Duration) -> Self {
        Self { min_backoff, ..self }
    }

    /// Sets the maximum backoff.
    #[must_use]
    pub fn max_backoff(self, max_backoff: Duration) -> Self {
        Self { max_backoff, ..self }
    }

    /// Sets the retry ceiling.
    #[must_use]
    pub fn max_retries(self, max_retries: u32) -> Self {
        Self { max_retries, ..self }
    }

    /// Builds a fresh policy from these options.
    ///
    /// # Errors
    ///
    /// Returns [`RetryConfigError::BackoffRange`] when the exponential mode is selected and
    /// the maximum backoff is smaller than the minimal backoff.
    pub fn build(&self) -> Result<RetryPolicy, RetryConfigError> {
        match self.mode {
            RetryMode::NoRetry => Ok(RetryPolicy::no_retry()),
            RetryMode::Exponential => {
                ExponentialRetry::new(self.min_backoff, self.max_backoff, self.max_retries).map(RetryPolicy::Exponential)
            }
        }
    }
}

impl TryFrom<RetryOptions> for RetryPolicy {
    type Error = RetryConfigError;

    fn try_from(options: RetryOptions) -> Result<Self, Self::Error> {
        options.build()
    }
}

#[cfg(feature = "serde")]
mod serde_duration {
    use std::time::Duration;

    use jiff::SignedDuration;
    use serde::de::Error as _;
    use serde::ser::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub(super) fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        SignedDuration::try_from(*value)
            .map_err(S::Error::custom)?
            .serialize(serializer)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let value = SignedDuration::deserialize(deserializer)?;
        Duration::try_from(value).map_err(D::Error::custom)
    }
}
