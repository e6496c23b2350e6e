// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

/// An error raised when a retry policy is configured with values it cannot honor.
///
/// Deciding whether to retry never fails; only construction does.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum RetryConfigError {
    /// The maximum backoff is smaller than the minimal backoff.
    #[error("maximum backoff {max:?} is smaller than minimal backoff {min:?}")]
    BackoffRange {
        /// The configured minimal backoff.
        min: Duration,
        /// The configured maximum backoff.
        max: Duration,
    },
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assert_types() {
        static_assertions::assert_impl_all!(RetryConfigError: Send, Sync, std::error::Error);
    }

    #[test]
    fn backoff_range_message() {
        let error = RetryConfigError::BackoffRange {
            min: Duration::from_secs(10),
            max: Duration::from_secs(5),
        };

        assert_eq!(error.to_string(), "maximum backoff 5s is smaller than minimal backoff 10s");
    }
}
