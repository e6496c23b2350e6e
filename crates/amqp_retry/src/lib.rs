// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(
    not(feature = "tokio"),
    expect(
        rustdoc::broken_intra_doc_links,
        reason = "retry_with_policy only exists with the tokio feature"
    )
)]

//! Retry and backoff decisions for AMQP links, sessions, and connections.
//!
//! When an AMQP operation fails, the client has to decide whether to try again and how long to
//! wait first. This crate makes that decision: it counts retries, grows the wait exponentially
//! with jitter, refuses to retry failures that are permanent, and never grants a wait that would
//! overrun the caller's deadline.
//!
//! The policy performs no I/O and never sleeps; the caller owns the clock and passes the
//! remaining time budget with each question. The optional [`retry_with_policy`] helper wires a
//! policy to the `tokio` timer for the common case.
//!
//! # Core Types
//!
//! - [`RetryPolicy`]: The policy contract, either [`RetryPolicy::NoRetry`] or exponential.
//! - [`ExponentialRetry`]: Exponential backoff with jitter and a retry ceiling.
//! - [`RetryOptions`]: Loadable configuration that builds a [`RetryPolicy`].
//! - [`Retryable`]: Implemented by failures so the policy can tell transient from permanent.
//!
//! # Examples
//!
//! ```rust
//! use std::time::Duration;
//!
//! use amqp_retry::{AmqpError, ErrorCondition, RetryPolicy};
//!
//! let mut policy = RetryPolicy::default_retry();
//! let mut remaining = Duration::from_secs(60);
//!
//! let error = AmqpError::new(ErrorCondition::ServerBusy, "namespace is throttled");
//!
//! policy.increment_retry_count();
//! if let Some(delay) = policy.next_retry_interval_for(&error, remaining) {
//!     // sleep for `delay`, then try again
//!     remaining -= delay;
//! }
//! ```
//!
//! # Features
//!
//! - `logs`: Emits `tracing` events when a retry is granted or denied.
//! - `serde`: Implements `Serialize` and `Deserialize` for [`RetryOptions`].
//! - `tokio`: Enables [`retry_with_policy`], a retry loop driven by the `tokio` timer.

#[doc(inline)]
pub use amqp_condition::{AmqpError, ErrorCondition, ErrorContext, Retryable, UnknownConditionError};

mod backoff;
mod constants;
mod error;
mod exponential;
mod options;
mod policy;
mod rnd;

pub use constants::{DEFAULT_MAX_BACKOFF, DEFAULT_MAX_RETRY_COUNT, DEFAULT_MIN_BACKOFF, SERVER_BUSY_BASE_WAIT};
pub use error::RetryConfigError;
pub use exponential::ExponentialRetry;
pub use options::{RetryMode, RetryOptions};
pub use policy::RetryPolicy;

#[cfg(any(feature = "tokio", test))]
mod run;

#[cfg(any(feature = "tokio", test))]
#[cfg_attr(docsrs, doc(cfg(feature = "tokio")))]
pub use run::retry_with_policy;

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
pub(crate) mod testing;
