// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! AMQP error conditions and transient-failure classification.
//!
//! # Why
//!
//! A retry policy must not decide on its own whether a failure is worth retrying. That
//! knowledge belongs to whoever observed the failure: the AMQP link, session, or connection
//! that received a `detach` or `close` frame with an error condition. This crate provides the
//! vocabulary for that hand-off.
//!
//! # Core Types
//!
//! - [`ErrorCondition`]: The AMQP and service-specific conditions a peer can report, with their
//!   default transient/permanent classification.
//! - [`ErrorContext`]: The namespace and entity a failure belongs to, for diagnostics.
//! - [`Retryable`]: A trait for failures that can tell whether retrying might help.
//! - [`AmqpError`]: A ready-made failure type implementing [`Retryable`].
//!
//! # Examples
//!
//! ```rust
//! use amqp_condition::{ErrorCondition, ErrorContext, Retryable};
//!
//! #[derive(Debug)]
//! enum ReceiveError {
//!     Detached(ErrorCondition),
//!     InvalidSettlement,
//! }
//!
//! impl Retryable for ReceiveError {
//!     fn is_transient(&self) -> bool {
//!         match self {
//!             Self::Detached(condition) => condition.is_transient(),
//!             Self::InvalidSettlement => false,
//!         }
//!     }
//!
//!     fn condition(&self) -> Option<ErrorCondition> {
//!         match self {
//!             Self::Detached(condition) => Some(*condition),
//!             Self::InvalidSettlement => None,
//!         }
//!     }
//! }
//!
//! let error = ReceiveError::Detached(ErrorCondition::LinkDetachForced);
//! assert!(error.is_transient());
//! assert!(!ReceiveError::InvalidSettlement.is_transient());
//! ```

// Naming Convention for Get/Set:
//
// Builder-style setters use plain names (e.g., `entity_path()`) and the matching getters use
// the `get_` prefix (e.g., `get_entity_path()`), since setters are used far more often.

mod condition;
mod context;
mod error;

pub use condition::ErrorCondition;
pub use context::ErrorContext;
pub use error::{AmqpError, UnknownConditionError};

/// Enables failures to report whether retrying the failed operation might succeed.
///
/// The retry policy consults this trait before computing any backoff: when
/// [`is_transient`][Retryable::is_transient] returns `false`, no retry is granted regardless
/// of the remaining attempts or time budget.
///
/// # Examples
///
/// ```rust
/// use amqp_condition::Retryable;
///
/// struct Throttled;
///
/// impl Retryable for Throttled {
///     fn is_transient(&self) -> bool {
///         true
///     }
/// }
///
/// assert!(Throttled.is_transient());
/// assert_eq!(Throttled.condition(), None);
/// ```
pub trait Retryable {
    /// Returns `true` when the failure is expected to go away if the operation is retried.
    fn is_transient(&self) -> bool;

    /// Returns the error condition reported by the peer, if any.
    ///
    /// Some conditions adjust the wait before the next attempt; for example, a server-busy
    /// condition asks the client to back off for longer.
    fn condition(&self) -> Option<ErrorCondition> {
        None
    }

    /// Returns the diagnostic context of the failure, if any.
    fn context(&self) -> Option<&ErrorContext> {
        None
    }
}

impl<T: Retryable + ?Sized> Retryable for &T {
    fn is_transient(&self) -> bool {
        (**self).is_transient()
    }

    fn condition(&self) -> Option<ErrorCondition> {
        (**self).condition()
    }

    fn context(&self) -> Option<&ErrorContext> {
        (**self).context()
    }
}

impl<T: Retryable + ?Sized> Retryable for Box<T> {
    fn is_transient(&self) -> bool {
        (**self).is_transient()
    }

    fn condition(&self) -> Option<ErrorCondition> {
        (**self).condition()
    }

    fn context(&self) -> Option<&ErrorContext> {
        (**self).context()
    }
}
