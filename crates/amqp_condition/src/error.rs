// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::borrow::Cow;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

use crate::{ErrorCondition, ErrorContext, Retryable};

/// Returned when parsing an [`ErrorCondition`] from a symbol this crate does not know about.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown AMQP error condition '{symbol}'")]
pub struct UnknownConditionError {
    symbol: String,
}

impl UnknownConditionError {
    pub(crate) fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_owned(),
        }
    }

    /// Returns the symbol that failed to parse.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }
}

/// A failure raised by an AMQP operation.
///
/// The error carries everything a retry policy needs to decide whether another attempt is
/// worthwhile: the [`ErrorCondition`] reported by the peer (if any), whether the failure is
/// transient, and an [`ErrorContext`] for diagnostics.
///
/// By default, the transient flag follows [`ErrorCondition::is_transient`]. Failures without
/// a condition are permanent unless created with [`AmqpError::transient`] or
/// [`AmqpError::retryable`] overrides the classification.
///
/// # Examples
///
/// ```rust
/// use amqp_condition::{AmqpError, ErrorCondition, ErrorContext, Retryable};
///
/// let error = AmqpError::new(ErrorCondition::ServerBusy, "namespace is throttled")
///     .with_context(ErrorContext::new("contoso.servicebus.windows.net").entity_path("orders"));
///
/// assert!(error.is_transient());
/// assert_eq!(
///     error.to_string(),
///     "namespace is throttled, condition: com.microsoft:server-busy, context: contoso.servicebus.windows.net/orders"
/// );
/// ```
pub struct AmqpError {
    message: Cow<'static, str>,
    condition: Option<ErrorCondition>,
    transient: bool,
    context: Option<ErrorContext>,
    source: Option<Box<dyn Error + Send + Sync + 'static>>,
}

impl AmqpError {
    /// Creates an error for a condition reported by the peer.
    #[must_use]
    pub fn new(condition: ErrorCondition, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
            condition: Some(condition),
            transient: condition.is_transient(),
            context: None,
            source: None,
        }
    }

    /// Creates a transient error that has no associated condition, such as a dropped socket.
    #[must_use]
    pub fn transient(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
            condition: None,
            transient: true,
            context: None,
            source: None,
        }
    }

    /// Creates a permanent error that has no associated condition.
    #[must_use]
    pub fn permanent(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
            condition: None,
            transient: false,
            context: None,
            source: None,
        }
    }

    /// Overrides the transient classification.
    #[must_use]
    pub fn retryable(self, transient: bool) -> Self {
        Self { transient, ..self }
    }

    /// Attaches diagnostic context.
    #[must_use]
    pub fn with_context(self, context: ErrorContext) -> Self {
        Self {
            context: Some(context),
            ..self
        }
    }

    /// Attaches the underlying cause.
    #[must_use]
    pub fn caused_by(self, source: impl Error + Send + Sync + 'static) -> Self {
        Self {
            source: Some(Box::new(source)),
            ..self
        }
    }

    /// Returns the message describing the failure.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Retryable for AmqpError {
    fn is_transient(&self) -> bool {
        self.transient
    }

    fn condition(&self) -> Option<ErrorCondition> {
        self.condition
    }

    fn context(&self) -> Option<&ErrorContext> {
        self.context.as_ref()
    }
}

impl Display for AmqpError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)?;

        if let Some(condition) = self.condition {
            write!(f, ", condition: {condition}")?;
        }

        if let Some(context) = &self.context {
            write!(f, ", context: {context}")?;
        }

        Ok(())
    }
}

impl Debug for AmqpError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AmqpError")
            .field("message", &self.message)
            .field("condition", &self.condition)
            .field("transient", &self.transient)
            .field("context", &self.context)
            .field("source", &self.source)
            .finish()
    }
}

impl Error for AmqpError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_deref().map(|source| source as &(dyn Error + 'static))
    }
}
