// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::borrow::Cow;
use std::fmt::{Display, Formatter};

/// Identifies where a failure happened: the service namespace and, when known, the entity
/// (queue, topic, event hub, or partition path) the operation targeted.
///
/// The context is diagnostic only. It does not influence whether a failure is retried.
///
/// # Examples
///
/// ```rust
/// use amqp_condition::ErrorContext;
///
/// let context = ErrorContext::new("contoso.servicebus.windows.net").entity_path("orders");
/// assert_eq!(context.to_string(), "contoso.servicebus.windows.net/orders");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ErrorContext {
    namespace: Cow<'static, str>,
    entity_path: Option<Cow<'static, str>>,
}

impl ErrorContext {
    /// Creates a context for the given namespace.
    #[must_use]
    pub fn new(namespace: impl Into<Cow<'static, str>>) -> Self {
        Self {
            namespace: namespace.into(),
            entity_path: None,
        }
    }

    /// Sets the entity path within the namespace.
    #[must_use]
    pub fn entity_path(self, entity_path: impl Into<Cow<'static, str>>) -> Self {
        Self {
            entity_path: Some(entity_path.into()),
            ..self
        }
    }

    /// Returns the namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the entity path, if one was set.
    #[must_use]
    pub fn get_entity_path(&self) -> Option<&str> {
        self.entity_path.as_deref()
    }
}

impl Display for ErrorContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.entity_path {
            Some(entity_path) => write!(f, "{}/{}", self.namespace, entity_path),
            None => f.write_str(&self.namespace),
        }
    }
}
