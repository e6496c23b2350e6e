// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::UnknownConditionError;

/// An error condition reported by an AMQP peer when it closes a link, session, or connection,
/// or when it rejects an operation.
///
/// Each variant maps to a wire symbol, either one of the conditions defined by the AMQP 1.0
/// specification (`amqp:*`) or one of the service-specific conditions (`com.microsoft:*`).
///
/// # Handling Unknown Variants
///
/// This enum is marked `#[non_exhaustive]`. When matching on `ErrorCondition`, include a
/// wildcard arm and treat unrecognized conditions as permanent.
///
/// # Examples
///
/// ```rust
/// use amqp_condition::ErrorCondition;
///
/// let condition: ErrorCondition = "com.microsoft:server-busy".parse().unwrap();
/// assert_eq!(condition, ErrorCondition::ServerBusy);
/// assert!(condition.is_transient());
/// assert_eq!(condition.to_string(), "com.microsoft:server-busy");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorCondition {
    /// An internal error occurred on the peer.
    InternalError,

    /// The requested entity does not exist.
    NotFound,

    /// The client is not authorized to perform the operation.
    UnauthorizedAccess,

    /// The peer exceeded a resource quota.
    ResourceLimitExceeded,

    /// The peer refused to perform the operation.
    NotAllowed,

    /// The peer does not implement the operation.
    NotImplemented,

    /// The peer could not decode a frame or message.
    DecodeError,

    /// The connection was closed by the peer, typically during a service upgrade.
    ConnectionForced,

    /// The peer received a malformed frame on the connection.
    ConnectionFramingError,

    /// The link was detached by the peer, typically during load balancing.
    LinkDetachForced,

    /// Another client attached a link with the same name.
    LinkStolen,

    /// A message exceeded the maximum size accepted by the link.
    LinkMessageSizeExceeded,

    /// The service is throttling requests and asks the client to back off.
    ServerBusy,

    /// The service did not complete the operation in time.
    Timeout,

    /// A request argument was rejected.
    ArgumentError,

    /// A request argument was outside of the accepted range.
    ArgumentOutOfRange,

    /// The entity is disabled.
    EntityDisabled,

    /// The operation was cancelled.
    OperationCancelled,
}

const ALL_CONDITIONS: [ErrorCondition; 18] = [
    ErrorCondition::InternalError,
    ErrorCondition::NotFound,
    ErrorCondition::UnauthorizedAccess,
    ErrorCondition::ResourceLimitExceeded,
    ErrorCondition::NotAllowed,
    ErrorCondition::NotImplemented,
    ErrorCondition::DecodeError,
    ErrorCondition::ConnectionForced,
    ErrorCondition::ConnectionFramingError,
    ErrorCondition::LinkDetachForced,
    ErrorCondition::LinkStolen,
    ErrorCondition::LinkMessageSizeExceeded,
    ErrorCondition::ServerBusy,
    ErrorCondition::Timeout,
    ErrorCondition::ArgumentError,
    ErrorCondition::ArgumentOutOfRange,
    ErrorCondition::EntityDisabled,
    ErrorCondition::OperationCancelled,
];

impl ErrorCondition {
    /// Returns the wire symbol of this condition.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::InternalError => "amqp:internal-error",
            Self::NotFound => "amqp:not-found",
            Self::UnauthorizedAccess => "amqp:unauthorized-access",
            Self::ResourceLimitExceeded => "amqp:resource-limit-exceeded",
            Self::NotAllowed => "amqp:not-allowed",
            Self::NotImplemented => "amqp:not-implemented",
            Self::DecodeError => "amqp:decode-error",
            Self::ConnectionForced => "amqp:connection:forced",
            Self::ConnectionFramingError => "amqp:connection:framing-error",
            Self::LinkDetachForced => "amqp:link:detach-forced",
            Self::LinkStolen => "amqp:link:stolen",
            Self::LinkMessageSizeExceeded => "amqp:link:message-size-exceeded",
            Self::ServerBusy => "com.microsoft:server-busy",
            Self::Timeout => "com.microsoft:timeout",
            Self::ArgumentError => "com.microsoft:argument-error",
            Self::ArgumentOutOfRange => "com.microsoft:argument-out-of-range",
            Self::EntityDisabled => "com.microsoft:entity-disabled",
            Self::OperationCancelled => "com.microsoft:operation-cancelled",
        }
    }

    /// Looks up a condition by its wire symbol.
    ///
    /// Returns `None` for symbols this crate does not know about.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use amqp_condition::ErrorCondition;
    ///
    /// assert_eq!(ErrorCondition::from_symbol("amqp:not-found"), Some(ErrorCondition::NotFound));
    /// assert_eq!(ErrorCondition::from_symbol("amqp:unheard-of"), None);
    /// ```
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        ALL_CONDITIONS.into_iter().find(|condition| condition.symbol() == symbol)
    }

    /// Returns whether a failure carrying this condition is expected to go away on its own.
    ///
    /// Throttling, timeouts, internal errors, and links or connections closed by the service
    /// are transient. Authorization, validation, and missing-entity failures are permanent,
    /// since retrying them cannot change the outcome.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use amqp_condition::ErrorCondition;
    ///
    /// assert!(ErrorCondition::Timeout.is_transient());
    /// assert!(!ErrorCondition::UnauthorizedAccess.is_transient());
    /// ```
    #[must_use]
    pub const fn is_transient(self) -> bool {
        matches!(
            self,
            Self::ServerBusy | Self::Timeout | Self::InternalError | Self::ConnectionForced | Self::LinkDetachForced
        )
    }
}

impl Display for ErrorCondition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for ErrorCondition {
    type Err = UnknownConditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_symbol(s).ok_or_else(|| UnknownConditionError::new(s))
    }
}
