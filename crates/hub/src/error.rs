//! Error types for the hub crate.

use std::fmt;

/// Result type alias for hub operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Hub error types.
#[derive(Debug, Clone)]
pub enum Error {
    /// Durable store operation failed.
    StoreFailed { operation: String, reason: String },
    /// Malformed entity identifier.
    InvalidEntityId { raw: String },
    /// Required config-entry field is missing or malformed.
    MissingField { field: String },
    /// Subscription failed.
    SubscriptionFailed { reason: String },
    /// State-change channel closed.
    ChannelClosed,
    /// Serialization error.
    Serialization { reason: String },
    /// Internal error.
    Internal(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StoreFailed { operation, reason } => {
                write!(f, "store operation '{operation}' failed: {reason}")
            }
            Self::InvalidEntityId { raw } => {
                write!(f, "invalid entity id '{raw}': expected 'domain.object_id'")
            }
            Self::MissingField { field } => {
                write!(f, "missing required field '{field}'")
            }
            Self::SubscriptionFailed { reason } => {
                write!(f, "subscription failed: {reason}")
            }
            Self::ChannelClosed => {
                write!(f, "state-change channel closed")
            }
            Self::Serialization { reason } => {
                write!(f, "serialization error: {reason}")
            }
            Self::Internal(msg) => {
                write!(f, "internal error: {msg}")
            }
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Create a store failed error.
    pub fn store_failed(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::StoreFailed {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid entity id error.
    pub fn invalid_entity_id(raw: impl Into<String>) -> Self {
        Self::InvalidEntityId { raw: raw.into() }
    }

    /// Create a missing field error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create a subscription failed error.
    pub fn subscription_failed(reason: impl Into<String>) -> Self {
        Self::SubscriptionFailed {
            reason: reason.into(),
        }
    }

    /// Create a serialization error.
    pub fn serialization(reason: impl Into<String>) -> Self {
        Self::Serialization {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_failed_display() {
        let err = Error::store_failed("save", "disk full");
        assert!(err.to_string().contains("save"));
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_invalid_entity_id_display() {
        let err = Error::invalid_entity_id("kettle");
        assert!(err.to_string().contains("kettle"));
        assert!(err.to_string().contains("domain.object_id"));
    }

    #[test]
    fn test_channel_closed_display() {
        assert_eq!(Error::ChannelClosed.to_string(), "state-change channel closed");
    }
}
