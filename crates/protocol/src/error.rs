//! Error types for the protocol crate.

use std::fmt;

/// Result type alias for protocol operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Protocol error types.
#[derive(Debug, Clone)]
pub enum Error {
    /// Config entry is missing a field or has a malformed one.
    Config { field: String, reason: String },
    /// A hub collaborator failed.
    Hub(samovar_hub::Error),
    /// Engine lifecycle misuse.
    Lifecycle { reason: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config { field, reason } => {
                write!(f, "invalid config field '{field}': {reason}")
            }
            Self::Hub(err) => {
                write!(f, "hub error: {err}")
            }
            Self::Lifecycle { reason } => {
                write!(f, "lifecycle error: {reason}")
            }
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Create a config error.
    pub fn config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Config {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a lifecycle error.
    pub fn lifecycle(reason: impl Into<String>) -> Self {
        Self::Lifecycle {
            reason: reason.into(),
        }
    }
}

impl From<samovar_hub::Error> for Error {
    fn from(err: samovar_hub::Error) -> Self {
        Self::Hub(err)
    }
}
