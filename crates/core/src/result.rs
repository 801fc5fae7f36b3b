//! Result type definition and logging combinators.
//!
//! Fire-and-forget side effects (command dispatch, notifications) use these
//! combinators to log failures without propagating them.

use std::fmt::Display;

use crate::error::Error;

/// The standard Result type for samovar operations.
///
/// Use the `?` operator, `match`, or combinator methods to handle results.
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait providing logged fallbacks for fallible operations.
///
/// Implemented for any `Result` whose error displays, so hub and protocol
/// results can use it as well as core ones.
pub trait ResultExt<T> {
    /// Convert a Result to an Option, logging the error if present.
    fn into_option_logged(self) -> Option<T>;

    /// Get the value or a default, logging the error if present.
    fn or_default_logged(self, default: T) -> T;

    /// Inspect the error without consuming the Result.
    fn inspect_error<F: FnOnce(&str)>(self, f: F) -> Self;
}

impl<T, E: Display> ResultExt<T> for std::result::Result<T, E> {
    fn into_option_logged(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!("Operation failed: {}", e);
                None
            }
        }
    }

    fn or_default_logged(self, default: T) -> T {
        match self {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Operation failed, using default: {}", e);
                default
            }
        }
    }

    fn inspect_error<F: FnOnce(&str)>(self, f: F) -> Self {
        if let Err(ref e) = self {
            f(&e.to_string());
        }
        self
    }
}
