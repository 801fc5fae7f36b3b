//! Core types, errors, and utilities shared across samovar crates.
//!
//! All errors are explicit, typed, and recoverable - no panics allowed.

pub mod error;
pub mod result;

pub use error::Error;
pub use result::{Result, ResultExt};
