//! Core error type for file and record handling.

use std::path::PathBuf;

use thiserror::Error;

/// Core error type for samovar operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read file '{path}': {reason}")]
    FileReadFailed { path: PathBuf, reason: String },

    #[error("failed to write file '{path}': {reason}")]
    FileWriteFailed { path: PathBuf, reason: String },

    #[error("failed to create directory '{path}': {reason}")]
    DirectoryCreationFailed { path: PathBuf, reason: String },

    #[error("JSON parse error: {reason}")]
    JsonParseFailed { reason: String },

    #[error("invalid record: {reason}")]
    InvalidRecord { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a file read error.
    pub fn file_read_failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::FileReadFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a file write error.
    pub fn file_write_failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::FileWriteFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a directory creation error.
    pub fn directory_creation_failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::DirectoryCreationFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a JSON parse error.
    pub fn json_parse_failed(reason: impl Into<String>) -> Self {
        Self::JsonParseFailed {
            reason: reason.into(),
        }
    }

    /// Create an invalid record error.
    pub fn invalid_record(reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonParseFailed {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_error_display_includes_path_and_reason() {
        let err = Error::file_read_failed("/tmp/state.json", "permission denied");
        assert!(err.to_string().contains("/tmp/state.json"));
        assert!(err.to_string().contains("permission denied"));
    }

    #[test]
    fn test_serde_json_error_converts_to_parse_failed() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").err();
        assert!(parse_err.is_some());
        let err: Error = parse_err.map(Error::from).unwrap_or_else(|| Error::json_parse_failed("missing"));
        assert!(matches!(err, Error::JsonParseFailed { .. }));
    }

    #[test]
    fn test_io_error_wraps() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = Error::from(io);
        assert!(err.to_string().contains("gone"));
    }
}
