//! Error types shared by the aim crates.

use std::path::{Path, PathBuf};

/// Errors that can occur while loading, validating, or computing.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// I/O error without a known path.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O error on a specific file or directory.
    #[error("I/O error on {}: {source}", path.display())]
    IoWithPath {
        /// Path that was being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Document could not be parsed (YAML syntax, JSON field files, ...).
    #[error("Parse error: {0}")]
    Parse(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Input data failed validation
    #[error("Validation error: {message}")]
    Validation {
        /// Field or aspect that failed validation
        field: Option<String>,
        /// What went wrong
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// What configuration is problematic
        message: String,
    },

    /// A named item (input, output, parameter) does not exist
    #[error("{kind} not found: {name}")]
    NotFound {
        /// Kind of item that was looked up
        kind: &'static str,
        /// Name that was not found
        name: String,
    },
}

/// Convenience `Result` type alias for aim operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Creates an I/O error that remembers the path involved.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Error::IoWithPath {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Creates a parse error.
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Error::Parse(message.into())
    }

    /// Creates a new validation error.
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Error::Validation {
            field: None,
            message: message.into(),
        }
    }

    /// Creates a new validation error with a field name.
    pub fn validation_field<F, M>(field: F, message: M) -> Self
    where
        F: Into<String>,
        M: Into<String>,
    {
        Error::Validation {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Creates a not-found error for the given kind of item.
    pub fn not_found<S: Into<String>>(kind: &'static str, name: S) -> Self {
        Error::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Returns whether the error was caused by the filesystem.
    pub fn is_io(&self) -> bool {
        matches!(self, Error::Io(_) | Error::IoWithPath { .. })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_io_with_path_display() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = Error::io_with_path(io, "/tmp/CITATION.cff");
        assert_eq!(err.to_string(), "I/O error on /tmp/CITATION.cff: missing");
        assert!(err.is_io());
    }

    #[test]
    fn test_validation_error_with_field() {
        let err = Error::validation_field("values", "expected 4 values, found 3");
        let Error::Validation { field, message } = err else {
            unreachable!("Expected Validation error variant");
        };
        assert_eq!(field, Some("values".to_string()));
        assert_eq!(message, "expected 4 values, found 3");
    }

    #[test]
    fn test_not_found_display() {
        let err = Error::not_found("input", "mars");
        assert_eq!(err.to_string(), "input not found: mars");
        assert!(!err.is_io());
    }

    #[test]
    fn test_config_error() {
        let err = Error::config("Invalid field file extension");
        assert_eq!(
            err.to_string(),
            "Configuration error: Invalid field file extension"
        );
    }

    #[test]
    fn test_serde_error_conversion() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{bad").unwrap_err();
        let err: Error = serde_err.into();
        assert!(err.to_string().starts_with("Serialization error"));
    }

    #[test]
    fn test_error_implements_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
