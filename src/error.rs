//! Unified error types for the bootcamp tracker.
//!
//! Mutations either commit fully or return one of these errors with the
//! in-memory state untouched. Lookups of unknown keys are never errors.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for tracker operations.
#[derive(Error, Debug)]
pub enum BootcampError {
    /// Caller supplied an out-of-range or unparseable value.
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// I/O errors from the file-backed store.
    #[error("storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The key-value store refused a write or holds a corrupted value.
    #[error("persistence error for key '{key}': {message}")]
    Persistence { key: String, message: String },

    /// JSON serialization errors.
    #[error("serialization error: {message}")]
    Serde { message: String },

    /// Configuration loading errors.
    #[error("config error: {message}")]
    Config { message: String },
}

/// A specialized Result type for tracker operations.
pub type Result<T> = std::result::Result<T, BootcampError>;

impl BootcampError {
    /// Create a validation error for the named field.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Create a storage error from an I/O error.
    pub fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Create a persistence error for a key.
    pub fn persistence(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Persistence {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a serialization error.
    pub fn serde(message: impl Into<String>) -> Self {
        Self::Serde {
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this error came from the persistence layer.
    ///
    /// Storage, persistence and serialization failures all count.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            Self::Storage { .. } | Self::Persistence { .. } | Self::Serde { .. }
        )
    }

    /// Whether this error is a rejected caller input.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

impl From<io::Error> for BootcampError {
    fn from(err: io::Error) -> Self {
        Self::Storage {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for BootcampError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde {
            message: err.to_string(),
        }
    }
}

/// Fail-open handling for optional inputs.
///
/// Logs a warning and substitutes a fallback instead of propagating.
pub trait FailOpen<T> {
    /// Handle an error by logging a warning and returning the default value.
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default;

    /// Handle an error by logging a warning and returning the provided fallback.
    fn fail_open_with(self, context: &str, fallback: T) -> T;
}

impl<T> FailOpen<T> for Result<T> {
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default,
    {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("{}: {} (fail-open: using default)", context, err);
                T::default()
            }
        }
    }

    fn fail_open_with(self, context: &str, fallback: T) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("{}: {} (fail-open: using fallback)", context, err);
                fallback
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = BootcampError::validation("day", "must be in 1..=7, got 9");
        assert_eq!(err.to_string(), "invalid day: must be in 1..=7, got 9");
    }

    #[test]
    fn test_storage_error_display() {
        let err = BootcampError::storage(
            "/tmp/projects.json",
            io::Error::new(io::ErrorKind::StorageFull, "disk full"),
        );
        assert!(err.to_string().contains("storage error"));
        assert!(err.to_string().contains("/tmp/projects.json"));
    }

    #[test]
    fn test_persistence_error_display() {
        let err = BootcampError::persistence("currentDay", "quota exceeded");
        assert_eq!(
            err.to_string(),
            "persistence error for key 'currentDay': quota exceeded"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = BootcampError::config("invalid TOML");
        assert_eq!(err.to_string(), "config error: invalid TOML");
    }

    #[test]
    fn test_error_classification() {
        assert!(BootcampError::validation("score", "x").is_validation());
        assert!(!BootcampError::validation("score", "x").is_persistence());

        let persistence = vec![
            BootcampError::persistence("k", "x"),
            BootcampError::serde("x"),
            BootcampError::storage("/tmp", io::Error::other("x")),
        ];
        for err in persistence {
            assert!(err.is_persistence(), "{err} should be a persistence error");
            assert!(!err.is_validation());
        }

        assert!(!BootcampError::config("x").is_persistence());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err: BootcampError = io_err.into();
        assert!(matches!(err, BootcampError::Storage { .. }));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: BootcampError = json_err.into();
        assert!(matches!(err, BootcampError::Serde { .. }));
    }

    #[test]
    fn test_fail_open_default() {
        let result: Result<Vec<String>> = Err(BootcampError::config("test"));
        assert!(result.fail_open_default("test context").is_empty());
    }

    #[test]
    fn test_fail_open_with() {
        let result: Result<u32> = Err(BootcampError::config("test"));
        assert_eq!(result.fail_open_with("test context", 42), 42);
    }

    #[test]
    fn test_fail_open_success() {
        let result: Result<u32> = Ok(100);
        assert_eq!(result.fail_open_default("test context"), 100);
    }
}
