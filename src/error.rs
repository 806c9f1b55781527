//! Unified error hierarchy for NeatRS
//!
//! Provides structured error types for the energy balance engine, with
//! severity classification and user-facing messages integrated with the
//! tracing system.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for all NeatRS operations
#[derive(Debug, Error)]
pub enum NeatError {
    /// Energy data source errors
    #[error("Data source error: {0}")]
    DataSource(#[from] DataSourceError),

    /// Day-window storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors reported by an energy data source.
///
/// Closed union: any concrete data platform adapter must map its failures
/// into exactly one of these. All three are terminal for the current
/// calculation; the engine performs no internal retry and forwards the
/// error unchanged to outcome classification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataSourceError {
    /// Data access was revoked or never granted
    #[error("Health data permissions missing")]
    PermissionsMissing,

    /// The host data platform is not installed or not reachable
    #[error("Health data platform unavailable")]
    PlatformUnavailable,

    /// Recoverable I/O failure from the data source
    #[error("Transient data source failure: {reason}")]
    TransientFailure { reason: String },
}

/// Day-window persistence errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Could not read the persisted window
    #[error("Failed to read window store at {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    /// Could not write the persisted window
    #[error("Failed to write window store at {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    /// Stored window exists but cannot be decoded
    #[error("Corrupted window record: {reason}")]
    Corrupted { reason: String },
}

/// Result type alias for NeatRS operations
pub type Result<T> = std::result::Result<T, NeatError>;

impl NeatError {
    /// Classify error severity for logging and diagnostics
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            NeatError::DataSource(DataSourceError::TransientFailure { .. }) => {
                ErrorSeverity::Warning
            }
            NeatError::DataSource(_) => ErrorSeverity::Error,
            NeatError::Storage(StorageError::Corrupted { .. }) => ErrorSeverity::Warning,
            NeatError::Storage(_) => ErrorSeverity::Error,
            NeatError::Configuration(_) => ErrorSeverity::Warning,
            NeatError::Io(_) => ErrorSeverity::Error,
            NeatError::Internal(_) => ErrorSeverity::Critical,
        }
    }

    /// Whether the operation that produced this error is worth retrying
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            NeatError::DataSource(DataSourceError::TransientFailure { .. })
                | NeatError::Io(_)
        )
    }

    /// User-friendly message for display in the presentation layer
    pub fn user_message(&self) -> String {
        match self {
            NeatError::DataSource(DataSourceError::PermissionsMissing) => {
                "Health data access is not granted. Please reconnect your health data source."
                    .to_string()
            }
            NeatError::DataSource(DataSourceError::PlatformUnavailable) => {
                "The health data platform is not available on this device.".to_string()
            }
            NeatError::DataSource(DataSourceError::TransientFailure { .. }) => {
                "Could not read health data right now. Please try again.".to_string()
            }
            NeatError::Storage(_) => {
                "Could not access the saved day record. Your data will be recalculated."
                    .to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Critical system error requiring immediate attention
    Critical,
    /// Error that prevents operation but system can continue
    Error,
    /// Warning that doesn't prevent operation
    Warning,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Critical | ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_severity() {
        let err = NeatError::DataSource(DataSourceError::TransientFailure {
            reason: "timeout".to_string(),
        });
        assert_eq!(err.severity(), ErrorSeverity::Warning);

        let err = NeatError::Internal("test".to_string());
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_error_retryable() {
        let err = NeatError::DataSource(DataSourceError::TransientFailure {
            reason: "socket closed".to_string(),
        });
        assert!(err.is_retryable());

        let err = NeatError::DataSource(DataSourceError::PermissionsMissing);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_user_messages() {
        let err = NeatError::DataSource(DataSourceError::PermissionsMissing);
        assert!(err.user_message().contains("reconnect"));

        let err = NeatError::DataSource(DataSourceError::PlatformUnavailable);
        assert!(err.user_message().contains("not available"));
    }
}
