//! Error types for the telemetry crate.
//!
//! None of these errors are fatal to the host application. Transport errors
//! never leave the policy layer; store errors are returned from `save` so the
//! caller can log them.

use grblstats_settings::SettingsError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading or writing the persisted record.
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The record file exists but cannot be decoded.
    #[error("Corrupt usage record at {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The record could not be encoded.
    #[error("Failed to serialize usage record: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The temporary file could not be moved over the record.
    #[error("Failed to replace usage record: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Reasons a report submission did not succeed.
#[derive(Error, Debug)]
pub enum TransportError {
    /// No collection endpoint is configured.
    #[error("No collection endpoint configured")]
    NotConfigured,

    /// The configured endpoint is not a usable URL.
    #[error("Invalid collection endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// The request did not complete within the timeout.
    #[error("Report submission timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Connection-level failure.
    #[error("Network error: {0}")]
    Network(String),

    /// The endpoint answered with a non-success status.
    #[error("Collection endpoint returned HTTP {status}")]
    HttpStatus { status: u16 },

    /// The endpoint answered, but not with the success marker.
    #[error("Unexpected response from collection endpoint: {body:?}")]
    UnexpectedResponse { body: String },

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Client(String),
}

impl TransportError {
    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Timeout { .. })
    }
}

/// Errors surfaced by the usage stats service.
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The record could not be persisted.
    #[error("Usage record store error: {0}")]
    Store(#[from] StoreError),

    /// Settings could not be resolved.
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    /// The background worker could not be started or panicked.
    #[error("Telemetry worker error: {0}")]
    Worker(String),
}

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type alias for service operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_display() {
        let err = TransportError::Timeout { timeout_ms: 5000 };
        assert_eq!(err.to_string(), "Report submission timed out after 5000ms");
        assert!(err.is_timeout());

        let err = TransportError::HttpStatus { status: 503 };
        assert_eq!(err.to_string(), "Collection endpoint returned HTTP 503");
        assert!(!err.is_timeout());

        let err = TransportError::UnexpectedResponse {
            body: "Fail".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unexpected response from collection endpoint: \"Fail\""
        );
    }

    #[test]
    fn test_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "read-only");
        let store_err: StoreError = io_err.into();
        assert!(matches!(store_err, StoreError::Io(_)));

        let telemetry_err: TelemetryError = store_err.into();
        assert!(matches!(telemetry_err, TelemetryError::Store(_)));
        assert_eq!(
            telemetry_err.to_string(),
            "Usage record store error: I/O error: read-only"
        );
    }
}
