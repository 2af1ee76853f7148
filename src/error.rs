//! Error types for scan sessions and their collaborators.
//!
//! Decoding problems are not errors here: a payload that fails validation is
//! reported as a [`DecodeFailure`](crate::DecodeFailure) value and dropped by the
//! session. [`ScanError`] covers the failures a caller can act on.
//!
//! ## Error Categories
//!
//! - **State Errors**: `start()`/`stop()` called out of sequence
//! - **Configuration Errors**: Invalid or unreadable scan configuration
//! - **File Errors**: Problems reading capture or configuration files
//! - **Parse Errors**: Malformed capture or configuration documents
//! - **Source Errors**: A scan source failed to deliver advertisements
//!
//! ## Recovery and Retry
//!
//! ```rust
//! use bleamit::ScanError;
//!
//! let error = ScanError::source_failed("adapter powered off");
//! if error.is_retryable() {
//!     for suggestion in error.recovery_suggestions() {
//!         println!("  - {}", suggestion);
//!     }
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

use crate::types::ScanStatus;

/// Result type alias for scan operations.
pub type Result<T, E = ScanError> = std::result::Result<T, E>;

/// Main error type for scan operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ScanError {
    #[error("Cannot {operation} a scan session that is {status}")]
    InvalidState { operation: &'static str, status: ScanStatus },

    #[error("Invalid scan configuration: {reason}")]
    Config { reason: String },

    #[error("File error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {context}: {details}")]
    Parse { context: String, details: String },

    #[error("Scan source failed: {reason}")]
    Source {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl ScanError {
    /// Returns whether this error is potentially recoverable through retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            ScanError::Source { .. } => true,
            ScanError::InvalidState { .. } => false,
            ScanError::Config { .. } => false,
            ScanError::File { .. } => false,
            ScanError::Parse { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            ScanError::InvalidState { .. } => vec![
                "Call start() exactly once before delivering frames",
                "Create a new session after stop(); stopped sessions cannot restart",
                "Check status() before issuing lifecycle calls",
            ],
            ScanError::Config { .. } => vec![
                "Check the configuration values against their documented ranges",
                "Remove the offending key to fall back to its default",
            ],
            ScanError::File { .. } => vec![
                "Check file exists and is readable",
                "Check file permissions",
            ],
            ScanError::Parse { .. } => vec![
                "Check the document is valid YAML",
                "Verify field names and value types",
            ],
            ScanError::Source { .. } => vec![
                "Ensure Bluetooth is powered on",
                "Check scan permissions were granted to the application",
                "Restart the platform scanner",
            ],
        }
    }

    /// Helper constructor for lifecycle errors.
    pub fn invalid_state(operation: &'static str, status: ScanStatus) -> Self {
        ScanError::InvalidState { operation, status }
    }

    /// Helper constructor for configuration errors.
    pub fn config(reason: impl Into<String>) -> Self {
        ScanError::Config { reason: reason.into() }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        ScanError::File { path, source }
    }

    /// Helper constructor for parse errors.
    pub fn parse(context: impl Into<String>, details: impl Into<String>) -> Self {
        ScanError::Parse { context: context.into(), details: details.into() }
    }

    /// Helper constructor for source failures.
    pub fn source_failed(reason: impl Into<String>) -> Self {
        ScanError::Source { reason: reason.into(), source: None }
    }

    /// Helper constructor for source failures with an underlying cause.
    pub fn source_failed_with(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        ScanError::Source { reason: reason.into(), source: Some(source) }
    }
}

impl From<std::io::Error> for ScanError {
    fn from(err: std::io::Error) -> Self {
        ScanError::File { path: PathBuf::from("<unknown>"), source: err }
    }
}
