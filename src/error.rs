//! Top-level error types for compat-build operations.
//!
//! Library code returns [`crate::compat::Error`]; this module wraps it together with
//! CLI and I/O failures so `main` has a single type to report.

use thiserror::Error;

/// Result type alias for CLI-level operations
pub type Result<T> = std::result::Result<T, CompatError>;

/// Main error type for all compat-build operations
#[derive(Error, Debug)]
pub enum CompatError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors raised by the resolver, state store or build driver
    #[error("{0}")]
    Compat(#[from] crate::compat::Error),

    /// Generic errors from anyhow
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },
}

impl CompatError {
    /// Captured toolchain output to show after the error message, if any.
    pub fn toolchain_output(&self) -> Option<&[String]> {
        match self {
            Self::Compat(crate::compat::Error::ToolchainFailure { output, .. }) => Some(output.as_slice()),
            _ => None,
        }
    }
}
