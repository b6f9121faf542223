//! Error types for output resolution, state persistence and build driving.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for compat operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while resolving, persisting or building secondary architectures.
#[derive(Error, Debug)]
pub enum Error {
    /// `compile` was run for a build directory that was never set up.
    #[error("no build state at {}; run `setup` for this build directory first", path.display())]
    StateMissing {
        /// Expected location of the state file
        path: PathBuf,
    },

    /// Persisted state was written by an incompatible version.
    #[error("build state schema version {found} is not supported (expected {expected}); re-run `setup`")]
    StateVersionMismatch {
        /// Version found on disk
        found: u32,
        /// Version this binary writes
        expected: u32,
    },

    /// A configure or build subprocess exited unsuccessfully.
    #[error("Command '{command}' returned non-zero exit status {}.", code.map_or_else(|| "(signal)".to_string(), |c| c.to_string()))]
    ToolchainFailure {
        /// Rendered command line
        command: String,
        /// Exit code, `None` when terminated by a signal
        code: Option<i32>,
        /// Combined stdout/stderr lines
        output: Vec<String>,
    },

    /// A configure or build subprocess could not be started.
    #[error("failed to start '{command}': {error}")]
    ToolchainSpawn {
        /// Rendered command line
        command: String,
        /// Underlying spawn error
        error: std::io::Error,
    },

    /// A required program could not be located.
    #[error("required tool '{tool}' was not found: {reason}")]
    ToolNotFound {
        /// Program name
        tool: String,
        /// Lookup failure
        reason: String,
    },

    /// The primary build's option store could not be read.
    #[error("failed to read build options: {reason}")]
    OptionStore {
        /// What went wrong
        reason: String,
    },

    /// A build step succeeded but did not produce the expected file.
    #[error("expected build output {} is missing", path.display())]
    OutputMissing {
        /// Path that should have been written by the toolchain
        path: PathBuf,
    },

    /// Filesystem error with context.
    #[error("error {context} {}: {error}", path.display())]
    Fs {
        /// What was being done
        context: &'static str,
        /// Path involved
        path: PathBuf,
        /// Underlying error
        error: std::io::Error,
    },

    /// IO error.
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    /// JSON error.
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    /// Generic error.
    #[error("{0}")]
    GenericError(String),
}

/// Attaches filesystem context to I/O results.
pub trait ErrorExt<T> {
    /// Wraps the error as [`Error::Fs`] with the given action and path.
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.as_ref().to_path_buf(),
            error,
        })
    }
}

/// Returns early with a [`Error::GenericError`] built from a format string.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::compat::Error::GenericError(format!($($arg)*)))
    };
}
