//! Error types for CLI operations.

use dispatcher::{DispatcherError, ErrorKind};
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration loading or validation error
    #[error("Failed to load configuration: {message}")]
    Config { message: String },

    /// Dispatcher operation error
    #[error("{0}")]
    Dispatch(#[from] DispatcherError),

    /// Drill input error
    #[error("Failed to read drill events from {path}: {message}")]
    DrillInput { path: String, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error wrapper
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn drill_input(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DrillInput {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Process exit code
    ///
    /// 2 for bad input, 3 for unknown ids, 4 for storage failures.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConfigNotFound { .. } | Self::Config { .. } | Self::DrillInput { .. } => 2,
            Self::Dispatch(e) => match e.kind() {
                ErrorKind::Validation => 2,
                ErrorKind::NotFound => 3,
                ErrorKind::Persistence => 4,
            },
            Self::Io(_) => 4,
            Self::Other(_) => 1,
        }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
