//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[allow(dead_code)]
#[derive(Error, Debug)]
pub enum CliError {
    /// Blueprint file not found
    #[error("Blueprint file not found: {path}")]
    ConfigNotFound { path: String },

    /// Blueprint parsing error
    #[error("Failed to parse blueprint: {message}")]
    ConfigParse { message: String },

    /// Blueprint validation error
    #[error("Blueprint validation failed: {message}")]
    ConfigValidation { message: String },

    /// Discovery error
    #[error("Exposure discovery failed: {message}")]
    Discovery { message: String },

    /// Dispatch execution error
    #[error("Dispatch execution failed: {message}")]
    DispatchExecution { message: String },

    /// Strict-mode failure
    #[error("{failed} of {total} items failed")]
    StrictFailures { failed: usize, total: usize },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error wrapper
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

#[allow(dead_code)]
impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
        }
    }

    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    pub fn discovery(message: impl Into<String>) -> Self {
        Self::Discovery {
            message: message.into(),
        }
    }

    pub fn dispatch_execution(message: impl Into<String>) -> Self {
        Self::DispatchExecution {
            message: message.into(),
        }
    }
}

/// Result type alias for CLI operations
#[allow(dead_code)]
pub type Result<T> = std::result::Result<T, CliError>;
