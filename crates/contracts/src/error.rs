//! Layered error definitions
//!
//! Categorized by source: config / discovery / invocation / dispatch

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum PipelineError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Discovery Errors =====
    /// Malformed night string
    #[error("invalid night '{value}': {message}")]
    InvalidNight { value: String, message: String },

    /// Input file header could not be read
    #[error("header read error for '{path}': {message}")]
    HeaderRead { path: String, message: String },

    /// Required header keyword missing
    #[error("header keyword '{keyword}' missing in '{path}'")]
    HeaderKeywordMissing { keyword: String, path: String },

    // ===== Invocation Errors =====
    /// Log path could not be derived from the input path
    #[error("log path derivation failed for '{input}': {message}")]
    LogPath { input: String, message: String },

    /// Child process could not be spawned
    #[error("failed to spawn '{program}': {message}")]
    Spawn { program: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl PipelineError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create invalid-night error
    pub fn invalid_night(value: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidNight {
            value: value.into(),
            message: message.into(),
        }
    }

    /// Create header read error
    pub fn header_read(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::HeaderRead {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create log path derivation error
    pub fn log_path(input: impl Into<String>, message: impl Into<String>) -> Self {
        Self::LogPath {
            input: input.into(),
            message: message.into(),
        }
    }
}
