//! Structured error types for configuration loading.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Boxed error returned by format parsers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // File layer
    SourceInvalid,
    OverrideSourceInvalid,

    // Binding
    TypeMismatch,

    // Validation
    MissingRequiredField,
}

/// Everything that can make a load fail.
///
/// Only [`ConfigError::Validation`] batches several problems into one report;
/// every other variant aborts the pipeline at the first failure.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A base configuration file is unreadable or malformed for its format.
    #[error("failed to load configuration file '{}': {source}", .path.display())]
    Source {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    /// An environment-specific override file exists but could not be parsed.
    #[error(
        "failed to load '{environment}' override file '{}': {source}",
        .path.display()
    )]
    OverrideSource {
        path: PathBuf,
        environment: String,
        #[source]
        source: BoxError,
    },

    /// The merged tree does not fit the target type.
    #[error("cannot bind '{path}': {message}")]
    Binding { path: String, message: String },

    /// Required fields still hold their zero value after the overlay.
    #[error("missing required configuration: {}", .missing.join(", "))]
    Validation { missing: Vec<String> },
}

impl ConfigError {
    pub fn binding(path: impl Into<String>, message: impl Into<String>) -> Self {
        let path = path.into();
        Self::Binding {
            path: if path.is_empty() {
                "<root>".to_string()
            } else {
                path
            },
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ConfigError::Source { .. } => ErrorCode::SourceInvalid,
            ConfigError::OverrideSource { .. } => ErrorCode::OverrideSourceInvalid,
            ConfigError::Binding { .. } => ErrorCode::TypeMismatch,
            ConfigError::Validation { .. } => ErrorCode::MissingRequiredField,
        }
    }

    /// Dotted paths of the required fields that were left unset.
    pub fn missing_fields(&self) -> &[String] {
        match self {
            ConfigError::Validation { missing } => missing,
            _ => &[],
        }
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
