//! Error types for the scoring engine

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Main error type for engine operations
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Repository '{repository}' is missing required metric '{path}'")]
    MissingMetric { repository: String, path: String },

    #[error("Repository '{repository}' has malformed date at '{path}': {value:?}")]
    InvalidDate {
        repository: String,
        path: String,
        value: String,
    },

    #[error("Repository '{repository}' has a malformed snapshot: {message}")]
    MalformedSnapshot { repository: String, message: String },

    #[error("Invalid repository record: {0}")]
    InvalidRecord(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid evaluation time: {0}")]
    InvalidEvaluationTime(String),

    #[error("Evaluation task failed: {0}")]
    TaskFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl EngineError {
    /// Create a missing metric error
    pub fn missing(repository: impl Into<String>, path: impl Into<String>) -> Self {
        Self::MissingMetric {
            repository: repository.into(),
            path: path.into(),
        }
    }

    /// Create a malformed date error
    pub fn invalid_date(
        repository: impl Into<String>,
        path: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::InvalidDate {
            repository: repository.into(),
            path: path.into(),
            value: value.into(),
        }
    }

    /// Create a malformed snapshot error
    pub fn malformed(repository: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedSnapshot {
            repository: repository.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Name of the repository this error belongs to, if any
    pub fn repository(&self) -> Option<&str> {
        match self {
            Self::MissingMetric { repository, .. }
            | Self::InvalidDate { repository, .. }
            | Self::MalformedSnapshot { repository, .. } => Some(repository),
            _ => None,
        }
    }
}
