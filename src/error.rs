//! Common error types for portrait generation

use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Credential error: {0}")]
    Credential(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Content blocked: {0}")]
    ContentFiltered(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Cache error: {0}")]
    Cache(String),
}

impl AppError {
    /// Stable tag for status lines and structured log fields
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Config(_) => "config_error",
            AppError::Io(_) => "io_error",
            AppError::Json(_) => "json_error",
            AppError::Validation(_) => "validation_error",
            AppError::Credential(_) => "credential_error",
            AppError::Backend(_) => "backend_error",
            AppError::ContentFiltered(_) => "content_filtered",
            AppError::Decode(_) => "decode_error",
            AppError::Cache(_) => "cache_error",
        }
    }

    /// Whether the error was raised locally, before reaching the network boundary
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            AppError::Validation(_) | AppError::Config(_) | AppError::Io(_) | AppError::Json(_)
        )
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;
