//! Error types for the estatebuddy pipeline
//!
//! Configuration and initialization errors are fatal at startup;
//! embedding and generation errors are scoped to a single request.

use thiserror::Error;

/// Main error type for the assistant pipeline
#[derive(Error, Debug)]
pub enum AssistantError {
    /// Missing or invalid configuration (credentials, model names, paths)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Index construction failed (empty corpus, corpus encoding failure)
    #[error("Index initialization failed: {0}")]
    InitError(String),

    /// Listing dataset could not be loaded or has an unexpected shape
    #[error("Dataset error: {0}")]
    DatasetError(String),

    /// Embedding backend failure (corpus build or query encoding)
    #[error("Embedding error: {0}")]
    EmbeddingError(String),

    /// Generation backend failure or empty model output
    #[error("Generation error: {0}")]
    GenerationError(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, AssistantError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AssistantError::InitError("corpus is empty".to_string());
        assert!(err.to_string().contains("corpus is empty"));
        assert!(err.to_string().contains("initialization"));
    }

    #[test]
    fn test_config_error_display() {
        let err = AssistantError::ConfigError("API key not provided".to_string());
        assert!(err.to_string().starts_with("Configuration error"));
    }
}
