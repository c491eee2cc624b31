//! Error types shared across the transport registry crates

use thiserror::Error;

use crate::schema::ValidationError;

/// Result type alias for shared operations
pub type Result<T> = std::result::Result<T, TportError>;

/// Main error type for the common crate
#[derive(Error, Debug)]
pub enum TportError {
    #[error("Invalid record: {0}")]
    Validation(#[from] ValidationError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl TportError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the error came from record validation rather than I/O
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_converts() {
        let err: TportError = ValidationError::Missing("metadata.source_id").into();
        assert!(err.is_validation());
        assert!(err.to_string().contains("metadata.source_id"));
    }

    #[test]
    fn test_config_helper() {
        let err = TportError::config("bad value");
        assert!(!err.is_validation());
        assert_eq!(err.to_string(), "Configuration error: bad value");
    }
}
