//! Error types for the ETL pipeline
//!
//! Fatal errors abort a run with a non-zero exit, so each message says what
//! to check. Row-level problems are not errors; see [`crate::normalize::Rejected`].

use thiserror::Error;

/// Result type alias for ETL operations
pub type Result<T> = std::result::Result<T, EtlError>;

#[derive(Error, Debug)]
pub enum EtlError {
    /// Load target does not exist; indices are never created implicitly
    #[error("Index '{0}' does not exist. Run 'tport-etl create-index' first.")]
    IndexNotFound(String),

    /// Refusing to overwrite a provisioned index
    #[error("Index '{0}' already exists. Pass --recreate to drop and recreate it.")]
    IndexExists(String),

    /// Transformation produced nothing to load
    #[error("No valid records were produced from {0}. Check the source file format.")]
    NoValidRecords(String),

    /// Source download exhausted its retry budget
    #[error("Source unavailable after {attempts} attempts: {message}. Check network access or pass a pre-extracted data directory.")]
    SourceUnavailable { attempts: u32, message: String },

    /// A required source file is missing after extraction
    #[error("Source file not found: '{0}'. Re-run with --force-download to fetch a fresh archive.")]
    SourceFileMissing(String),

    /// The document store answered with an unexpected status
    #[error("Document store error: {0}. Check that Elasticsearch is reachable at the configured URL.")]
    Store(String),

    #[error("Configuration error: {0}. Check your TPORT_* environment variables or CLI flags.")]
    Config(String),

    #[error("Network request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("File operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read delimited file: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to extract archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Failed to encode or decode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Schema(#[from] tport_common::TportError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EtlError {
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn source_unavailable(attempts: u32, msg: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            attempts,
            message: msg.into(),
        }
    }

    /// Errors worth another attempt at the transport layer
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(err) => {
                err.is_timeout()
                    || err.is_connect()
                    || err.status().is_some_and(|s| s.is_server_error() || s.as_u16() == 429)
            },
            Self::Io(_) => true,
            _ => false,
        }
    }
}
