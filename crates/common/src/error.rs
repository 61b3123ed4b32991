//! Error types for SauceQA

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the SauceQA error
pub type Result<T> = std::result::Result<T, Error>;

/// SauceQA error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Test data file not found: {}", path.display())]
    FixtureNotFound { path: PathBuf },

    #[error("Invalid JSON format in file {}: {source}", path.display())]
    DataFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Missing key '{key}' in {}", path.display())]
    MissingKey { path: PathBuf, key: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown test type: {0}")]
    UnknownScope(String),

    #[error("Unsupported browser: {0}")]
    UnsupportedBrowser(String),

    #[error("Logging already initialized")]
    LoggingInitialized,
}
