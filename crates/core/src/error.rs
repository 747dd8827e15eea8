//! Error types for backup-core
//!
//! Provides a unified error type that can be converted to appropriate exit codes.

use thiserror::Error;

/// Result type alias for backup-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for backup-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error: missing credentials, bad bucket name, unreadable config file
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid local path, e.g. an input directory that does not exist
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Authentication error
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Network or service error
    #[error("Network error: {0}")]
    Network(String),

    /// General error
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Get the appropriate exit code for this error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidPath(_) => 2, // UsageError
            Error::Config(_) => 2,      // UsageError
            Error::TomlParse(_) => 2,   // UsageError
            Error::InvalidUrl(_) => 2,  // UsageError
            _ => 1,                     // GeneralError
        }
    }
}
