//! Unified error types for Lookout

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Lookout operations
#[derive(Error, Debug)]
pub enum Error {
    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // Config errors
    #[error("Failed to read config file '{path}': {source}")]
    ConfigRead { path: PathBuf, source: io::Error },

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config validation failed: {0}")]
    ConfigValidation(String),

    // Trigger errors
    #[error("Invalid resource type '{0}' in trigger (expected url, file or ping)")]
    InvalidTriggerType(String),

    #[error("Invalid trigger operator '{0}' (expected 'contains:' or 'not-contains:')")]
    InvalidTriggerOperator(String),

    #[error("Malformed trigger '{0}' (expected '<type> <target> <operator>: <text>')")]
    TriggerSyntax(String),

    // Mail errors
    #[error("Invalid mail address: {0}")]
    MailAddress(#[from] lettre::address::AddressError),

    #[error("Failed to build mail message: {0}")]
    MailBuild(#[from] lettre::error::Error),

    #[error("SMTP delivery via '{server}' failed: {source}")]
    MailSend {
        server: String,
        source: lettre::transport::smtp::Error,
    },

    // Repair errors
    #[error("Failed to append to log file '{path}': {source}")]
    LogAppend { path: PathBuf, source: io::Error },

    #[error("Failed to spawn command '{command}': {source}")]
    SpawnFailed { command: String, source: io::Error },

    // Reporting errors
    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for Lookout operations
pub type Result<T> = std::result::Result<T, Error>;
