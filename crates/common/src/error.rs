//! Error types for suite configuration and logging

use thiserror::Error;

/// Result type alias using the common Error
pub type Result<T> = std::result::Result<T, Error>;

/// Configuration and logging errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {var}={value:?} ({reason})")]
    InvalidConfig {
        var: String,
        value: String,
        reason: String,
    },

    #[error("Failed to read env file {file}: {source}")]
    EnvFile {
        file: String,
        #[source]
        source: dotenvy::Error,
    },

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

impl Error {
    pub(crate) fn invalid(var: &str, value: &str, reason: impl Into<String>) -> Self {
        Error::InvalidConfig {
            var: var.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}
