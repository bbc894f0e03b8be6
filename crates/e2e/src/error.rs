//! Error types for E2E testing

use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Playwright not found. Install with: npm install playwright && npx playwright install")]
    PlaywrightNotFound,

    #[error("Playwright error: {0}")]
    Playwright(String),

    #[error("Driver command '{command}' failed: {message}")]
    Driver { command: String, message: String },

    #[error("Timeout waiting for: {what} (after {timeout_ms}ms)")]
    Timeout { what: String, timeout_ms: u64 },

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("Fixture error: {0}")]
    Fixture(String),

    #[error("Unexpected status {status} from {url}: {body}")]
    HttpStatus { status: u16, url: String, body: String },

    #[error("Malformed response from {url}: {reason}")]
    MalformedResponse { url: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(#[from] storefront_common::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type E2eResult<T> = Result<T, E2eError>;

/// Fail with an [`E2eError::AssertionFailed`] unless `condition` holds
#[macro_export]
macro_rules! ensure_that {
    ($condition:expr, $($arg:tt)+) => {
        if !$condition {
            return Err($crate::error::E2eError::AssertionFailed(format!($($arg)+)));
        }
    };
}
