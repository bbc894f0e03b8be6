//! Storefront E2E Common Library
//!
//! Settings and logging shared by the page objects, fixtures and scenarios.

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::{
    AirportData, ApiSettings, BrowserKind, Credentials, LoggingSettings, Settings, UiSettings,
};
pub use error::{Error, Result};
pub use logging::Logger;

/// Suite version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
