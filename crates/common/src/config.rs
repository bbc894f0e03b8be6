//! Suite configuration
//!
//! Every setting is read once from the environment (optionally seeded from a
//! `.env` file) into an immutable [`Settings`] value that is then passed by
//! reference to fixtures, page objects and scenarios.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const TRUE_VALUES: [&str; 4] = ["1", "true", "yes", "on"];
const FALSE_VALUES: [&str; 4] = ["0", "false", "no", "off"];

/// Complete suite configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Storefront UI target
    pub ui: UiSettings,

    /// Airport Gap API target
    pub api: ApiSettings,

    /// Default storefront login
    pub credentials: Credentials,

    /// Airport fixture data
    pub airports: AirportData,

    /// Log level and directory
    pub logging: LoggingSettings,
}

/// Browser engine launched by the Playwright driver
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl BrowserKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrowserKind::Chromium => "chromium",
            BrowserKind::Firefox => "firefox",
            BrowserKind::Webkit => "webkit",
        }
    }
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BrowserKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Ok(BrowserKind::Chromium),
            "firefox" => Ok(BrowserKind::Firefox),
            "webkit" | "safari" => Ok(BrowserKind::Webkit),
            other => Err(format!("unknown browser '{}'", other)),
        }
    }
}

/// Storefront UI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiSettings {
    pub base_url: String,

    /// Default action and expectation timeout in milliseconds
    pub timeout_ms: u64,

    pub headless: bool,

    /// Delay inserted by Playwright between actions, in milliseconds
    pub slow_mo_ms: u64,

    pub browser: BrowserKind,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://www.saucedemo.com".to_string(),
            timeout_ms: 10_000,
            headless: true,
            slow_mo_ms: 0,
            browser: BrowserKind::Chromium,
        }
    }
}

impl UiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Airport Gap API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_ms: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://airportgap.com/".to_string(),
            timeout_ms: 10_000,
        }
    }
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Storefront login credentials
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            username: "standard_user".to_string(),
            password: "secret_sauce".to_string(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Airport data used by the API scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirportData {
    /// Raw comma-separated list, kept for diagnostics
    pub expected_airports_csv: String,

    /// Parsed form of `expected_airports_csv`
    pub expected_airports: Vec<String>,

    pub distance_from: String,
    pub distance_to: String,
}

impl Default for AirportData {
    fn default() -> Self {
        Self::new("Akureyri Airport,St. Anthony Airport,CFB Bagotville", "KIX", "NRT")
    }
}

impl AirportData {
    pub fn new(expected_csv: &str, from: &str, to: &str) -> Self {
        Self {
            expected_airports_csv: expected_csv.to_string(),
            expected_airports: parse_name_list(expected_csv),
            distance_from: from.trim().to_string(),
            distance_to: to.trim().to_string(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Normalised level (`trace`, `debug`, `info`, `warn`, `error` or `off`)
    pub level: String,
    pub dir: PathBuf,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: PathBuf::from("logs"),
        }
    }
}

impl Settings {
    /// Load settings: defaults -> .env -> process environment
    pub fn from_env() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(Error::EnvFile {
                    file: ".env".to_string(),
                    source: e,
                });
            }
        }

        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build settings from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvReader { lookup };
        let defaults = Settings::default();

        let ui = UiSettings {
            base_url: env.string("BASE_URL", &defaults.ui.base_url),
            timeout_ms: env.positive_u64("UI_TIMEOUT", defaults.ui.timeout_ms)?,
            headless: env.boolean("HEADLESS", defaults.ui.headless),
            slow_mo_ms: env.u64("SLOWMO", defaults.ui.slow_mo_ms)?,
            browser: env.parsed("BROWSER", defaults.ui.browser)?,
        };

        let api = ApiSettings {
            base_url: env.string("AIRPORT_GAP_BASE_URL", &defaults.api.base_url),
            timeout_ms: env.positive_u64("API_TIMEOUT", defaults.api.timeout_ms)?,
        };

        let credentials = Credentials {
            username: env.string("SAUCE_USERNAME", &defaults.credentials.username),
            password: env.string("SAUCE_PASSWORD", &defaults.credentials.password),
        };

        let airports = AirportData::new(
            &env.string("AIRPORTS_EXPECTED", &defaults.airports.expected_airports_csv),
            &env.string("AIRPORT_DISTANCE_FROM", &defaults.airports.distance_from),
            &env.string("AIRPORT_DISTANCE_TO", &defaults.airports.distance_to),
        );

        let raw_level = env.string("LOG_LEVEL", &defaults.logging.level);
        let logging = LoggingSettings {
            level: parse_log_level(&raw_level).ok_or_else(|| {
                Error::invalid("LOG_LEVEL", &raw_level, "expected DEBUG, INFO, WARNING or ERROR")
            })?,
            dir: PathBuf::from(env.string("LOG_DIR", &defaults.logging.dir.to_string_lossy())),
        };

        Ok(Self {
            ui,
            api,
            credentials,
            airports,
            logging,
        })
    }

    /// Build settings from a fixed map, mostly for tests
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self> {
        Self::from_lookup(|name| vars.get(name).cloned())
    }
}

/// Split a comma-separated list, trimming entries and dropping blanks and repeats
pub fn parse_name_list(raw: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Normalise a level name to a `tracing` level directive
///
/// Accepts the `tracing` names plus `warning`, `critical` and `fatal`, in any case.
pub fn parse_log_level(raw: &str) -> Option<String> {
    let level = match raw.trim().to_ascii_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "info" => "info",
        "warn" | "warning" => "warn",
        "error" | "critical" | "fatal" => "error",
        "off" => "off",
        _ => return None,
    };
    Some(level.to_string())
}

/// Parse a boolean flag, falling back to `default` for unrecognised values
pub fn parse_bool(raw: Option<&str>, default: bool) -> bool {
    let Some(raw) = raw else {
        return default;
    };
    let value = raw.trim().to_ascii_lowercase();
    if TRUE_VALUES.contains(&value.as_str()) {
        true
    } else if FALSE_VALUES.contains(&value.as_str()) {
        false
    } else {
        default
    }
}

struct EnvReader<F> {
    lookup: F,
}

impl<F> EnvReader<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn string(&self, name: &str, default: &str) -> String {
        (self.lookup)(name).unwrap_or_else(|| default.to_string())
    }

    fn boolean(&self, name: &str, default: bool) -> bool {
        parse_bool((self.lookup)(name).as_deref(), default)
    }

    fn u64(&self, name: &str, default: u64) -> Result<u64> {
        match (self.lookup)(name) {
            None => Ok(default),
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|e| Error::invalid(name, &raw, e.to_string())),
        }
    }

    fn positive_u64(&self, name: &str, default: u64) -> Result<u64> {
        let value = self.u64(name, default)?;
        if value == 0 {
            return Err(Error::invalid(name, "0", "must be greater than zero"));
        }
        Ok(value)
    }

    fn parsed<T>(&self, name: &str, default: T) -> Result<T>
    where
        T: FromStr<Err = String>,
    {
        match (self.lookup)(name) {
            None => Ok(default),
            Some(raw) => raw.parse::<T>().map_err(|reason| Error::invalid(name, &raw, reason)),
        }
    }
}
