//! Named loggers backed by a single process-wide tracing subscriber
//!
//! The first call to [`init`] installs one console layer and one file layer
//! writing `test_run_<UTC timestamp>.log`; later calls reuse them so handlers
//! are never registered twice. Installing fails, without creating a run log,
//! when some other subscriber already owns the global dispatcher. [`logger`] hands out cached, cheap handles that
//! are attached to events as the `logger` field. [`shutdown`] flushes the file
//! writer and must run before the process exits.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt as tfmt, EnvFilter};

use crate::config::LoggingSettings;
use crate::error::{Error, Result};

static REGISTRY: OnceLock<LogRegistry> = OnceLock::new();

/// A named logging handle
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Logger {
    name: Arc<str>,
}

impl Logger {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

struct FileSink {
    path: PathBuf,
    guard: Option<WorkerGuard>,
}

/// Registry of named loggers and the installed subscriber
pub struct LogRegistry {
    loggers: Mutex<HashMap<String, Logger>>,
    sink: Mutex<Option<FileSink>>,
}

impl LogRegistry {
    fn new() -> Self {
        Self {
            loggers: Mutex::new(HashMap::new()),
            sink: Mutex::new(None),
        }
    }

    /// Get or create the logger registered under `name`
    pub fn logger(&self, name: &str) -> Logger {
        let mut loggers = self.loggers.lock();
        loggers
            .entry(name.to_string())
            .or_insert_with(|| Logger {
                name: Arc::from(name),
            })
            .clone()
    }

    /// Install console and file output once; returns the run log path
    pub fn install(&self, settings: &LoggingSettings) -> Result<PathBuf> {
        let mut sink = self.sink.lock();
        if let Some(existing) = sink.as_ref() {
            return Ok(existing.path.clone());
        }

        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&settings.level))
            .map_err(|e| Error::Logging(format!("invalid level '{}': {}", settings.level, e)))?;

        if tracing::dispatcher::has_been_set() {
            return Err(Error::Logging(
                "another global subscriber is already installed".to_string(),
            ));
        }

        std::fs::create_dir_all(&settings.dir)?;
        let file_name = run_log_file_name(Utc::now());
        let path = settings.dir.join(&file_name);

        let appender = RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix(file_name.trim_end_matches(".log"))
            .filename_suffix("log")
            .build(&settings.dir)
            .map_err(|e| Error::Logging(format!("failed to create {}: {}", path.display(), e)))?;
        let (file_writer, guard) = tracing_appender::non_blocking(appender);

        let installed = tracing_subscriber::registry()
            .with(filter)
            .with(tfmt::layer().with_target(false))
            .with(
                tfmt::layer()
                    .with_writer(file_writer)
                    .with_ansi(false)
                    .with_target(false),
            )
            .try_init();

        if let Err(e) = installed {
            drop(guard);
            let _ = std::fs::remove_file(&path);
            return Err(Error::Logging(format!("subscriber not installed: {}", e)));
        }

        tracing::info!(log_file = %path.display(), "Logging initialized");
        *sink = Some(FileSink {
            path: path.clone(),
            guard: Some(guard),
        });
        Ok(path)
    }

    /// Path of the current run log, once installed
    pub fn log_file(&self) -> Option<PathBuf> {
        self.sink.lock().as_ref().map(|s| s.path.clone())
    }

    /// Flush and release the file writer
    pub fn flush(&self) {
        if let Some(sink) = self.sink.lock().as_mut() {
            drop(sink.guard.take());
        }
    }
}

/// Process-wide registry, created on first use
pub fn registry() -> &'static LogRegistry {
    REGISTRY.get_or_init(LogRegistry::new)
}

/// Install logging for this run (idempotent)
pub fn init(settings: &LoggingSettings) -> Result<PathBuf> {
    registry().install(settings)
}

/// Named logger from the process-wide registry
pub fn logger(name: &str) -> Logger {
    registry().logger(name)
}

/// Flush buffered log lines; call once at the end of the run
pub fn shutdown() {
    registry().flush();
}

/// `test_run_YYYYmmdd_HHMMSS.log` for the given instant
pub fn run_log_file_name(at: DateTime<Utc>) -> String {
    format!("test_run_{}.log", at.format("%Y%m%d_%H%M%S"))
}

/// Whether `path` looks like a run log produced by [`init`]
pub fn is_run_log(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with("test_run_") && n.ends_with(".log"))
        .unwrap_or(false)
}
