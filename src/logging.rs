//! Structured logging on top of `tracing`.
//!
//! One-shot commands log to stderr. The TUI owns the terminal, so it logs to
//! a file when one is configured and stays silent otherwise.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::error::AppError;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Multi-line, human-readable.
    Pretty,
    /// One line per event.
    #[default]
    Compact,
    /// Newline-delimited JSON.
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(format!("Unknown log format: {other}")),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Filter directive, e.g. `info` or `tickview=debug`.
    pub level: String,
    pub format: LogFormat,
    /// Append to this file instead of stderr.
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
            file: None,
        }
    }
}

/// Where log lines should go for the current command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// stderr unless a file is configured.
    Console,
    /// Only a configured file; otherwise logging stays off.
    FileOnly,
}

/// Install the global subscriber.
///
/// `RUST_LOG` overrides `config.level` when set.
pub fn init_logging(config: &LogConfig, target: LogTarget) -> Result<(), AppError> {
    let writer = match (&config.file, target) {
        (Some(path), _) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| AppError::new(4, format!("Failed to open log file '{}': {e}", path.display())))?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        (None, LogTarget::Console) => BoxMakeWriter::new(std::io::stderr),
        (None, LogTarget::FileOnly) => return Ok(()),
    };
    let ansi = config.file.is_none();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| AppError::new(2, format!("Invalid log level '{}': {e}", config.level)))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(true);

    let result = match config.format {
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    result.map_err(|e| AppError::new(4, format!("Failed to initialize logging: {e}")))
}
