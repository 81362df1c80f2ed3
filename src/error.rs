use std::path::PathBuf;

use thiserror::Error;

/// Binary-facing error carrying the process exit code.
///
/// Exit codes:
/// - `2` input/usage problems (bad path, unreachable source, unreadable data)
/// - `3` no usable data (unknown key, empty window)
/// - `4` runtime failures (terminal, logging, writes)
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// The input artifact could not be read as a whole.
///
/// Individual bad rows never produce this; see `io::ingest::MalformedRow`.
#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("failed to open '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("request to '{url}' failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("'{url}' answered with HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("failed to read input: {0}")]
    Read(#[source] csv::Error),

    #[error("input has no header row")]
    MissingHeader,

    #[error("missing required {field} column (expected one of: {expected})")]
    MissingColumn {
        field: &'static str,
        expected: String,
    },
}

impl From<DataSourceError> for AppError {
    fn from(err: DataSourceError) -> Self {
        AppError::new(2, format!("Failed to load data: {err}"))
    }
}
