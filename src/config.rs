//! Environment-driven configuration.
//!
//! Values come from the process environment, optionally seeded from a `.env`
//! file in the working directory. Command-line flags override them.

use std::path::PathBuf;

use crate::io::source::SourceSpec;
use crate::logging::{LogConfig, LogFormat};

pub const ENV_SOURCE: &str = "TICKVIEW_SOURCE";
pub const ENV_LOG: &str = "TICKVIEW_LOG";
pub const ENV_LOG_FORMAT: &str = "TICKVIEW_LOG_FORMAT";
pub const ENV_LOG_FILE: &str = "TICKVIEW_LOG_FILE";

#[derive(Debug, Clone, Default)]
pub struct ViewerConfig {
    /// Default input location (path or URL).
    pub source: Option<SourceSpec>,
    pub log: LogConfig,
}

impl ViewerConfig {
    /// Load `.env` (if present) and read the `TICKVIEW_*` variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let mut log = LogConfig::default();
        if let Some(level) = get(ENV_LOG) {
            log.level = level;
        }
        if let Some(format) = get(ENV_LOG_FORMAT).and_then(|s| s.parse::<LogFormat>().ok()) {
            log.format = format;
        }
        log.file = get(ENV_LOG_FILE).map(PathBuf::from);

        Self {
            source: get(ENV_SOURCE).map(|s| SourceSpec::parse(&s)),
            log,
        }
    }
}
