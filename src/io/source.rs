//! Where the input table comes from.
//!
//! The viewer only needs a readable byte stream; a `DataSource` hides whether
//! that is a local file, an HTTP resource, or text already in memory.

use std::fmt;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::PathBuf;

use reqwest::blocking::Client;

use crate::error::DataSourceError;

/// A fetchable input artifact.
pub trait DataSource {
    /// Human-readable location (for logs and status lines).
    fn describe(&self) -> String;

    /// Open the artifact for reading.
    fn open(&self) -> Result<Box<dyn Read>, DataSourceError>;
}

/// A CSV file on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DataSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn open(&self) -> Result<Box<dyn Read>, DataSourceError> {
        let file = File::open(&self.path).map_err(|source| DataSourceError::Open {
            path: self.path.clone(),
            source,
        })?;
        Ok(Box::new(file))
    }
}

/// A CSV resource served over HTTP(S).
pub struct HttpSource {
    client: Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }
}

impl DataSource for HttpSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    fn open(&self) -> Result<Box<dyn Read>, DataSourceError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .map_err(|source| DataSourceError::Http {
                url: self.url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DataSourceError::HttpStatus {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }
        Ok(Box::new(response))
    }
}

/// Text that is already in memory (tests, embedded demos).
#[derive(Debug, Clone)]
pub struct TextSource {
    label: String,
    text: String,
}

impl TextSource {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }
}

impl DataSource for TextSource {
    fn describe(&self) -> String {
        self.label.clone()
    }

    fn open(&self) -> Result<Box<dyn Read>, DataSourceError> {
        Ok(Box::new(Cursor::new(self.text.clone().into_bytes())))
    }
}

/// A source location as written on the command line or in the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    File(PathBuf),
    Url(String),
}

impl SourceSpec {
    /// `http://` and `https://` prefixes select HTTP; anything else is a path.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            SourceSpec::Url(raw.to_string())
        } else {
            SourceSpec::File(PathBuf::from(raw))
        }
    }

    pub fn into_source(self) -> Box<dyn DataSource> {
        match self {
            SourceSpec::File(path) => Box::new(FileSource::new(path)),
            SourceSpec::Url(url) => Box::new(HttpSource::new(url)),
        }
    }
}

impl fmt::Display for SourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceSpec::File(path) => write!(f, "{}", path.display()),
            SourceSpec::Url(url) => f.write_str(url),
        }
    }
}
