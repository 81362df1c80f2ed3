//! Shared "load pipeline" used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! source -> row parse -> group/sort -> series map
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use tracing::info;

use crate::domain::SeriesMap;
use crate::error::DataSourceError;
use crate::io::ingest::{self, MalformedRow};
use crate::io::source::DataSource;
use crate::series::build_series_map;

/// Everything produced by one load.
#[derive(Debug, Clone)]
pub struct LoadOutput {
    pub source: String,
    pub map: SeriesMap,
    pub rows_read: usize,
    pub dropped: Vec<MalformedRow>,
}

/// Read, parse, and group a data source.
pub fn load(source: &dyn DataSource) -> Result<LoadOutput, DataSourceError> {
    let label = source.describe();
    let reader = source.open()?;
    let parsed = ingest::parse_records(reader)?;

    let rows_read = parsed.rows_read;
    let dropped = parsed.dropped;
    let map = build_series_map(parsed.records);

    info!(
        source = %label,
        rows = rows_read,
        dropped = dropped.len(),
        keys = map.len(),
        "loaded price table"
    );

    Ok(LoadOutput {
        source: label,
        map,
        rows_read,
        dropped,
    })
}
