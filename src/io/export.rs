//! Export the current view slice to CSV or JSON.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::Serialize;

use crate::domain::{DATE_FORMAT, Observation};
use crate::error::AppError;
use crate::view::ViewSlice;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

/// JSON document written by `ExportFormat::Json`.
#[derive(Debug, Serialize)]
struct ViewExport<'a> {
    key: &'a str,
    start: NaiveDate,
    end: NaiveDate,
    points: usize,
    profitability_delta: f64,
    observations: &'a [Observation],
}

/// Write `slice` to `path` in the requested format.
pub fn write_view(path: &Path, slice: &ViewSlice<'_>, format: ExportFormat) -> Result<(), AppError> {
    match format {
        ExportFormat::Csv => write_view_csv(path, slice),
        ExportFormat::Json => write_view_json(path, slice),
    }
}

fn write_view_csv(path: &Path, slice: &ViewSlice<'_>) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(4, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    writer
        .write_record(["Date", "TICKER", "Close_Price_Raw"])
        .map_err(|e| AppError::new(4, format!("Failed to write export CSV header: {e}")))?;

    for o in slice.observations {
        writer
            .write_record([
                o.date.format(DATE_FORMAT).to_string(),
                slice.key.to_string(),
                o.price.to_string(),
            ])
            .map_err(|e| AppError::new(4, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(4, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

fn write_view_json(path: &Path, slice: &ViewSlice<'_>) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create export JSON '{}': {e}", path.display())))?;

    let doc = ViewExport {
        key: slice.key,
        start: slice.window.start(),
        end: slice.window.end(),
        points: slice.len(),
        profitability_delta: slice.profitability_delta(),
        observations: slice.observations,
    };

    serde_json::to_writer_pretty(file, &doc)
        .map_err(|e| AppError::new(4, format!("Failed to write export JSON: {e}")))?;
    Ok(())
}
