//! Command-line parsing for the price-history viewer.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the data/window code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::Preset;
use crate::io::export::ExportFormat;

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "tv", version, about = "Per-instrument price history viewer")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive TUI.
    Tui(TuiArgs),
    /// List instruments in a dataset with their date coverage.
    Summary(SourceArgs),
    /// Print one instrument's window summary and an ASCII chart.
    View(ViewArgs),
    /// Write one instrument's window to CSV or JSON.
    Export(ExportArgs),
    /// Generate a synthetic dataset.
    Sample(SampleArgs),
}

/// Where to read the price table from.
#[derive(Debug, Args, Clone, Default)]
pub struct SourceArgs {
    /// CSV path or http(s) URL (falls back to TICKVIEW_SOURCE, then a picker).
    #[arg(short = 's', long)]
    pub source: Option<String>,
}

#[derive(Debug, Args, Clone, Default)]
pub struct TuiArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Instrument to select on startup (defaults to the first key).
    #[arg(short = 'k', long)]
    pub key: Option<String>,
}

/// Window selection shared by `view` and `export`.
///
/// The window starts at the key's default (one year back from its last
/// observation), then the preset or month count is applied, then the
/// `--start`/`--end` edits. Given together, the two edges are checked as one
/// range.
#[derive(Debug, Args, Clone, Default)]
pub struct WindowArgs {
    /// Named preset relative to the last observation.
    #[arg(long, value_enum, conflicts_with = "months")]
    pub preset: Option<Preset>,

    /// Custom lookback in months relative to the last observation.
    #[arg(long)]
    pub months: Option<u32>,

    /// Window start (YYYY-MM-DD).
    #[arg(long)]
    pub start: Option<String>,

    /// Window end (YYYY-MM-DD).
    #[arg(long)]
    pub end: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct ViewArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Instrument key (case-sensitive).
    #[arg(short = 'k', long)]
    pub key: String,

    #[command(flatten)]
    pub window: WindowArgs,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 16)]
    pub height: usize,

    /// Skip the ASCII chart.
    #[arg(long)]
    pub no_plot: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Instrument key (case-sensitive).
    #[arg(short = 'k', long)]
    pub key: String,

    #[command(flatten)]
    pub window: WindowArgs,

    /// Output file.
    #[arg(short = 'o', long)]
    pub out: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
    pub format: ExportFormat,
}

#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// Output CSV file.
    #[arg(short = 'o', long)]
    pub out: PathBuf,

    /// Comma-separated instrument keys.
    #[arg(long, value_delimiter = ',', default_value = "ACME,BOLT,CRUX,DYNA,EPIC")]
    pub keys: Vec<String>,

    /// Business days per key.
    #[arg(long, default_value_t = 1500)]
    pub days: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Last date of the generated range (YYYY-MM-DD, defaults to today).
    #[arg(long)]
    pub end: Option<NaiveDate>,
}
