//! Domain types used throughout the viewer.
//!
//! This module defines:
//!
//! - price observations and per-key series (`Observation`, `Series`, `SeriesMap`)
//! - the viewing window and its shortcuts (`DateWindow`, `WindowEdge`, `Preset`)
//! - the shell's load lifecycle (`LoadState`)

pub mod types;

pub use types::*;
