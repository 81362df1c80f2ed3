//! `tickview` library crate.
//!
//! The binary (`tv`) is a thin wrapper around this library so that:
//!
//! - the window and projection logic is testable without spawning processes
//! - the same load pipeline serves the TUI and the one-shot commands

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod plot;
pub mod report;
pub mod series;
pub mod session;
pub mod tui;
pub mod view;
pub mod window;
