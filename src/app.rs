//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and environment configuration
//! - sets up logging
//! - loads the price table
//! - resolves the requested window
//! - prints reports/plots or writes exports

use chrono::Local;
use clap::Parser;
use tracing::info;

use crate::cli::{Command, ExportArgs, SampleArgs, SourceArgs, ViewArgs, WindowArgs};
use crate::config::ViewerConfig;
use crate::domain::{DateWindow, Series, WindowEdge};
use crate::error::AppError;
use crate::io::source::{DataSource, SourceSpec};
use crate::logging::{LogTarget, init_logging};
use crate::session::ViewerSession;

pub mod pipeline;

/// Entry point for the `tv` binary.
pub fn run() -> Result<(), AppError> {
    // `tv` and `tv -s data.csv` behave like `tv tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    let config = ViewerConfig::from_env();

    let target = match cli.command {
        Command::Tui(_) => LogTarget::FileOnly,
        _ => LogTarget::Console,
    };
    init_logging(&config.log, target)?;

    match cli.command {
        Command::Tui(args) => {
            let source = resolve_source(&args.source, &config)?;
            crate::tui::run(source, args.key)
        }
        Command::Summary(args) => handle_summary(&args, &config),
        Command::View(args) => handle_view(&args, &config),
        Command::Export(args) => handle_export(&args, &config),
        Command::Sample(args) => handle_sample(&args),
    }
}

/// Pick the data source: `--source`, then `TICKVIEW_SOURCE`, then the picker.
pub fn resolve_source(args: &SourceArgs, config: &ViewerConfig) -> Result<Box<dyn DataSource>, AppError> {
    let location = match (&args.source, &config.source) {
        (Some(raw), _) => SourceSpec::parse(raw),
        (None, Some(location)) => location.clone(),
        (None, None) => SourceSpec::File(crate::cli::picker::prompt_for_csv_path()?),
    };
    Ok(location.into_source())
}

fn handle_summary(args: &SourceArgs, config: &ViewerConfig) -> Result<(), AppError> {
    let source = resolve_source(args, config)?;
    let load = pipeline::load(source.as_ref())?;
    println!("{}", crate::report::format_catalog(&load));
    Ok(())
}

fn handle_view(args: &ViewArgs, config: &ViewerConfig) -> Result<(), AppError> {
    let source = resolve_source(&args.source, config)?;
    let load = pipeline::load(source.as_ref())?;
    let series = load
        .map
        .get(&args.key)
        .ok_or_else(|| unknown_key(&args.key))?;

    let window = resolve_window(series, &args.window)?;
    let slice = crate::view::project(series, window);

    println!("{}", crate::report::format_view(&slice));
    if !args.no_plot {
        println!("{}", crate::plot::render_ascii_area(&slice, args.width, args.height));
    }
    Ok(())
}

fn handle_export(args: &ExportArgs, config: &ViewerConfig) -> Result<(), AppError> {
    let source = resolve_source(&args.source, config)?;
    let load = pipeline::load(source.as_ref())?;
    let series = load
        .map
        .get(&args.key)
        .ok_or_else(|| unknown_key(&args.key))?;

    let window = resolve_window(series, &args.window)?;
    let slice = crate::view::project(series, window);
    if slice.is_empty() {
        return Err(AppError::new(3, format!("No observations for '{}' in {window}.", args.key)));
    }

    crate::io::export::write_view(&args.out, &slice, args.format)?;
    info!(path = %args.out.display(), points = slice.len(), "wrote export");
    println!("Wrote {} point(s) to {}", slice.len(), args.out.display());
    Ok(())
}

fn handle_sample(args: &SampleArgs) -> Result<(), AppError> {
    let config = crate::data::SampleConfig {
        keys: args.keys.iter().map(|k| k.trim().to_string()).filter(|k| !k.is_empty()).collect(),
        days: args.days,
        end: args.end.unwrap_or_else(|| Local::now().date_naive()),
        seed: args.seed,
    };
    let rows = crate::data::generate_sample(&config)?;
    crate::data::write_sample_csv(&args.out, &rows)?;
    println!("Wrote {} row(s) for {} key(s) to {}", rows.len(), config.keys.len(), args.out.display());
    Ok(())
}

/// Derive the window for one-shot commands the same way the TUI does:
/// default window, then preset, then start/end edits. When both edges are
/// given they are validated together as one range.
///
/// Unlike the TUI, a rejected edit is an error here; silently ignoring a
/// flag would print a window the user did not ask for.
pub fn resolve_window(series: &Series, args: &WindowArgs) -> Result<DateWindow, AppError> {
    let mut session = ViewerSession::with_map(std::iter::once(series.clone()).collect());

    if session.window().is_none() {
        return Err(AppError::new(3, format!("No observations for '{}'.", series.key())));
    }

    let months = args.preset.map(|p| p.months()).or(args.months);
    if let Some(months) = months {
        if !session.apply_preset(months) {
            return Err(AppError::new(2, "Lookback must be at least one month."));
        }
    }

    match (&args.start, &args.end) {
        // Both edges given: only the final pair has to satisfy the bounds.
        (Some(start), Some(end)) => {
            session
                .set_window(start, end)
                .map_err(|e| AppError::new(2, format!("Rejected --start {start} --end {end}: {e}")))?;
        }
        (Some(value), None) => edit_edge(&mut session, WindowEdge::Start, value)?,
        (None, Some(value)) => edit_edge(&mut session, WindowEdge::End, value)?,
        (None, None) => {}
    }

    session
        .window()
        .copied()
        .ok_or_else(|| AppError::new(3, format!("No observations for '{}'.", series.key())))
}

fn edit_edge(session: &mut ViewerSession, edge: WindowEdge, value: &str) -> Result<(), AppError> {
    session
        .edit_window(edge, value)
        .map(|_| ())
        .map_err(|e| AppError::new(2, format!("Rejected --{edge} {value}: {e}")))
}

fn unknown_key(key: &str) -> AppError {
    AppError::new(3, format!("Unknown instrument key '{key}'."))
}

/// Rewrite argv so `tv` defaults to `tv tui`.
///
/// Rules:
/// - `tv`                      -> `tv tui`
/// - `tv -s data.csv ...`      -> `tv tui -s data.csv ...`
/// - `tv --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
    }
    argv
}
