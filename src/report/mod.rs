//! Reporting utilities: formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the window/projection code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use crate::app::pipeline::LoadOutput;
use crate::domain::DATE_FORMAT;
use crate::view::ViewSlice;

/// Signed two-decimal rendering of a price change (`+2.00`, `-0.50`).
pub fn format_delta(delta: f64) -> String {
    if delta >= 0.0 {
        format!("+{delta:.2}")
    } else {
        format!("{delta:.2}")
    }
}

/// Per-key listing of a load: point count and date coverage.
pub fn format_catalog(load: &LoadOutput) -> String {
    let mut out = String::new();
    out.push_str(&format!("Source: {}\n", load.source));
    out.push_str(&format!(
        "Rows: {} read | {} dropped | {} keys\n",
        load.rows_read,
        load.dropped.len(),
        load.map.len()
    ));

    if load.map.is_empty() {
        out.push_str("No instruments found.\n");
        return out;
    }

    let key_width = load.map.keys().iter().map(|k| k.len()).max().unwrap_or(3).max(3);
    out.push_str(&format!(
        "\n{:<key_width$}  {:>6}  {:<10}  {:<10}\n",
        "key", "points", "first", "last"
    ));
    for series in load.map.iter() {
        let (first, last) = series
            .bounds()
            .map(|(f, l)| (f.format(DATE_FORMAT).to_string(), l.format(DATE_FORMAT).to_string()))
            .unwrap_or_else(|| ("-".to_string(), "-".to_string()));
        out.push_str(&format!(
            "{:<key_width$}  {:>6}  {first:<10}  {last:<10}\n",
            series.key(),
            series.len(),
        ));
    }
    out
}

/// One-paragraph summary of a view: window, last price, and delta.
pub fn format_view(slice: &ViewSlice<'_>) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} | {}\n", slice.key, slice.window));

    match (slice.first(), slice.last()) {
        (Some(first), Some(last)) => {
            out.push_str(&format!(
                "Points: {} | first {} @ {:.2} | last {} @ {:.2}\n",
                slice.len(),
                first.date.format(DATE_FORMAT),
                first.price,
                last.date.format(DATE_FORMAT),
                last.price,
            ));
            out.push_str(&format!(
                "Price: ${:.2} | change {}\n",
                last.price,
                format_delta(slice.profitability_delta())
            ));
        }
        _ => out.push_str("No data available for this range.\n"),
    }
    out
}
