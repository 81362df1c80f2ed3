//! ASCII area chart for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - price line: `*`
//! - filled area under the line: `:`

use crate::domain::DATE_FORMAT;
use crate::view::ViewSlice;

/// Render a view slice as an area chart.
///
/// The x axis is calendar time across the slice's window, so gaps in the
/// data show up as stretched segments.
pub fn render_ascii_area(slice: &ViewSlice<'_>, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let Some((p_min, p_max)) = slice.price_range() else {
        return format!("Plot: {} | no data in range\n", slice.window);
    };
    let (y_min, y_max) = pad_range(p_min, p_max, 0.05);

    let t0 = slice.window.start();
    let span = (slice.window.end() - t0).num_days().max(1) as f64;
    let points: Vec<(f64, f64)> = slice
        .observations
        .iter()
        .map(|o| ((o.date - t0).num_days() as f64, o.price))
        .collect();

    let mut grid = vec![vec![' '; width]; height];
    let levels = column_levels(&points, span, width);
    for (x, level) in levels.iter().enumerate() {
        let Some(price) = level else { continue };
        let top = map_y(*price, y_min, y_max, height);
        grid[top][x] = '*';
        for row in grid.iter_mut().skip(top + 1) {
            row[x] = ':';
        }
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {} .. {} | price=[{y_min:.2}, {y_max:.2}]\n",
        t0.format(DATE_FORMAT),
        slice.window.end().format(DATE_FORMAT),
    ));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }
    out
}

/// Price level per column, linearly interpolated between observations.
///
/// Columns before the first or after the last observation stay empty.
fn column_levels(points: &[(f64, f64)], span: f64, width: usize) -> Vec<Option<f64>> {
    let mut levels = vec![None; width];
    if points.is_empty() {
        return levels;
    }
    if points.len() == 1 {
        levels[map_x(points[0].0, span, width)] = Some(points[0].1);
        return levels;
    }

    for pair in points.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        let c0 = map_x(x0, span, width);
        let c1 = map_x(x1, span, width);
        for c in c0..=c1 {
            let u = if c1 == c0 {
                1.0
            } else {
                (c - c0) as f64 / (c1 - c0) as f64
            };
            levels[c] = Some(y0 + u * (y1 - y0));
        }
    }
    levels
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, span: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = (t / span).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DateWindow, Observation, Series};
    use crate::view::project;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let s = Series::new(
            "AAA",
            vec![
                Observation::new(d(2023, 1, 1), 100.0),
                Observation::new(d(2023, 1, 10), 110.0),
            ],
        );
        let slice = project(&s, DateWindow::new(d(2023, 1, 1), d(2023, 1, 10)).unwrap());

        let txt = render_ascii_area(&slice, 10, 5);
        let expected = concat!(
            "Plot: 2023-01-01 .. 2023-01-10 | price=[99.50, 110.50]\n",
            "         *\n",
            "      ***:\n",
            "    **::::\n",
            " ***::::::\n",
            "*:::::::::\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn empty_slice_says_so() {
        let s = Series::new("AAA", vec![Observation::new(d(2023, 1, 1), 1.0)]);
        let slice = project(&s, DateWindow::new(d(2024, 1, 1), d(2024, 2, 1)).unwrap());
        assert_eq!(
            render_ascii_area(&slice, 20, 5),
            "Plot: 2024-01-01 .. 2024-02-01 | no data in range\n"
        );
    }
}
