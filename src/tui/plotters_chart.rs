//! Plotters-powered price area chart widget for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use chrono::{NaiveDate, TimeDelta};
use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color as TermColor, Style},
    widgets::Widget,
};

/// A render-only chart description.
///
/// All points and bounds are computed outside the render call.
pub struct PriceAreaChart<'a> {
    /// `(days since window start, price)` pairs, ascending in x.
    pub points: &'a [(f64, f64)],
    /// X bounds (days since window start).
    pub x_bounds: [f64; 2],
    /// Y bounds (price).
    pub y_bounds: [f64; 2],
    /// Fill/line colour; callers pick green or red from the delta sign.
    pub rising: bool,
    /// Date at x = 0; x tick labels are rendered as dates with `date_fmt`.
    pub origin: NaiveDate,
    pub date_fmt: &'a str,
    pub fmt_y: fn(f64) -> String,
}

fn day_label(origin: NaiveDate, offset: f64, fmt: &str) -> String {
    origin
        .checked_add_signed(TimeDelta::days(offset.round() as i64))
        .map(|d| d.format(fmt).to_string())
        .unwrap_or_default()
}

impl<'a> Widget for PriceAreaChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to build a chart in a tiny area.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(TermColor::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;

        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| day_label(self.origin, *v, self.date_fmt))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let color = if self.rising {
                RGBColor(0, 255, 0)
            } else {
                RGBColor(255, 64, 64)
            };

            // Baseline at the bottom of the visible range, not zero, so small
            // moves on large prices still read as an area.
            chart.draw_series(AreaSeries::new(
                self.points.iter().copied(),
                y0,
                color.mix(0.25).filled(),
            ))?;
            chart.draw_series(LineSeries::new(self.points.iter().copied(), &color))?;

            Ok(())
        });

        widget.render(area, buf);
    }
}
