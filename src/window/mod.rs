//! Date-window derivation and validation.
//!
//! Everything here works from a series' first/last dates and a requested
//! window. Nothing in this module knows about rendering.
//!
//! Month arithmetic is calendar-based: subtracting months clamps to the end
//! of the target month (Mar 31 minus one month is Feb 28/29), and the
//! duration of a window is counted in whole calendar months.

use chrono::{Datelike, Months, NaiveDate};
use thiserror::Error;

use crate::domain::{DATE_FORMAT, DateWindow, Series, WindowEdge};

/// Lookback of the window shown when a key is first selected.
pub const DEFAULT_LOOKBACK_MONTHS: u32 = 12;
/// Shortest window a user edit may produce.
pub const MIN_WINDOW_MONTHS: i32 = 1;
/// Longest window a user edit may produce.
pub const MAX_WINDOW_MONTHS: i32 = 60;

/// A user edit that would leave the window invalid.
///
/// Callers keep their previous window when they receive one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidWindowEdit {
    #[error("{0} date is missing or not in YYYY-MM-DD form")]
    MissingEdge(WindowEdge),

    #[error("start {start} is after end {end}")]
    Inverted { start: NaiveDate, end: NaiveDate },

    #[error("window spans {months} whole month(s); minimum is {min}", min = MIN_WINDOW_MONTHS)]
    TooShort { months: i32 },

    #[error("window spans {months} whole month(s); maximum is {max}", max = MAX_WINDOW_MONTHS)]
    TooLong { months: i32 },
}

/// The window shown when a key is first selected: one year back from the
/// last observation, never starting before the first one.
///
/// `None` for an empty series.
pub fn default_window(series: &Series) -> Option<DateWindow> {
    preset_window(series, DEFAULT_LOOKBACK_MONTHS)
}

/// `months` calendar months back from the last observation, clamped to the
/// first observation.
///
/// `None` for an empty series or `months == 0`. The result is not held to
/// the min/max duration rules; a series shorter than the preset simply
/// yields its full range.
pub fn preset_window(series: &Series, months: u32) -> Option<DateWindow> {
    if months == 0 {
        return None;
    }
    let (first, last) = series.bounds()?;
    let start = last
        .checked_sub_months(Months::new(months))
        .map_or(first, |s| s.max(first));
    DateWindow::new(start, last)
}

/// Replace one edge of `current` with `new_value` and validate the result.
///
/// `current` is `None` when no window exists yet (nothing selected); the
/// untouched edge then counts as missing.
pub fn validate_edit(
    current: Option<&DateWindow>,
    edge: WindowEdge,
    new_value: &str,
) -> Result<DateWindow, InvalidWindowEdit> {
    let new_date = parse_edge(new_value).ok_or(InvalidWindowEdit::MissingEdge(edge))?;

    let other = match edge {
        WindowEdge::Start => WindowEdge::End,
        WindowEdge::End => WindowEdge::Start,
    };
    let kept = current
        .map(|w| w.edge(other))
        .ok_or(InvalidWindowEdit::MissingEdge(other))?;

    let (start, end) = match edge {
        WindowEdge::Start => (new_date, kept),
        WindowEdge::End => (kept, new_date),
    };
    validate_window(start, end)
}

/// Replace both edges at once and validate the pair.
///
/// Unlike two successive `validate_edit` calls, the intermediate window
/// (new start, old end) is never checked, so any valid pair is reachable.
pub fn validate_range(start: &str, end: &str) -> Result<DateWindow, InvalidWindowEdit> {
    let start = parse_edge(start).ok_or(InvalidWindowEdit::MissingEdge(WindowEdge::Start))?;
    let end = parse_edge(end).ok_or(InvalidWindowEdit::MissingEdge(WindowEdge::End))?;
    validate_window(start, end)
}

/// Check ordering and duration bounds of a candidate window.
pub fn validate_window(start: NaiveDate, end: NaiveDate) -> Result<DateWindow, InvalidWindowEdit> {
    let Some(window) = DateWindow::new(start, end) else {
        return Err(InvalidWindowEdit::Inverted { start, end });
    };

    let months = whole_months_between(start, end);
    if months < MIN_WINDOW_MONTHS {
        return Err(InvalidWindowEdit::TooShort { months });
    }
    if months > MAX_WINDOW_MONTHS {
        return Err(InvalidWindowEdit::TooLong { months });
    }
    Ok(window)
}

/// Number of whole calendar months from `start` to `end`.
///
/// A month is complete once the same day-of-month is reached (or the last
/// day of a shorter month): Jan 15 -> Feb 14 is 0, Jan 15 -> Feb 15 is 1,
/// Jan 31 -> Feb 28 is 1. Negative when `end < start`.
pub fn whole_months_between(start: NaiveDate, end: NaiveDate) -> i32 {
    if end < start {
        return -whole_months_between(end, start);
    }

    let mut months = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
    while months > 0 {
        match start.checked_add_months(Months::new(months as u32)) {
            Some(d) if d <= end => break,
            _ => months -= 1,
        }
    }
    months
}

fn parse_edge(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Observation;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn series(dates: &[NaiveDate]) -> Series {
        Series::new(
            "AAA",
            dates.iter().map(|&date| Observation::new(date, 1.0)).collect(),
        )
    }

    fn window(start: NaiveDate, end: NaiveDate) -> DateWindow {
        DateWindow::new(start, end).unwrap()
    }

    #[test]
    fn whole_months_counts_calendar_months() {
        assert_eq!(whole_months_between(d(2023, 1, 15), d(2023, 2, 14)), 0);
        assert_eq!(whole_months_between(d(2023, 1, 15), d(2023, 2, 15)), 1);
        assert_eq!(whole_months_between(d(2023, 1, 31), d(2023, 2, 28)), 1);
        assert_eq!(whole_months_between(d(2020, 1, 1), d(2025, 1, 1)), 60);
        assert_eq!(whole_months_between(d(2020, 1, 2), d(2025, 1, 1)), 59);
        assert_eq!(whole_months_between(d(2023, 3, 1), d(2023, 1, 1)), -2);
    }

    #[test]
    fn default_window_clamps_to_first_date() {
        let s = series(&[d(2023, 1, 1), d(2023, 2, 1)]);
        assert_eq!(default_window(&s), Some(window(d(2023, 1, 1), d(2023, 2, 1))));
    }

    #[test]
    fn default_window_looks_back_one_year() {
        let s = series(&[d(2019, 6, 3), d(2024, 2, 29)]);
        assert_eq!(default_window(&s), Some(window(d(2023, 2, 28), d(2024, 2, 29))));
    }

    #[test]
    fn default_window_of_empty_series_is_none() {
        assert_eq!(default_window(&series(&[])), None);
    }

    #[test]
    fn preset_window_clamps_and_rejects_zero() {
        let s = series(&[d(2022, 12, 1), d(2023, 3, 31)]);
        assert_eq!(preset_window(&s, 1), Some(window(d(2023, 2, 28), d(2023, 3, 31))));
        assert_eq!(preset_window(&s, 60), Some(window(d(2022, 12, 1), d(2023, 3, 31))));
        assert_eq!(preset_window(&s, 0), None);
    }

    #[test]
    fn edit_shorter_than_a_month_is_rejected() {
        let w = window(d(2023, 1, 1), d(2023, 2, 1));
        assert_eq!(
            validate_edit(Some(&w), WindowEdge::End, "2023-01-10"),
            Err(InvalidWindowEdit::TooShort { months: 0 })
        );
    }

    #[test]
    fn edit_longer_than_five_years_is_rejected() {
        let w = window(d(2020, 1, 1), d(2023, 1, 1));
        assert_eq!(
            validate_edit(Some(&w), WindowEdge::Start, "2010-01-01"),
            Err(InvalidWindowEdit::TooLong { months: 156 })
        );
    }

    #[test]
    fn inverted_and_unparseable_edits_are_rejected() {
        let w = window(d(2023, 1, 1), d(2023, 6, 1));
        assert!(matches!(
            validate_edit(Some(&w), WindowEdge::Start, "2023-07-01"),
            Err(InvalidWindowEdit::Inverted { .. })
        ));
        assert_eq!(
            validate_edit(Some(&w), WindowEdge::End, "2023-0"),
            Err(InvalidWindowEdit::MissingEdge(WindowEdge::End))
        );
        assert_eq!(
            validate_edit(None, WindowEdge::End, "2023-06-01"),
            Err(InvalidWindowEdit::MissingEdge(WindowEdge::Start))
        );
    }

    #[test]
    fn valid_edit_replaces_only_the_named_edge() {
        let w = window(d(2023, 1, 1), d(2023, 6, 1));
        assert_eq!(
            validate_edit(Some(&w), WindowEdge::Start, "2022-06-01"),
            Ok(window(d(2022, 6, 1), d(2023, 6, 1)))
        );
        assert_eq!(
            validate_edit(Some(&w), WindowEdge::End, " 2023-02-01 "),
            Ok(window(d(2023, 1, 1), d(2023, 2, 1)))
        );
    }

    #[test]
    fn range_edit_checks_only_the_final_pair() {
        // Far from the current end, so a start-only edit would be too long.
        let current = window(d(2018, 1, 1), d(2023, 6, 30));
        assert!(validate_edit(Some(&current), WindowEdge::Start, "2005-01-01").is_err());

        assert_eq!(
            validate_range("2005-01-01", "2008-01-01"),
            Ok(window(d(2005, 1, 1), d(2008, 1, 1)))
        );
        assert_eq!(
            validate_range("2005-01-01", "2005-01-20"),
            Err(InvalidWindowEdit::TooShort { months: 0 })
        );
        assert_eq!(
            validate_range("2005-01-01", "bad"),
            Err(InvalidWindowEdit::MissingEdge(WindowEdge::End))
        );
    }
}
