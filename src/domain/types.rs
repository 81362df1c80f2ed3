//! Shared domain types.
//!
//! Dates are `chrono::NaiveDate` everywhere inside the crate; the
//! `YYYY-MM-DD` string form only exists at the I/O boundary.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Canonical on-the-wire date format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One price observation of an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub price: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }
}

/// A parsed input row before grouping.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRecord {
    pub key: String,
    pub date: NaiveDate,
    pub price: f64,
}

/// Chronologically ordered observations for one instrument key.
///
/// Built once by `series::build_series_map`; there is no way to mutate
/// a series afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    key: String,
    observations: Vec<Observation>,
}

impl Series {
    /// Build a series, stable-sorting the observations by date.
    pub fn new(key: impl Into<String>, mut observations: Vec<Observation>) -> Self {
        observations.sort_by_key(|o| o.date);
        Self {
            key: key.into(),
            observations,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first(&self) -> Option<&Observation> {
        self.observations.first()
    }

    pub fn last(&self) -> Option<&Observation> {
        self.observations.last()
    }

    /// First and last date covered by the series.
    pub fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.first()?.date, self.last()?.date))
    }

    /// Window covering the whole series.
    pub fn full_window(&self) -> Option<DateWindow> {
        let (start, end) = self.bounds()?;
        DateWindow::new(start, end)
    }
}

/// All series of a load, keyed by instrument (case-sensitive).
///
/// Backed by a `BTreeMap`, so iteration and `keys()` are lexicographic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesMap {
    series: BTreeMap<String, Series>,
}

impl SeriesMap {
    pub fn get(&self, key: &str) -> Option<&Series> {
        self.series.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.series.contains_key(key)
    }

    /// Selectable instrument keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        self.series.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Series> {
        self.series.values()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Total observations across all keys.
    pub fn observation_count(&self) -> usize {
        self.series.values().map(Series::len).sum()
    }
}

impl FromIterator<Series> for SeriesMap {
    fn from_iter<T: IntoIterator<Item = Series>>(iter: T) -> Self {
        Self {
            series: iter.into_iter().map(|s| (s.key.clone(), s)).collect(),
        }
    }
}

/// Inclusive date range, `start <= end` by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    /// `None` when `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn edge(&self, edge: WindowEdge) -> NaiveDate {
        match edge {
            WindowEdge::Start => self.start,
            WindowEdge::End => self.end,
        }
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} .. {}",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT)
        )
    }
}

/// Which side of a window a user edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum WindowEdge {
    Start,
    End,
}

impl fmt::Display for WindowEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowEdge::Start => f.write_str("start"),
            WindowEdge::End => f.write_str("end"),
        }
    }
}

/// Window shortcuts offered by the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum Preset {
    #[value(name = "1m")]
    OneMonth,
    #[value(name = "6m")]
    SixMonths,
    #[value(name = "1y")]
    OneYear,
    #[value(name = "5y")]
    FiveYears,
}

impl Preset {
    pub const ALL: [Preset; 4] = [
        Preset::OneMonth,
        Preset::SixMonths,
        Preset::OneYear,
        Preset::FiveYears,
    ];

    pub fn months(self) -> u32 {
        match self {
            Preset::OneMonth => 1,
            Preset::SixMonths => 6,
            Preset::OneYear => 12,
            Preset::FiveYears => 60,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Preset::OneMonth => "1M",
            Preset::SixMonths => "6M",
            Preset::OneYear => "1Y",
            Preset::FiveYears => "5Y",
        }
    }
}

/// Where the shell is in its load lifecycle.
#[derive(Debug, Clone, Default)]
pub enum LoadState {
    #[default]
    Loading,
    Loaded(SeriesMap),
    Failed {
        reason: String,
    },
}

impl LoadState {
    /// The loaded map, if any. `Loading` and `Failed` have none.
    pub fn series_map(&self) -> Option<&SeriesMap> {
        match self {
            LoadState::Loaded(map) => Some(map),
            LoadState::Loading | LoadState::Failed { .. } => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn series_sort_is_stable_for_equal_dates() {
        let s = Series::new(
            "AAA",
            vec![
                Observation::new(d(2023, 2, 1), 3.0),
                Observation::new(d(2023, 1, 1), 1.0),
                Observation::new(d(2023, 1, 1), 2.0),
            ],
        );
        let prices: Vec<f64> = s.observations().iter().map(|o| o.price).collect();
        assert_eq!(prices, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn window_rejects_inverted_bounds() {
        assert!(DateWindow::new(d(2023, 2, 1), d(2023, 1, 1)).is_none());
        let w = DateWindow::new(d(2023, 1, 1), d(2023, 1, 1)).unwrap();
        assert!(w.contains(d(2023, 1, 1)));
        assert_eq!(w.to_string(), "2023-01-01 .. 2023-01-01");
    }

    #[test]
    fn series_map_keys_are_sorted() {
        let map: SeriesMap = ["ZZZ", "AAA", "MMM"]
            .into_iter()
            .map(|k| Series::new(k, vec![Observation::new(d(2023, 1, 1), 1.0)]))
            .collect();
        assert_eq!(map.keys(), vec!["AAA", "MMM", "ZZZ"]);
        assert_eq!(map.observation_count(), 3);
    }

    #[test]
    fn failed_state_has_no_map() {
        let state = LoadState::Failed {
            reason: "boom".to_string(),
        };
        assert!(state.series_map().is_none());
        assert!(LoadState::default().is_loading());
    }
}
