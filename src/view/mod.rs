//! Projection of a series onto the current window.
//!
//! A `ViewSlice` is a derived value: it borrows from the series and is
//! recomputed from `(key, series map, window)` whenever any of them changes.

use crate::domain::{DateWindow, Observation, Series};

/// The observations of one series that fall inside a window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewSlice<'a> {
    pub key: &'a str,
    pub window: DateWindow,
    pub observations: &'a [Observation],
}

impl<'a> ViewSlice<'a> {
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn first(&self) -> Option<&'a Observation> {
        self.observations.first()
    }

    pub fn last(&self) -> Option<&'a Observation> {
        self.observations.last()
    }

    /// Last price minus first price; `0.0` with fewer than two points.
    pub fn profitability_delta(&self) -> f64 {
        profitability_delta(self.observations)
    }

    /// Lowest and highest price in the slice.
    pub fn price_range(&self) -> Option<(f64, f64)> {
        price_range(self.observations)
    }
}

/// Restrict `series` to `window.start <= date <= window.end`.
///
/// Series are sorted by date, so the result is a contiguous sub-slice found by
/// binary search. An empty slice is a normal result, not an error.
pub fn project<'a>(series: &'a Series, window: DateWindow) -> ViewSlice<'a> {
    let obs = series.observations();
    let lo = obs.partition_point(|o| o.date < window.start());
    let hi = obs.partition_point(|o| o.date <= window.end());
    ViewSlice {
        key: series.key(),
        window,
        observations: &obs[lo..hi.max(lo)],
    }
}

/// Last price minus first price; `0.0` with fewer than two points.
pub fn profitability_delta(observations: &[Observation]) -> f64 {
    match observations {
        [first, .., last] => last.price - first.price,
        _ => 0.0,
    }
}

fn price_range(observations: &[Observation]) -> Option<(f64, f64)> {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for o in observations {
        lo = lo.min(o.price);
        hi = hi.max(o.price);
    }
    (lo.is_finite() && hi.is_finite()).then_some((lo, hi))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn sample() -> Series {
        Series::new(
            "AAA",
            vec![
                Observation::new(d(2023, 1, 1), 10.0),
                Observation::new(d(2023, 1, 15), 11.0),
                Observation::new(d(2023, 2, 1), 12.0),
                Observation::new(d(2023, 3, 1), 9.5),
            ],
        )
    }

    #[test]
    fn projection_is_inclusive_on_both_ends() {
        let s = sample();
        let w = DateWindow::new(d(2023, 1, 15), d(2023, 2, 1)).unwrap();
        let slice = project(&s, w);
        assert_eq!(slice.len(), 2);
        assert_eq!(slice.first().unwrap().price, 11.0);
        assert_eq!(slice.last().unwrap().price, 12.0);
        assert_eq!(slice.key, "AAA");
    }

    #[test]
    fn full_range_returns_whole_series() {
        let s = sample();
        let slice = project(&s, s.full_window().unwrap());
        assert_eq!(slice.observations, s.observations());
        assert_eq!(slice.profitability_delta(), -0.5);
    }

    #[test]
    fn window_outside_data_is_empty() {
        let s = sample();
        let w = DateWindow::new(d(2024, 1, 1), d(2024, 6, 1)).unwrap();
        let slice = project(&s, w);
        assert!(slice.is_empty());
        assert_eq!(slice.profitability_delta(), 0.0);
        assert_eq!(slice.price_range(), None);
    }

    #[test]
    fn delta_needs_two_points() {
        assert_eq!(profitability_delta(&[]), 0.0);
        assert_eq!(profitability_delta(&[Observation::new(d(2023, 1, 1), 7.0)]), 0.0);
        assert_eq!(
            profitability_delta(&[
                Observation::new(d(2023, 1, 1), 10.0),
                Observation::new(d(2023, 2, 1), 12.0),
            ]),
            2.0
        );
    }

    #[test]
    fn price_range_spans_slice() {
        let s = sample();
        let slice = project(&s, s.full_window().unwrap());
        assert_eq!(slice.price_range(), Some((9.5, 12.0)));
    }
}
