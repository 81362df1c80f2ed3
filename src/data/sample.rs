//! Synthetic price table generation.
//!
//! Produces a deterministic multi-instrument dataset in the canonical
//! `Date,TICKER,Close_Price_Raw` layout, useful for demos and tests.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{DATE_FORMAT, PriceRecord};
use crate::error::AppError;

/// Annualized drift of the simulated paths.
const ANNUAL_DRIFT: f64 = 0.06;
/// Trading days per year used to scale drift and volatility.
const TRADING_DAYS: f64 = 252.0;

#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub keys: Vec<String>,
    /// Number of business days per key.
    pub days: usize,
    /// Last date of the generated range.
    pub end: NaiveDate,
    pub seed: u64,
}

/// Generate geometric-Brownian-motion closes for every key.
///
/// Rows are emitted date-major (all keys for a day, then the next day), so
/// consumers cannot rely on the table being grouped by key.
pub fn generate_sample(config: &SampleConfig) -> Result<Vec<PriceRecord>, AppError> {
    if config.keys.is_empty() {
        return Err(AppError::new(2, "At least one key is required."));
    }
    if config.days == 0 {
        return Err(AppError::new(2, "Day count must be > 0."));
    }

    let dates = business_days_ending(config.end, config.days);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let mut paths = Vec::with_capacity(config.keys.len());
    for key in &config.keys {
        let mut rng = StdRng::seed_from_u64(key_seed(config.seed, key));
        let start_price = rng.gen_range(20.0..400.0_f64);
        let annual_vol = rng.gen_range(0.15..0.55_f64);

        let dt = 1.0 / TRADING_DAYS;
        let drift = (ANNUAL_DRIFT - 0.5 * annual_vol * annual_vol) * dt;
        let shock = annual_vol * dt.sqrt();

        let mut price = start_price;
        let mut closes = Vec::with_capacity(dates.len());
        for _ in &dates {
            closes.push((price * 100.0).round() / 100.0);
            price *= (drift + shock * normal.sample(&mut rng)).exp();
        }
        paths.push(closes);
    }

    let mut rows = Vec::with_capacity(dates.len() * config.keys.len());
    for (i, date) in dates.iter().enumerate() {
        for (key, closes) in config.keys.iter().zip(&paths) {
            rows.push(PriceRecord {
                key: key.clone(),
                date: *date,
                price: closes[i],
            });
        }
    }
    Ok(rows)
}

/// Write records as a headed CSV table.
pub fn write_sample_csv(path: &Path, rows: &[PriceRecord]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(4, format!("Failed to create '{}': {e}", path.display())))?;

    writer
        .write_record(["Date", "TICKER", "Close_Price_Raw"])
        .map_err(|e| AppError::new(4, format!("Failed to write sample header: {e}")))?;
    for r in rows {
        writer
            .write_record([
                r.date.format(DATE_FORMAT).to_string(),
                r.key.clone(),
                format!("{:.2}", r.price),
            ])
            .map_err(|e| AppError::new(4, format!("Failed to write sample row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(4, format!("Failed to flush '{}': {e}", path.display())))?;
    Ok(())
}

/// `n` weekdays ending at (or before) `end`, ascending.
fn business_days_ending(end: NaiveDate, n: usize) -> Vec<NaiveDate> {
    let mut out = Vec::with_capacity(n);
    let mut day = end;
    while out.len() < n {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            out.push(day);
        }
        day -= Duration::days(1);
    }
    out.reverse();
    out
}

fn key_seed(seed: u64, key: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    key.hash(&mut hasher);
    hasher.finish()
}
