//! Grouping parsed records into per-key series.

use std::collections::HashMap;

use rayon::prelude::*;
use tracing::debug;

use crate::domain::{Observation, PriceRecord, Series, SeriesMap};

/// Group records by instrument key and sort each group by date.
///
/// Within one key, records sharing a date keep their input order. The map is
/// complete before it is returned; callers never see a partial build.
pub fn build_series_map(records: Vec<PriceRecord>) -> SeriesMap {
    let mut groups: HashMap<String, Vec<Observation>> = HashMap::new();
    for record in records {
        groups
            .entry(record.key)
            .or_default()
            .push(Observation::new(record.date, record.price));
    }

    let series: Vec<Series> = groups
        .into_par_iter()
        .map(|(key, observations)| Series::new(key, observations))
        .collect();
    let map: SeriesMap = series.into_iter().collect();

    debug!(
        keys = map.len(),
        observations = map.observation_count(),
        "built series map"
    );
    map
}
