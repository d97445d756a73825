use crate::aggregators::types::{DailyReading, NormalizedDailyRecord};
use crate::aggregators::utility::mean;
use std::collections::BTreeMap;

type DailyKey = (String, String, String, Option<u32>, Option<u32>);

/// Collapses readings that share (date, state, county, codes) into a single
/// record whose AQI is the mean of the group, and stamps every record with
/// `year`.
///
/// Output is ordered by the grouping key.
pub fn aggregate_daily(year: i32, readings: Vec<DailyReading>) -> Vec<NormalizedDailyRecord> {
    let mut groups: BTreeMap<DailyKey, Vec<f64>> = BTreeMap::new();

    for r in readings {
        groups
            .entry((r.date, r.state_name, r.county_name, r.state_code, r.county_code))
            .or_default()
            .push(r.aqi);
    }

    groups
        .into_iter()
        .map(
            |((date, state_name, county_name, state_code, county_code), values)| {
                NormalizedDailyRecord {
                    date,
                    state_name,
                    county_name,
                    aqi: mean(&values),
                    state_code,
                    county_code,
                    year,
                }
            },
        )
        .collect()
}
