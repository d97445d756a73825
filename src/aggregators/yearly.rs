use crate::aggregators::types::{NormalizedDailyRecord, YearlyCountyStat};
use crate::aggregators::utility::mean;
use std::collections::BTreeMap;

/// FIPS produced when neither code could be resolved.
const UNRESOLVED_FIPS: &str = "00000";

/// Result of the yearly reduction.
#[derive(Debug, Clone, Default)]
pub struct YearlyAggregate {
    pub rows: Vec<YearlyCountyStat>,
    /// Whether any input record carried a state or county code. Controls
    /// whether the code and FIPS columns are written.
    pub has_codes: bool,
    /// Groups removed because their FIPS came out as `00000`.
    pub dropped_unresolved: usize,
}

struct CountyGroup {
    values: Vec<f64>,
    // taken from the first record seen for the group
    state_code: Option<u32>,
    county_code: Option<u32>,
}

/// Zero-pads the state code to two digits and the county code to three.
pub fn derive_fips(state_code: u32, county_code: u32) -> String {
    format!("{state_code:02}{county_code:03}")
}

/// Reduces daily records to one row per (year, state, county) with mean, max,
/// min and count of AQI.
///
/// When codes exist anywhere in the input, each group takes the code pair of
/// its first record, missing codes become 0, and groups whose FIPS is
/// `00000` are dropped. A county whose codes differ between its daily rows
/// keeps whichever pair came first in `records`.
pub fn aggregate_yearly(records: &[NormalizedDailyRecord]) -> YearlyAggregate {
    let has_codes = records
        .iter()
        .any(|r| r.state_code.is_some() || r.county_code.is_some());

    let mut groups: BTreeMap<(i32, &str, &str), CountyGroup> = BTreeMap::new();

    for r in records {
        groups
            .entry((r.year, r.state_name.as_str(), r.county_name.as_str()))
            .or_insert_with(|| CountyGroup {
                values: Vec::new(),
                state_code: r.state_code,
                county_code: r.county_code,
            })
            .values
            .push(r.aqi);
    }

    let mut rows = Vec::with_capacity(groups.len());
    let mut dropped_unresolved = 0;

    for ((year, state_name, county_name), group) in groups {
        let max_aqi = group.values.iter().copied().fold(f64::MIN, f64::max);
        let min_aqi = group.values.iter().copied().fold(f64::MAX, f64::min);

        let mut stat = YearlyCountyStat {
            year,
            state_name: state_name.to_string(),
            county_name: county_name.to_string(),
            avg_aqi: mean(&group.values),
            max_aqi,
            min_aqi,
            days_count: group.values.len(),
            state_code: None,
            county_code: None,
            fips: None,
        };

        if has_codes {
            let state_code = group.state_code.unwrap_or(0);
            let county_code = group.county_code.unwrap_or(0);
            let fips = derive_fips(state_code, county_code);
            if fips == UNRESOLVED_FIPS {
                dropped_unresolved += 1;
                continue;
            }
            stat.state_code = Some(state_code);
            stat.county_code = Some(county_code);
            stat.fips = Some(fips);
        }

        rows.push(stat);
    }

    YearlyAggregate {
        rows,
        has_codes,
        dropped_unresolved,
    }
}
