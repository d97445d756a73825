use crate::aggregators::types::{YearSummary, YearlyCountyStat};
use crate::aggregators::utility::{mean, round2};
use std::collections::BTreeMap;

/// Summarises county rows per year: mean of `avg_aqi`, max of `max_aqi`,
/// min of `min_aqi` and total `days_count`, floats rounded to two decimals.
pub fn summarize_by_year(rows: &[YearlyCountyStat]) -> Vec<YearSummary> {
    let mut by_year: BTreeMap<i32, Vec<&YearlyCountyStat>> = BTreeMap::new();
    for row in rows {
        by_year.entry(row.year).or_default().push(row);
    }

    by_year
        .into_iter()
        .map(|(year, counties)| {
            let avgs: Vec<f64> = counties.iter().map(|c| c.avg_aqi).collect();
            let max_aqi = counties.iter().map(|c| c.max_aqi).fold(f64::MIN, f64::max);
            let min_aqi = counties.iter().map(|c| c.min_aqi).fold(f64::MAX, f64::min);

            YearSummary {
                year,
                avg_aqi: round2(mean(&avgs)),
                max_aqi: round2(max_aqi),
                min_aqi: round2(min_aqi),
                days_count: counties.iter().map(|c| c.days_count).sum(),
            }
        })
        .collect()
}
