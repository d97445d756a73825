//! Data types used by the aggregation pipeline.

use serde::Serialize;

/// One provider row mapped onto the canonical schema. Several readings can
/// share a county and date when more than one site reports.
///
/// `date` is a grouping key only: ISO `YYYY-MM-DD` when the provider's format
/// is recognised, the trimmed cell otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyReading {
    pub date: String,
    pub state_name: String,
    pub county_name: String,
    pub aqi: f64,
    pub state_code: Option<u32>,
    pub county_code: Option<u32>,
}

/// A single county-day after duplicate readings were averaged, stamped with
/// the year of the archive it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedDailyRecord {
    pub date: String,
    pub state_name: String,
    pub county_name: String,
    pub aqi: f64,
    pub state_code: Option<u32>,
    pub county_code: Option<u32>,
    pub year: i32,
}

/// Yearly statistics for one county, the row type of the output file.
///
/// `fips` is only set when code columns were present somewhere in the input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyCountyStat {
    pub year: i32,
    pub state_name: String,
    pub county_name: String,
    pub avg_aqi: f64,
    pub max_aqi: f64,
    pub min_aqi: f64,
    pub days_count: usize,
    pub state_code: Option<u32>,
    pub county_code: Option<u32>,
    pub fips: Option<String>,
}

/// Across-county statistics for a single year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearSummary {
    pub year: i32,
    pub avg_aqi: f64,
    pub max_aqi: f64,
    pub min_aqi: f64,
    pub days_count: usize,
}
