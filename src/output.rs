//! Output formatting and persistence for county statistics.
//!
//! Writes the yearly CSV and logs the per-year summary as a table or JSON.

use anyhow::Result;
use tracing::info;

use crate::aggregators::types::{YearSummary, YearlyCountyStat};
use crate::aggregators::yearly::YearlyAggregate;
use crate::error::PipelineError;
use csv::WriterBuilder;
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub const BASE_COLUMNS: &[&str] = &[
    "year",
    "state_name",
    "county_name",
    "avg_aqi",
    "max_aqi",
    "min_aqi",
    "days_count",
];

pub const CODE_COLUMNS: &[&str] = &["state_code", "county_code", "fips"];

pub fn header(has_codes: bool) -> Vec<&'static str> {
    let mut cols = BASE_COLUMNS.to_vec();
    if has_codes {
        cols.extend_from_slice(CODE_COLUMNS);
    }
    cols
}

/// Shortest round-trip form that always keeps a decimal point (`45.0`).
pub fn format_float(value: f64) -> String {
    format!("{value:?}")
}

fn to_record(stat: &YearlyCountyStat, has_codes: bool) -> Vec<String> {
    let mut record = vec![
        stat.year.to_string(),
        stat.state_name.clone(),
        stat.county_name.clone(),
        format_float(stat.avg_aqi),
        format_float(stat.max_aqi),
        format_float(stat.min_aqi),
        stat.days_count.to_string(),
    ];
    if has_codes {
        record.push(stat.state_code.map(|c| c.to_string()).unwrap_or_default());
        record.push(stat.county_code.map(|c| c.to_string()).unwrap_or_default());
        record.push(stat.fips.clone().unwrap_or_default());
    }
    record
}

/// Writes one row per (year, state, county) to `path`, replacing any
/// existing file. Code columns are included only when `has_codes` is set.
pub fn write_csv(path: &Path, yearly: &YearlyAggregate) -> Result<(), PipelineError> {
    let file = File::create(path).map_err(|e| PipelineError::Write(path.to_path_buf(), e))?;
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

    writer.write_record(header(yearly.has_codes))?;
    for stat in &yearly.rows {
        writer.write_record(to_record(stat, yearly.has_codes))?;
    }

    writer
        .flush()
        .map_err(|e| PipelineError::Write(path.to_path_buf(), e))?;
    Ok(())
}

/// Logs the per-year summary as an aligned table.
pub fn print_summary(summary: &[YearSummary]) {
    info!(
        "{:>6} {:>10} {:>10} {:>10} {:>12}",
        "year", "avg_aqi", "max_aqi", "min_aqi", "days_count"
    );
    for s in summary {
        info!(
            "{:>6} {:>10.2} {:>10.2} {:>10.2} {:>12}",
            s.year, s.avg_aqi, s.max_aqi, s.min_aqi, s.days_count
        );
    }
}

/// Writes the per-year summary to `out` as pretty-printed JSON.
pub fn print_json<W: Write>(mut out: W, summary: &[YearSummary]) -> Result<()> {
    serde_json::to_writer_pretty(&mut out, summary)?;
    writeln!(out)?;
    Ok(())
}
