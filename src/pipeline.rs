//! Sequential year-by-year pipeline: fetch, normalize, aggregate, write.

use crate::aggregators::daily::aggregate_daily;
use crate::aggregators::summary::summarize_by_year;
use crate::aggregators::types::{NormalizedDailyRecord, YearSummary};
use crate::aggregators::yearly::{YearlyAggregate, aggregate_yearly};
use crate::error::{PipelineError, YearError};
use crate::fetch::ArchiveSource;
use crate::output::{print_summary, write_csv};
use crate::parser::parse_archive;
use crate::schema::{normalize, resolve_columns};
use std::ops::RangeInclusive;
use std::path::PathBuf;
use tracing::{error, info, warn};

pub const DEFAULT_START_YEAR: i32 = 2018;
pub const DEFAULT_END_YEAR: i32 = 2023;
pub const DEFAULT_OUTPUT: &str = "aqi_data_by_county.csv";

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub years: RangeInclusive<i32>,
    pub output: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            years: DEFAULT_START_YEAR..=DEFAULT_END_YEAR,
            output: PathBuf::from(DEFAULT_OUTPUT),
        }
    }
}

/// What a completed run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub years_loaded: Vec<i32>,
    pub years_skipped: Vec<i32>,
    pub total_records: usize,
    pub yearly: YearlyAggregate,
    pub summary: Vec<YearSummary>,
    pub output: PathBuf,
}

/// Fetches one year's archive and reduces it to one record per county-day.
#[tracing::instrument(skip(source), fields(location = %source.location(year)))]
pub fn process_year<S: ArchiveSource + ?Sized>(
    source: &S,
    year: i32,
) -> Result<Vec<NormalizedDailyRecord>, YearError> {
    info!("Downloading AQI data");
    let bytes = source.fetch_archive(year)?;

    let table = parse_archive(&bytes)?;
    info!(entry = %table.entry_name, columns = ?table.headers, "Columns in archive");

    let mapping = resolve_columns(&table.headers)?;
    let normalized = normalize(&table, &mapping);
    if normalized.readings.is_empty() {
        return Err(YearError::NoRows {
            dropped: normalized.dropped,
        });
    }

    let daily = aggregate_daily(year, normalized.readings);
    info!(
        records = daily.len(),
        raw_rows = table.rows.len(),
        dropped = normalized.dropped,
        "Processed records"
    );
    Ok(daily)
}

/// Loads every year in `years`, skipping years that fail. Returns the
/// concatenated records and the years that were loaded and skipped.
pub fn collect_years<S: ArchiveSource + ?Sized>(
    source: &S,
    years: RangeInclusive<i32>,
) -> (Vec<NormalizedDailyRecord>, Vec<i32>, Vec<i32>) {
    let mut all = Vec::new();
    let mut loaded = Vec::new();
    let mut skipped = Vec::new();

    for year in years {
        match process_year(source, year) {
            Ok(mut records) => {
                all.append(&mut records);
                loaded.push(year);
            }
            Err(e) => {
                warn!(year, error = %e, "Skipping year");
                skipped.push(year);
            }
        }
    }

    (all, loaded, skipped)
}

/// Runs the whole pipeline and writes `config.output`.
///
/// Nothing is written if no year produced data.
pub fn run<S: ArchiveSource + ?Sized>(
    source: &S,
    config: &PipelineConfig,
) -> Result<RunReport, PipelineError> {
    let (start, end) = (*config.years.start(), *config.years.end());
    if config.years.is_empty() {
        return Err(PipelineError::InvalidYearRange { start, end });
    }

    let (combined, years_loaded, years_skipped) = collect_years(source, config.years.clone());

    if combined.is_empty() {
        error!(start, end, "No data downloaded. Exiting.");
        return Err(PipelineError::NoData { start, end });
    }
    info!(total_records = combined.len(), "Combined all years");

    let yearly = aggregate_yearly(&combined);
    info!(
        rows = yearly.rows.len(),
        has_codes = yearly.has_codes,
        dropped_unresolved = yearly.dropped_unresolved,
        "Yearly statistics by county"
    );

    write_csv(&config.output, &yearly)?;
    info!(path = %config.output.display(), "Data saved");

    let summary = summarize_by_year(&yearly.rows);
    info!("Summary by year:");
    print_summary(&summary);

    Ok(RunReport {
        years_loaded,
        years_skipped,
        total_records: combined.len(),
        yearly,
        summary,
        output: config.output.clone(),
    })
}
