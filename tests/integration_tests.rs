use aqi_county_etl::error::{FetchError, PipelineError};
use aqi_county_etl::fetch::ArchiveSource;
use aqi_county_etl::pipeline::{PipelineConfig, process_year, run};
use std::collections::HashMap;
use std::fs;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;

const EPA_HEADER: &str = "State Name,county Name,State Code,County Code,Date,AQI,Category,Defining Parameter,Defining Site,Number of Sites Reporting";

/// Serves archives from memory; years without an entry answer 404.
struct MemorySource {
    archives: HashMap<i32, Vec<u8>>,
}

impl MemorySource {
    fn new(archives: Vec<(i32, Vec<u8>)>) -> Self {
        Self {
            archives: archives.into_iter().collect(),
        }
    }
}

impl ArchiveSource for MemorySource {
    fn location(&self, year: i32) -> String {
        format!("memory://daily_aqi_by_county_{year}.zip")
    }

    fn fetch_archive(&self, year: i32) -> Result<Vec<u8>, FetchError> {
        self.archives
            .get(&year)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: self.location(year),
                status: reqwest::StatusCode::NOT_FOUND,
            })
    }
}

fn zip_csv(name: &str, body: &str) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
        zip.start_file(name, SimpleFileOptions::default()).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
        zip.finish().unwrap();
    }
    buf
}

fn epa_archive(year: i32, rows: &[&str]) -> Vec<u8> {
    let mut body = format!("{EPA_HEADER}\n");
    for row in rows {
        body.push_str(row);
        body.push('\n');
    }
    zip_csv(&format!("daily_aqi_by_county_{year}.csv"), &body)
}

fn archive_2019() -> Vec<u8> {
    epa_archive(
        2019,
        &[
            "Alabama,Baldwin,01,003,2019-01-01,30,Good,PM2.5,01-003-0010,1",
            "Alabama,Baldwin,01,003,2019-01-02,50,Good,PM2.5,01-003-0010,1",
            "California,Los Angeles,06,037,2019-01-01,40,Good,Ozone,06-037-1103,2",
            "California,Los Angeles,06,037,2019-01-01,60,Moderate,PM2.5,06-037-4004,2",
            "California,Los Angeles,06,037,2019-01-02,101,Unhealthy for Sensitive Groups,PM2.5,06-037-1103,1",
            "Country Of Mexico,BAJA CALIFORNIA NORTE,CC,xx,2019-01-01,44,Good,PM2.5,80-002-0001,1",
        ],
    )
}

fn config_in(dir: &tempfile::TempDir, start: i32, end: i32) -> PipelineConfig {
    PipelineConfig {
        years: start..=end,
        output: dir.path().join("aqi_data_by_county.csv"),
    }
}

#[test]
fn test_full_pipeline() {
    let no_aqi = zip_csv(
        "daily_aqi_by_county_2020.csv",
        "State Name,county Name,Date,Category\nAlabama,Baldwin,2020-01-01,Good\n",
    );
    let source = MemorySource::new(vec![(2019, archive_2019()), (2020, no_aqi)]);
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir, 2019, 2021);

    let report = run(&source, &config).expect("pipeline should succeed");

    assert_eq!(report.years_loaded, vec![2019]);
    assert_eq!(report.years_skipped, vec![2020, 2021]);
    // Baldwin x2, Los Angeles x2 (duplicate site merged); Mexico has no usable codes
    assert_eq!(report.total_records, 4);
    assert_eq!(report.yearly.dropped_unresolved, 0);

    let content = fs::read_to_string(&config.output).unwrap();
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(
        lines,
        vec![
            "year,state_name,county_name,avg_aqi,max_aqi,min_aqi,days_count,state_code,county_code,fips",
            "2019,Alabama,Baldwin,40.0,50.0,30.0,2,1,3,01003",
            "2019,California,Los Angeles,75.5,101.0,50.0,2,6,37,06037",
        ]
    );

    assert_eq!(report.summary.len(), 1);
    let s = &report.summary[0];
    assert_eq!(s.year, 2019);
    assert_eq!(s.avg_aqi, 57.75);
    assert_eq!(s.max_aqi, 101.0);
    assert_eq!(s.min_aqi, 30.0);
    assert_eq!(s.days_count, 4);
}

#[test]
fn test_missing_aqi_column_skips_year() {
    let no_aqi = zip_csv(
        "daily_aqi_by_county_2020.csv",
        "State Name,county Name,Date,Category\nAlabama,Baldwin,2020-01-01,Good\n",
    );
    let source = MemorySource::new(vec![(2020, no_aqi)]);

    let err = process_year(&source, 2020).unwrap_err();
    assert!(err.to_string().contains("could not find required columns"));
}

#[test]
fn test_all_years_fail_writes_nothing() {
    let source = MemorySource::new(vec![(2018, zip_csv("notes.txt", "empty"))]);
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir, 2018, 2020);

    let err = run(&source, &config).unwrap_err();

    assert!(matches!(err, PipelineError::NoData { start: 2018, end: 2020 }));
    assert!(err.to_string().contains("no data downloaded"));
    assert!(!config.output.exists());
}

#[test]
fn test_invalid_year_range() {
    let source = MemorySource::new(vec![]);
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir, 2023, 2018);

    let err = run(&source, &config).unwrap_err();
    assert!(matches!(err, PipelineError::InvalidYearRange { .. }));
}

#[test]
fn test_runs_are_byte_identical() {
    let source = MemorySource::new(vec![(2019, archive_2019())]);
    let dir = tempfile::tempdir().unwrap();

    let first = PipelineConfig {
        years: 2019..=2019,
        output: dir.path().join("first.csv"),
    };
    let second = PipelineConfig {
        years: 2019..=2019,
        output: dir.path().join("second.csv"),
    };
    run(&source, &first).unwrap();
    run(&source, &second).unwrap();

    assert_eq!(
        fs::read(&first.output).unwrap(),
        fs::read(&second.output).unwrap()
    );
}

#[test]
fn test_without_code_columns_fips_is_omitted() {
    let archive = zip_csv(
        "daily_aqi_by_county_2022.csv",
        "Date,State Name,County Name,AQI\n2022-06-01,Ohio,Franklin,20\n2022-06-02,Ohio,Franklin,35\n",
    );
    let source = MemorySource::new(vec![(2022, archive)]);
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir, 2022, 2022);

    let report = run(&source, &config).unwrap();

    assert!(!report.yearly.has_codes);
    let content = fs::read_to_string(&config.output).unwrap();
    assert_eq!(
        content,
        "year,state_name,county_name,avg_aqi,max_aqi,min_aqi,days_count\n2022,Ohio,Franklin,27.5,35.0,20.0,2\n"
    );
}

#[test]
fn test_year_without_codes_is_dropped_when_others_have_them() {
    let without_codes = zip_csv(
        "daily_aqi_by_county_2020.csv",
        "Date,State Name,County Name,AQI\n2020-06-01,Ohio,Franklin,20\n",
    );
    let source = MemorySource::new(vec![(2019, archive_2019()), (2020, without_codes)]);
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir, 2019, 2020);

    let report = run(&source, &config).unwrap();

    assert_eq!(report.years_loaded, vec![2019, 2020]);
    assert!(report.yearly.has_codes);
    assert!(report.yearly.rows.iter().all(|r| r.year == 2019));
    assert_eq!(report.yearly.dropped_unresolved, 1);
}

#[test]
fn test_bad_code_rows_do_not_leak_into_fips() {
    let archive = epa_archive(
        2019,
        &[
            "California,Los Angeles,06,xx,2019-01-01,40,Good,PM2.5,06-037-1103,1",
            "California,Los Angeles,06,037,2019-01-02,60,Moderate,PM2.5,06-037-1103,1",
            "California,Los Angeles,06,037,2019-01-03,80,Moderate,PM2.5,06-037-1103,1",
        ],
    );
    let source = MemorySource::new(vec![(2019, archive)]);
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir, 2019, 2019);

    let report = run(&source, &config).unwrap();

    assert_eq!(report.yearly.rows.len(), 1);
    let la = &report.yearly.rows[0];
    assert_eq!(la.fips.as_deref(), Some("06037"));
    assert_eq!(la.days_count, 2);
    assert_eq!(la.avg_aqi, 70.0);

    let content = fs::read_to_string(&config.output).unwrap();
    assert!(content.contains("2019,California,Los Angeles,70.0,80.0,60.0,2,6,37,06037"));
}

#[test]
fn test_unusual_date_format_still_processes() {
    let archive = zip_csv(
        "daily_aqi_by_county_2019.csv",
        "Date,State Name,County Name,AQI\n2019-01-01 00:00:00,Ohio,Franklin,20\n2019-01-01 00:00:00,Ohio,Franklin,40\n2019-01-02 00:00:00,Ohio,Franklin,50\n",
    );
    let source = MemorySource::new(vec![(2019, archive)]);

    let records = process_year(&source, 2019).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].date, "2019-01-01 00:00:00");
    assert_eq!(records[0].aqi, 30.0);
}
