//! CLI entry point for the county AQI downloader.
//!
//! Downloads the EPA's yearly daily-AQI-by-county archives, reduces them to
//! one row per county and year, and writes a CSV for the dashboard.

use anyhow::{Result, bail};
use aqi_county_etl::{
    fetch::{ArchiveSource, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, DirSource, HttpSource},
    output::print_json,
    parser::parse_archive,
    pipeline::{DEFAULT_END_YEAR, DEFAULT_OUTPUT, DEFAULT_START_YEAR, PipelineConfig, run},
    schema::resolve_columns,
};
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "aqi_county_etl")]
#[command(about = "Download and aggregate EPA daily AQI data by county", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Args, Clone)]
struct SourceArgs {
    /// Base URL the yearly archives are published under
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Read daily_aqi_by_county_{year}.zip files from this directory instead of downloading
    #[arg(long)]
    archive_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Download every year in range, aggregate, and write the county CSV
    Run {
        /// First year to download
        #[arg(long, default_value_t = DEFAULT_START_YEAR)]
        start_year: i32,

        /// Last year to download (inclusive)
        #[arg(long, default_value_t = DEFAULT_END_YEAR)]
        end_year: i32,

        /// CSV file to write
        #[arg(short, long, default_value = DEFAULT_OUTPUT)]
        output: PathBuf,

        /// Also print the yearly summary as JSON on stdout
        #[arg(long, default_value_t = false)]
        json: bool,

        #[command(flatten)]
        source: SourceArgs,
    },
    /// Show how one year's columns map onto the canonical schema
    Columns {
        /// Year whose archive to inspect
        #[arg(long)]
        year: i32,

        #[command(flatten)]
        source: SourceArgs,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/aqi_county_etl.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("aqi_county_etl.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run {
            start_year,
            end_year,
            output,
            json,
            source,
        }) => {
            let config = PipelineConfig {
                years: start_year..=end_year,
                output,
            };
            run_pipeline(&source, &config, json)?;
        }
        Some(Commands::Columns { year, source }) => {
            show_columns(&source, year)?;
        }
        None => {
            run_pipeline(&SourceArgs::default(), &PipelineConfig::default(), false)?;
        }
    }

    Ok(())
}

impl Default for SourceArgs {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            archive_dir: None,
        }
    }
}

/// Picks the local directory source when one is given, HTTP otherwise.
fn build_source(args: &SourceArgs) -> Result<Box<dyn ArchiveSource>> {
    let source: Box<dyn ArchiveSource> = match &args.archive_dir {
        Some(dir) => Box::new(DirSource::new(dir)),
        None => Box::new(HttpSource::new(
            args.base_url.clone(),
            Duration::from_secs(args.timeout_secs),
        )?),
    };
    Ok(source)
}

#[tracing::instrument(skip_all, fields(years = ?config.years, output = %config.output.display()))]
fn run_pipeline(args: &SourceArgs, config: &PipelineConfig, json: bool) -> Result<()> {
    let source = build_source(args)?;
    let report = run(&*source, config)?;

    if !report.years_skipped.is_empty() {
        warn!(skipped = ?report.years_skipped, "Some years produced no data");
    }

    if json {
        print_json(std::io::stdout().lock(), &report.summary)?;
    }

    info!(
        path = %report.output.display(),
        rows = report.yearly.rows.len(),
        "AQI data processing complete"
    );
    info!("Counties without FIPS codes may need to be matched manually for the dashboard");
    Ok(())
}

#[tracing::instrument(skip(args))]
fn show_columns(args: &SourceArgs, year: i32) -> Result<()> {
    let source = build_source(args)?;
    let bytes = source.fetch_archive(year)?;
    let table = parse_archive(&bytes)?;

    info!(entry = %table.entry_name, rows = table.rows.len(), columns = ?table.headers, "Archive loaded");

    match resolve_columns(&table.headers) {
        Ok(mapping) => {
            for (field, column) in mapping.describe(&table.headers) {
                info!(
                    field = field.name(),
                    column = column.unwrap_or("<unresolved>"),
                    required = field.is_required(),
                    "Column mapping"
                );
            }
            Ok(())
        }
        Err(e) => bail!("{year}: {e}"),
    }
}
