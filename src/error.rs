//! Error taxonomy for the AQI pipeline.
//!
//! Everything in [`YearError`] is recoverable: the pipeline logs it and moves
//! on to the next year. [`PipelineError`] ends the run.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed for {url}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request for {url} returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("failed to read archive '{0}'")]
    Io(PathBuf, #[source] std::io::Error),
}

#[derive(Debug, Error)]
pub enum YearError {
    #[error("download failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("malformed archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("no CSV file found in archive")]
    NoCsv,

    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("could not find required columns {missing:?}. Available: {available:?}")]
    MissingColumns {
        missing: Vec<&'static str>,
        available: Vec<String>,
    },

    #[error("no usable rows after normalization ({dropped} dropped)")]
    NoRows { dropped: usize },
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no data downloaded for any year in {start}..={end}")]
    NoData { start: i32, end: i32 },

    #[error("start year {start} is after end year {end}")]
    InvalidYearRange { start: i32, end: i32 },

    #[error("failed to write '{0}'")]
    Write(PathBuf, #[source] std::io::Error),

    #[error("failed to serialize output")]
    Csv(#[from] csv::Error),
}
