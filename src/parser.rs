//! Archive extraction and CSV loading for yearly AQI files.

use crate::error::YearError;
use csv::StringRecord;
use std::io::{Cursor, Read};
use tracing::debug;
use zip::ZipArchive;

/// The provider's table as it came out of the archive, before any schema work.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub entry_name: String,
    pub headers: Vec<String>,
    pub rows: Vec<StringRecord>,
}

/// Finds the first `.csv` entry in a zip archive held in memory and returns
/// its name and contents.
pub fn extract_csv(bytes: &[u8]) -> Result<(String, Vec<u8>), YearError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let name = entry.name().to_string();
        if !name.to_lowercase().ends_with(".csv") {
            continue;
        }

        let mut buf = Vec::new();
        entry
            .read_to_end(&mut buf)
            .map_err(zip::result::ZipError::Io)?;
        debug!(entry = %name, bytes = buf.len(), "Extracted CSV entry");
        return Ok((name, buf));
    }

    Err(YearError::NoCsv)
}

/// Reads a headered CSV into a [`RawTable`].
pub fn read_table(entry_name: &str, csv_bytes: &[u8]) -> Result<RawTable, YearError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_bytes);

    let headers = rdr.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for result in rdr.records() {
        rows.push(result?);
    }

    Ok(RawTable {
        entry_name: entry_name.to_string(),
        headers,
        rows,
    })
}

/// Decompresses a yearly archive and loads its embedded table.
pub fn parse_archive(bytes: &[u8]) -> Result<RawTable, YearError> {
    let (name, csv_bytes) = extract_csv(bytes)?;
    read_table(&name, &csv_bytes)
}
