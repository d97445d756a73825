mod basic;
mod client;
mod dir;

pub use basic::HttpSource;
pub use client::ArchiveSource;
pub use dir::DirSource;

/// Where the EPA publishes the pre-generated daily AQI files.
pub const DEFAULT_BASE_URL: &str = "https://aqs.epa.gov/aqsweb/airdata";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub fn archive_file_name(year: i32) -> String {
    format!("daily_aqi_by_county_{year}.zip")
}

/// Builds the download URL for one year's archive.
pub fn archive_url(base_url: &str, year: i32) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), archive_file_name(year))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_url_default_base() {
        assert_eq!(
            archive_url(DEFAULT_BASE_URL, 2018),
            "https://aqs.epa.gov/aqsweb/airdata/daily_aqi_by_county_2018.zip"
        );
    }

    #[test]
    fn test_archive_url_trims_trailing_slash() {
        assert_eq!(
            archive_url("http://localhost:8080/", 2023),
            "http://localhost:8080/daily_aqi_by_county_2023.zip"
        );
    }
}
