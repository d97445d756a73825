use crate::error::FetchError;

/// Somewhere yearly AQI archives can be loaded from.
pub trait ArchiveSource {
    /// Where the archive for `year` lives, for log output.
    fn location(&self, year: i32) -> String;

    /// Returns the raw zip bytes for `year`.
    fn fetch_archive(&self, year: i32) -> Result<Vec<u8>, FetchError>;
}
