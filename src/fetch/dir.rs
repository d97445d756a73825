use super::archive_file_name;
use super::client::ArchiveSource;
use crate::error::FetchError;
use std::path::PathBuf;

/// Reads previously downloaded archives from a local directory, using the
/// same file names the provider publishes.
pub struct DirSource {
    dir: PathBuf,
}

impl DirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, year: i32) -> PathBuf {
        self.dir.join(archive_file_name(year))
    }
}

impl ArchiveSource for DirSource {
    fn location(&self, year: i32) -> String {
        self.path_for(year).display().to_string()
    }

    fn fetch_archive(&self, year: i32) -> Result<Vec<u8>, FetchError> {
        let path = self.path_for(year);
        std::fs::read(&path).map_err(|e| FetchError::Io(path, e))
    }
}
