use super::archive_url;
use super::client::ArchiveSource;
use crate::error::FetchError;
use std::time::Duration;
use tracing::debug;

/// Downloads archives over HTTP with a blocking client and a fixed timeout.
pub struct HttpSource {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let base_url = base_url.into();
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| FetchError::Request {
                url: base_url.clone(),
                source,
            })?;
        Ok(Self { client, base_url })
    }
}

impl ArchiveSource for HttpSource {
    fn location(&self, year: i32) -> String {
        archive_url(&self.base_url, year)
    }

    fn fetch_archive(&self, year: i32) -> Result<Vec<u8>, FetchError> {
        let url = self.location(year);
        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|source| FetchError::Request {
                url: url.clone(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status { url, status });
        }

        let bytes = resp
            .bytes()
            .map_err(|source| FetchError::Request {
                url: url.clone(),
                source,
            })?;
        debug!(%url, bytes = bytes.len(), "Archive downloaded");
        Ok(bytes.to_vec())
    }
}
