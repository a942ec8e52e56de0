//! HTTP access to presentation pages and slide images.

use std::io::{Seek, SeekFrom, Write};
use std::time::Duration;

use reqwest::blocking::Client;
use tempfile::NamedTempFile;

const USER_AGENT: &str = concat!("slidepdf/", env!("CARGO_PKG_VERSION"));
const TIMEOUT: Duration = Duration::from_secs(60);

/// Blocking HTTP client shared by every download of a run.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(TIMEOUT)
            .build()?;
        Ok(Self { client })
    }

    /// Fetch a page as text.
    pub fn get_text(&self, url: &str) -> Result<String, reqwest::Error> {
        log::debug!("GET {}", url);
        self.client.get(url).send()?.error_for_status()?.text()
    }

    /// Download `url` into a temporary file.
    ///
    /// The file is removed when the returned handle is dropped, whether or
    /// not the caller managed to use it.
    pub fn download_to_temp(&self, url: &str) -> Result<NamedTempFile, Box<dyn std::error::Error>> {
        log::debug!("Downloading {}", url);
        let mut response = self.client.get(url).send()?.error_for_status()?;
        let mut file = NamedTempFile::new()?;
        let written = response.copy_to(&mut file)?;
        file.flush()?;
        file.seek(SeekFrom::Start(0))?;
        log::debug!("{} bytes -> {}", written, file.path().display());
        Ok(file)
    }
}

impl slidepdf::Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> slidepdf::Result<Vec<u8>> {
        log::debug!("Fetching {}", url);
        self.client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.bytes())
            .map(|b| b.to_vec())
            .map_err(|e| slidepdf::Error::Fetch(format!("{}: {}", url, e)))
    }
}
