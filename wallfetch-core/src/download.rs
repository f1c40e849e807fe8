//! Downloader seam: materializes a locator's bytes at a local path.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::Result;

/// Default per-download timeout. The upstream design left this unbounded; a
/// hung transfer would otherwise stall the whole attempt.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

#[async_trait]
pub trait Downloader: Send + Sync {
    /// Fetches `url` and writes the body to `dest`. Any non-success outcome
    /// is a transport error.
    async fn download(&self, url: &str, dest: &Path) -> Result<()>;
}

/// HTTP downloader backed by a shared `reqwest` client.
#[derive(Clone, Debug)]
pub struct HttpDownloader {
    client: reqwest::Client,
}

impl HttpDownloader {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");
        Self { client }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpDownloader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    async fn download(&self, url: &str, dest: &Path) -> Result<()> {
        debug!(url, dest = %dest.display(), "downloading image");
        let response = self.client.get(url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;
        tokio::fs::write(dest, &bytes).await?;
        Ok(())
    }
}
