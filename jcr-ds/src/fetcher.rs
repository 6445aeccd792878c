//! Source retrieval
//!
//! `HttpFetcher` downloads over HTTP(S) with a per-request timeout;
//! `LocalFetcher` reads files from disk when the configured base is a
//! directory (an offline mirror of the upstream layout).

use async_trait::async_trait;
use reqwest::{header, Client};
use std::time::Duration;
use tracing::debug;

use crate::error::{SyncError, SyncResult};

const USER_AGENT: &str = concat!("jcr-ds/", env!("CARGO_PKG_VERSION"));

/// Byte source for one upstream file
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Retrieve the full contents at `location`
    async fn fetch(&self, location: &str) -> SyncResult<Vec<u8>>;
}

/// HTTP(S) fetcher
pub struct HttpFetcher {
    http_client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static(USER_AGENT),
        );

        let http_client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http_client,
            timeout,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, location: &str) -> SyncResult<Vec<u8>> {
        debug!(url = location, "Downloading");

        let response = self.http_client.get(location).send().await.map_err(|e| {
            if e.is_timeout() {
                SyncError::unavailable(location, format!("timed out after {:?}", self.timeout))
            } else {
                SyncError::unavailable(location, e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::unavailable(location, format!("HTTP {}", status)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SyncError::unavailable(location, e))?;

        debug!(url = location, bytes = bytes.len(), "Downloaded");
        Ok(bytes.to_vec())
    }
}

/// Filesystem fetcher; locations are file paths
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFetcher;

#[async_trait]
impl Fetcher for LocalFetcher {
    async fn fetch(&self, location: &str) -> SyncResult<Vec<u8>> {
        debug!(path = location, "Reading");
        tokio::fs::read(location)
            .await
            .map_err(|e| SyncError::unavailable(location, e))
    }
}

/// Whether a base location should go through `HttpFetcher`
pub fn is_remote(base: &str) -> bool {
    let lower = base.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
