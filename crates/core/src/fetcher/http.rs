//! HTTP asset fetcher implementation.

use async_trait::async_trait;
use reqwest::Client;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, warn};

use super::config::FetcherConfig;
use super::error::FetchError;
use super::rewrite::normalize_url;
use super::traits::{AssetFetcher, FetchReport};

/// Streams remote assets to disk over HTTP(S).
pub struct HttpFetcher {
    client: Client,
    config: FetcherConfig,
}

impl HttpFetcher {
    /// Creates a new fetcher with the given configuration.
    pub fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| FetchError::ClientBuild(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Creates a fetcher with default configuration.
    pub fn with_defaults() -> Result<Self, FetchError> {
        Self::new(FetcherConfig::default())
    }

    /// Performs a single download attempt.
    async fn fetch_once(&self, url: &str, destination: &Path) -> Result<FetchReport, FetchError> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let file = File::create(destination)
            .await
            .map_err(|e| FetchError::io(destination, e))?;
        let mut writer = BufWriter::with_capacity(self.config.chunk_size, file);
        let mut hasher = Sha256::new();
        let mut total_bytes = 0u64;

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?
        {
            hasher.update(&chunk);
            writer
                .write_all(&chunk)
                .await
                .map_err(|e| FetchError::io(destination, e))?;
            total_bytes += chunk.len() as u64;
        }

        writer
            .flush()
            .await
            .map_err(|e| FetchError::io(destination, e))?;

        Ok(FetchReport {
            url: url.to_string(),
            destination: destination.to_path_buf(),
            bytes: total_bytes,
            sha256: format!("{:x}", hasher.finalize()),
        })
    }
}

#[async_trait]
impl AssetFetcher for HttpFetcher {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self, url: &str, destination: &Path) -> Result<FetchReport, FetchError> {
        info!(url = url, destination = %destination.display(), "Downloading asset");

        let effective_url = normalize_url(url, &self.config.rewrite_rules);
        if effective_url != url {
            debug!(url = %effective_url, "Converted share link to direct download");
        }

        let backoff = Duration::from_millis(self.config.retry_backoff_ms);
        let mut attempt = 0u32;

        loop {
            match self.fetch_once(&effective_url, destination).await {
                Ok(report) => {
                    info!(url = url, bytes = report.bytes, "Downloaded asset");
                    return Ok(report);
                }
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    warn!(
                        url = url,
                        attempt = attempt,
                        max_retries = self.config.max_retries,
                        error = %e,
                        "Download failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => {
                    warn!(url = url, error = %e, "Failed to download asset");
                    return Err(e);
                }
            }
        }
    }
}
