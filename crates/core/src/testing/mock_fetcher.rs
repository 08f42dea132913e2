//! Mock asset fetcher for testing.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::fetcher::{AssetFetcher, FetchError, FetchReport};

/// How a mocked URL fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// The server answers with this HTTP status.
    Status(u16),
    /// The host is unreachable.
    Transport,
}

/// Mock implementation of the AssetFetcher trait.
///
/// Serves registered payloads by URL and records every requested URL in
/// call order. URLs that were never registered answer with a 404.
///
/// # Example
///
/// ```rust,ignore
/// use omrgate_core::testing::{MockFailure, MockFetcher};
///
/// let fetcher = MockFetcher::new();
/// fetcher.add_asset("http://assets/template.json", b"{}".to_vec()).await;
/// fetcher.fail("http://assets/a1.jpg", MockFailure::Transport).await;
///
/// // ... run a job ...
///
/// assert_eq!(fetcher.request_count().await, 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockFetcher {
    assets: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    failures: Arc<RwLock<HashMap<String, MockFailure>>>,
    delays: Arc<RwLock<HashMap<String, Duration>>>,
    requests: Arc<RwLock<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `body` for `url`.
    pub async fn add_asset(&self, url: impl Into<String>, body: Vec<u8>) {
        self.assets.write().await.insert(url.into(), body);
    }

    /// Makes every fetch of `url` fail.
    pub async fn fail(&self, url: impl Into<String>, failure: MockFailure) {
        self.failures.write().await.insert(url.into(), failure);
    }

    /// Delays the answer for `url`.
    pub async fn delay(&self, url: impl Into<String>, delay: Duration) {
        self.delays.write().await.insert(url.into(), delay);
    }

    /// URLs requested so far, in call order.
    pub async fn requests(&self) -> Vec<String> {
        self.requests.read().await.clone()
    }

    pub async fn request_count(&self) -> usize {
        self.requests.read().await.len()
    }

    pub async fn was_requested(&self, url: &str) -> bool {
        self.requests.read().await.iter().any(|u| u == url)
    }
}

#[async_trait]
impl AssetFetcher for MockFetcher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, url: &str, destination: &Path) -> Result<FetchReport, FetchError> {
        self.requests.write().await.push(url.to_string());

        let delay = self.delays.read().await.get(url).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failure = self.failures.read().await.get(url).copied();
        match failure {
            Some(MockFailure::Status(status)) => {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status,
                })
            }
            Some(MockFailure::Transport) => {
                return Err(FetchError::Transport {
                    url: url.to_string(),
                    reason: "connection refused".to_string(),
                })
            }
            None => {}
        }

        let body = self.assets.read().await.get(url).cloned();
        let Some(body) = body else {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            });
        };

        tokio::fs::write(destination, &body)
            .await
            .map_err(|e| FetchError::Io {
                path: destination.to_path_buf(),
                source: e,
            })?;

        Ok(FetchReport {
            url: url.to_string(),
            destination: destination.to_path_buf(),
            bytes: body.len() as u64,
            sha256: format!("{:x}", Sha256::digest(&body)),
        })
    }
}
