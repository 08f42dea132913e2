//! Trait definitions for the fetcher module.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::error::FetchError;

/// Outcome of a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchReport {
    /// URL actually requested, after share-link normalization.
    pub url: String,
    /// File the body was written to.
    pub destination: PathBuf,
    /// Number of bytes written.
    pub bytes: u64,
    /// Hex SHA-256 digest of the body.
    pub sha256: String,
}

/// Retrieves one remote resource to a local path.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    /// Returns the name of this fetcher implementation.
    fn name(&self) -> &str;

    /// Fetches `url` into `destination`, overwriting any existing file.
    async fn fetch(&self, url: &str, destination: &Path) -> Result<FetchReport, FetchError>;
}
