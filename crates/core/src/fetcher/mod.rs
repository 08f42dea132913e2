//! Asset fetcher for staging remote job inputs on local disk.
//!
//! This module provides the `AssetFetcher` trait and an HTTP implementation
//! that streams a single remote resource into a destination file.
//!
//! # Features
//!
//! - Share-link normalization through a configurable rewrite rule table
//! - Streamed writes through a fixed-size buffer
//! - Typed failures (transport, timeout, HTTP status, local I/O)
//! - Optional request timeout and bounded retry
//!
//! # Example
//!
//! ```ignore
//! use omrgate_core::fetcher::{AssetFetcher, FetcherConfig, HttpFetcher};
//!
//! let fetcher = HttpFetcher::new(FetcherConfig::default())?;
//! let report = fetcher
//!     .fetch("https://www.dropbox.com/s/abc/template.json?dl=0", Path::new("template.json"))
//!     .await?;
//! println!("{} bytes from {}", report.bytes, report.url);
//! ```

mod config;
mod error;
mod http;
mod rewrite;
mod traits;

pub use config::{FetcherConfig, RewriteRule};
pub use error::FetchError;
pub use http::HttpFetcher;
pub use rewrite::normalize_url;
pub use traits::{AssetFetcher, FetchReport};
