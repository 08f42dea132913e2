//! Configuration for the asset fetcher.

use serde::{Deserialize, Serialize};

/// A share-link rewrite rule.
///
/// Applies to URLs whose host contains `domain`: every query segment equal
/// to `param_match` is replaced with `replacement`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteRule {
    pub domain: String,
    pub param_match: String,
    pub replacement: String,
}

impl RewriteRule {
    pub fn new(
        domain: impl Into<String>,
        param_match: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            param_match: param_match.into(),
            replacement: replacement.into(),
        }
    }
}

/// Configuration for the HTTP asset fetcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Per-request timeout in seconds. Unset means no timeout.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Additional attempts after a retryable failure.
    #[serde(default)]
    pub max_retries: u32,

    /// Fixed delay between attempts in milliseconds.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Write buffer size in bytes.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Share-link rewrite rules, applied in order.
    #[serde(default = "default_rewrite_rules")]
    pub rewrite_rules: Vec<RewriteRule>,
}

fn default_retry_backoff_ms() -> u64 {
    500
}

fn default_chunk_size() -> usize {
    8192
}

fn default_rewrite_rules() -> Vec<RewriteRule> {
    vec![RewriteRule::new("dropbox.com", "dl=0", "dl=1")]
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            max_retries: 0,
            retry_backoff_ms: default_retry_backoff_ms(),
            chunk_size: default_chunk_size(),
            rewrite_rules: default_rewrite_rules(),
        }
    }
}

impl FetcherConfig {
    /// Sets the request timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    /// Sets the retry policy.
    pub fn with_retries(mut self, max_retries: u32, backoff_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.retry_backoff_ms = backoff_ms;
        self
    }

    /// Replaces the rewrite rule table.
    pub fn with_rewrite_rules(mut self, rules: Vec<RewriteRule>) -> Self {
        self.rewrite_rules = rules;
        self
    }
}
