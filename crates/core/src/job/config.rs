//! Configuration for job orchestration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobsConfig {
    /// Sheet images fetched at once. 1 keeps the fetch stage strictly
    /// sequential.
    #[serde(default = "default_max_concurrent_image_fetches")]
    pub max_concurrent_image_fetches: usize,
}

fn default_max_concurrent_image_fetches() -> usize {
    1
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            max_concurrent_image_fetches: default_max_concurrent_image_fetches(),
        }
    }
}
