//! Configuration for the command-line recognition engine.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for [`CommandEngine`](super::CommandEngine).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Engine executable, either a path or a name resolved through `PATH`.
    pub program: String,

    /// Arguments passed before the invocation bundle is written to stdin.
    #[serde(default)]
    pub args: Vec<String>,

    /// Working directory of the engine process.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,

    /// Kill the engine if it runs longer than this many seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl EngineConfig {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            timeout_secs: None,
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }
}
