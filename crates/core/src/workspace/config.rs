//! Configuration for the workspace manager.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What happens to a job's input tree when the job ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanupPolicy {
    /// Keep the inputs when the recognition engine stage failed, so they can
    /// be inspected. Release them on every other path.
    #[default]
    RetainOnEngineFailure,
    /// Release the inputs on every path.
    AlwaysRelease,
}

impl CleanupPolicy {
    /// Whether the input tree is kept after a failure in the given stage.
    pub fn retains_after(&self, engine_failed: bool) -> bool {
        matches!(self, Self::RetainOnEngineFailure) && engine_failed
    }
}

/// Workspace manager configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Directory holding the `inputs/` and `outputs/` trees.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    #[serde(default)]
    pub cleanup: CleanupPolicy,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            cleanup: CleanupPolicy::default(),
        }
    }
}

impl WorkspaceConfig {
    /// Creates a config rooted at `root` with the default cleanup policy.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Sets the cleanup policy.
    pub fn with_cleanup(mut self, cleanup: CleanupPolicy) -> Self {
        self.cleanup = cleanup;
        self
    }

    pub fn inputs_dir(&self) -> PathBuf {
        self.root.join("inputs")
    }

    pub fn outputs_dir(&self) -> PathBuf {
        self.root.join("outputs")
    }
}
