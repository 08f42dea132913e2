//! Error types for the engine module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while preparing or running a recognition.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The tuning configuration could not be loaded.
    #[error("Failed to load tuning config {path}: {reason}")]
    TuningConfig { path: PathBuf, reason: String },

    /// The template descriptor could not be built.
    #[error("Invalid template {path}: {reason}")]
    Template { path: PathBuf, reason: String },

    /// The engine executable could not be found.
    #[error("Engine program not found: {program}")]
    ProgramNotFound { program: String },

    /// The engine ran and reported a failure.
    #[error("Engine invocation failed: {reason}")]
    InvocationFailed {
        reason: String,
        stderr: Option<String>,
    },

    /// The engine exceeded its time budget.
    #[error("Engine timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// The engine output could not be interpreted.
    #[error("Invalid engine output: {reason}")]
    InvalidOutput { reason: String },

    /// I/O error while talking to the engine.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub fn tuning(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::TuningConfig {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn template(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Template {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn invocation_failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::InvocationFailed {
            reason: reason.into(),
            stderr,
        }
    }
}
