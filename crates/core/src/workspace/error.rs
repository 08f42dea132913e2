//! Error types for the workspace module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while provisioning or destroying a workspace.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// Another job already owns this directory.
    #[error("Workspace already exists: {path}")]
    Collision { path: PathBuf },

    /// Failed to create a workspace directory.
    #[error("Failed to create directory {path}: {source}")]
    CreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to remove a workspace directory.
    #[error("Failed to remove directory {path}: {source}")]
    RemoveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A workspace root exists but is not a directory.
    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },
}
