//! Job-level error taxonomy.
//!
//! The `Display` output of [`JobError`] is the message reported to clients in
//! the error envelope.

use std::fmt;
use thiserror::Error;

use crate::engine::EngineError;
use crate::fetcher::FetchError;
use crate::workspace::WorkspaceError;

/// Asset a fetch stage was downloading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetKind {
    Template,
    Config,
    Marker,
    Sheet { roll: String },
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Template => write!(f, "template"),
            Self::Config => write!(f, "config"),
            Self::Marker => write!(f, "marker image"),
            Self::Sheet { roll } => write!(f, "image for roll {}", roll),
        }
    }
}

#[derive(Debug, Error)]
pub enum JobError {
    /// An asset download failed.
    #[error("Failed to download {asset}")]
    Fetch {
        asset: AssetKind,
        #[source]
        source: FetchError,
    },

    /// The workspace could not be provisioned.
    #[error("Processing failed: {0}")]
    Workspace(#[from] WorkspaceError),

    /// Tuning-config load, template construction or engine invocation failed.
    #[error("Error during OMR processing: {0}")]
    Engine(#[from] EngineError),
}

impl JobError {
    pub fn is_engine_failure(&self) -> bool {
        matches!(self, Self::Engine(_))
    }
}
