//! Per-job workspace provisioning and cleanup.
//!
//! Every job owns an input tree (`inputs/job_<id>/`, transient) and an output
//! tree (`outputs/job_<id>/`, persistent). The input tree is held through a
//! [`WorkspaceGuard`] which removes it on every exit path unless explicitly
//! retained.

mod config;
mod error;
mod manager;
mod types;

pub use config::{CleanupPolicy, WorkspaceConfig};
pub use error::WorkspaceError;
pub use manager::{WorkspaceGuard, WorkspaceManager};
pub use types::{JobId, Workspace};
