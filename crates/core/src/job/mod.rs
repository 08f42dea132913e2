//! Job orchestration.
//!
//! This module provides the `JobOrchestrator`, which runs one grading job
//! end to end:
//! - Provision a workspace
//! - Fetch the template, tuning config and marker image
//! - Fetch every sheet image, in request order
//! - Invoke the recognition engine
//! - Package the result and release (or retain) the workspace
//!
//! Any failure short-circuits the remaining steps.
//!
//! # Example
//!
//! ```ignore
//! use omrgate_core::job::{JobOrchestrator, JobRequest, JobsConfig};
//!
//! let orchestrator = JobOrchestrator::new(
//!     JobsConfig::default(),
//!     WorkspaceManager::new(WorkspaceConfig::default()),
//!     Arc::new(HttpFetcher::with_defaults()?),
//!     Arc::new(CommandEngine::new(EngineConfig::new("omr-engine"))),
//! );
//!
//! let result = orchestrator.run(request).await;
//! println!("{}", serde_json::to_string(&result)?);
//! ```

mod config;
mod error;
mod orchestrator;
mod types;

pub use config::JobsConfig;
pub use error::{AssetKind, JobError};
pub use orchestrator::JobOrchestrator;
pub use types::{JobRequest, JobResult, JobStage, SheetImage, SUCCESS_MESSAGE};
