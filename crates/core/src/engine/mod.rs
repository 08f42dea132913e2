//! Recognition engine client.
//!
//! The OMR recognition engine is an external collaborator. This module owns
//! the invocation contract: the bundle handed to the engine (paths, flags,
//! template descriptor, tuning configuration) and the opaque response records
//! it hands back.
//!
//! # Example
//!
//! ```ignore
//! use omrgate_core::engine::{CommandEngine, EngineConfig, RecognitionEngine};
//!
//! let engine = CommandEngine::new(EngineConfig::new("omr-engine"));
//! engine.validate().await?;
//!
//! let tuning = TuningConfig::load(&workspace.config_path()).await?;
//! let template = TemplateDescriptor::load(&workspace.template_path()).await?;
//! let responses = engine
//!     .invoke(EngineInvocation::for_workspace(&workspace, false, false, template, tuning))
//!     .await?;
//! ```

mod command;
mod config;
mod error;
mod template;
mod traits;
mod tuning;
mod types;

pub use command::CommandEngine;
pub use config::EngineConfig;
pub use error::EngineError;
pub use template::TemplateDescriptor;
pub use traits::RecognitionEngine;
pub use tuning::{AlignmentParams, Dimensions, OutputParams, ThresholdParams, TuningConfig};
pub use types::{EngineInvocation, EngineResponse, InvocationArgs};
