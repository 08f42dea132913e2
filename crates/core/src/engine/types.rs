//! Invocation bundle types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::workspace::Workspace;

use super::template::TemplateDescriptor;
use super::tuning::TuningConfig;

/// One opaque record returned by the engine, passed through verbatim.
pub type EngineResponse = serde_json::Value;

/// Run arguments handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationArgs {
    pub input_paths: Vec<PathBuf>,
    pub output_dir: PathBuf,
    #[serde(rename = "autoAlign")]
    pub auto_align: bool,
    #[serde(rename = "setLayout")]
    pub set_layout: bool,
    /// Interactive debugging output; always off for server jobs.
    pub debug: bool,
}

/// Everything the engine needs to grade one job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineInvocation {
    pub root_dir: PathBuf,
    pub current_dir: PathBuf,
    pub args: InvocationArgs,
    pub template: TemplateDescriptor,
    pub tuning_config: TuningConfig,
}

impl EngineInvocation {
    /// Builds the server-side invocation for a workspace: the images
    /// directory is both root and current directory, results go to the
    /// job's output tree and debug output is disabled.
    pub fn for_workspace(
        workspace: &Workspace,
        auto_align: bool,
        set_layout: bool,
        template: TemplateDescriptor,
        tuning_config: TuningConfig,
    ) -> Self {
        Self {
            root_dir: workspace.images_dir.clone(),
            current_dir: workspace.images_dir.clone(),
            args: InvocationArgs {
                input_paths: vec![workspace.images_dir.clone()],
                output_dir: workspace.output_dir.clone(),
                auto_align,
                set_layout,
                debug: false,
            },
            template,
            tuning_config,
        }
    }
}
