//! Request, result and stage types for a grading job.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::engine::EngineResponse;

/// Message carried by every success envelope.
pub const SUCCESS_MESSAGE: &str = "OMR processing completed successfully";

/// One answer sheet to grade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetImage {
    /// Examinee identifier. Numeric rolls are accepted and kept as text.
    #[serde(deserialize_with = "deserialize_roll")]
    pub roll: String,
    pub url: String,
}

impl SheetImage {
    pub fn new(roll: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            roll: roll.into(),
            url: url.into(),
        }
    }
}

fn deserialize_roll<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Roll {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Roll::deserialize(deserializer)? {
        Roll::Text(s) => s,
        Roll::Number(n) => n.to_string(),
    })
}

/// A grading job as submitted by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRequest {
    pub template_url: String,
    pub config_url: String,
    pub marker_img_url: String,
    /// Sheets in the order they are fetched.
    pub images: Vec<SheetImage>,
    #[serde(default)]
    pub auto_align: bool,
    #[serde(default)]
    pub set_layout: bool,
}

/// Outcome of a job, serialized as the response envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JobResult {
    Success {
        status: String,
        workspace_relative_path: String,
        responses: Vec<EngineResponse>,
        message: String,
    },
    Error {
        error: String,
    },
}

impl JobResult {
    pub fn success(
        workspace_relative_path: impl Into<String>,
        responses: Vec<EngineResponse>,
    ) -> Self {
        Self::Success {
            status: "success".to_string(),
            workspace_relative_path: workspace_relative_path.into(),
            responses,
            message: SUCCESS_MESSAGE.to_string(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error { error } => Some(error),
            Self::Success { .. } => None,
        }
    }

    pub fn responses(&self) -> Option<&[EngineResponse]> {
        match self {
            Self::Success { responses, .. } => Some(responses),
            Self::Error { .. } => None,
        }
    }
}

/// Position of a job in its linear lifecycle. Used for structured logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStage {
    Init,
    WorkspaceReady,
    FetchTemplate,
    FetchConfig,
    FetchMarker,
    FetchImages,
    EngineInvoked,
    Succeeded,
    Failed,
}

impl JobStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::WorkspaceReady => "workspace_ready",
            Self::FetchTemplate => "fetch_template",
            Self::FetchConfig => "fetch_config",
            Self::FetchMarker => "fetch_marker",
            Self::FetchImages => "fetch_images",
            Self::EngineInvoked => "engine_invoked",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
