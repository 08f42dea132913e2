//! Template descriptor.
//!
//! The template describes the answer-sheet layout the engine grades against.
//! Only the page dimensions are checked here; everything else is carried to
//! the engine as-is.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

use super::error::EngineError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDescriptor {
    /// Sheet size in pixels, `[width, height]`.
    pub page_dimensions: [u32; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bubble_dimensions: Option<[u32; 2]>,
    #[serde(default)]
    pub field_blocks: Map<String, Value>,
    #[serde(default)]
    pub pre_processors: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TemplateDescriptor {
    /// Reads and validates the template at `path`.
    pub async fn load(path: &Path) -> Result<Self, EngineError> {
        let contents = tokio::fs::read(path)
            .await
            .map_err(|e| EngineError::template(path, e.to_string()))?;
        Self::from_slice(path, &contents)
    }

    fn from_slice(path: &Path, contents: &[u8]) -> Result<Self, EngineError> {
        let template: Self = serde_json::from_slice(contents)
            .map_err(|e| EngineError::template(path, e.to_string()))?;

        if template.page_dimensions.contains(&0) {
            return Err(EngineError::template(
                path,
                "pageDimensions must be non-zero",
            ));
        }

        Ok(template)
    }
}
