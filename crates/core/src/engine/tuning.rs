//! Tuning configuration loader.
//!
//! The engine's tuning parameters are read from the job's `config.json` and
//! merged over built-in defaults, so a job only has to specify what it
//! changes.

use figment::{
    providers::{Format, Json, Serialized},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::EngineError;

/// Engine tuning parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TuningConfig {
    pub dimensions: Dimensions,
    pub threshold_params: ThresholdParams,
    pub alignment_params: AlignmentParams,
    pub outputs: OutputParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub display_height: u32,
    pub display_width: u32,
    pub processing_height: u32,
    pub processing_width: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdParams {
    #[serde(rename = "GAMMA_LOW")]
    pub gamma_low: f64,
    #[serde(rename = "MIN_GAP")]
    pub min_gap: u32,
    #[serde(rename = "MIN_JUMP")]
    pub min_jump: u32,
    #[serde(rename = "CONFIDENT_SURPLUS")]
    pub confident_surplus: u32,
    #[serde(rename = "JUMP_DELTA")]
    pub jump_delta: u32,
    #[serde(rename = "PAGE_TYPE_FOR_THRESHOLD")]
    pub page_type_for_threshold: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentParams {
    pub auto_align: bool,
    pub match_col: u32,
    pub max_steps: u32,
    pub stride: u32,
    pub thickness: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputParams {
    pub show_image_level: u8,
    pub save_image_level: u8,
    pub save_detections: bool,
    pub filter_out_multimarked_files: bool,
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            dimensions: Dimensions {
                display_height: 2480,
                display_width: 1640,
                processing_height: 820,
                processing_width: 666,
            },
            threshold_params: ThresholdParams {
                gamma_low: 0.7,
                min_gap: 30,
                min_jump: 25,
                confident_surplus: 5,
                jump_delta: 30,
                page_type_for_threshold: "white".to_string(),
            },
            alignment_params: AlignmentParams {
                auto_align: false,
                match_col: 5,
                max_steps: 20,
                stride: 1,
                thickness: 3,
            },
            outputs: OutputParams {
                show_image_level: 0,
                save_image_level: 0,
                save_detections: true,
                filter_out_multimarked_files: false,
            },
        }
    }
}

impl TuningConfig {
    /// Loads `path` and merges its contents over the defaults.
    pub async fn load(path: &Path) -> Result<Self, EngineError> {
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                EngineError::tuning(path, "file not found")
            } else {
                EngineError::tuning(path, e.to_string())
            }
        })?;
        Self::from_json(path, &contents)
    }

    fn from_json(path: &Path, contents: &str) -> Result<Self, EngineError> {
        Figment::from(Serialized::defaults(TuningConfig::default()))
            .merge(Json::string(contents))
            .extract()
            .map_err(|e| EngineError::tuning(path, e.to_string()))
    }
}
