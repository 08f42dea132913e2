//! Testing utilities and mock implementations.
//!
//! Mocks for the fetcher and engine seams, so jobs can be run end to end
//! against a temporary directory without network access or an engine
//! binary.
//!
//! # Example
//!
//! ```rust,ignore
//! use omrgate_core::testing::{fixtures, MockEngine};
//!
//! let request = fixtures::job_request(&["A1", "B2"]);
//! let fetcher = fixtures::mock_fetcher_for(&request).await;
//! let engine = MockEngine::new();
//!
//! // Build a JobOrchestrator with Arc::new(fetcher), Arc::new(engine)...
//! ```

mod mock_engine;
mod mock_fetcher;

pub use mock_engine::{MockEngine, RecordedInvocation};
pub use mock_fetcher::{MockFailure, MockFetcher};

/// Test fixtures and helper functions.
pub mod fixtures {
    use super::MockFetcher;
    use crate::job::{JobRequest, SheetImage};

    /// Host used by fixture URLs.
    pub const ASSET_HOST: &str = "http://assets.test";

    pub fn template_url() -> String {
        format!("{}/template.json", ASSET_HOST)
    }

    pub fn config_url() -> String {
        format!("{}/config.json", ASSET_HOST)
    }

    pub fn marker_url() -> String {
        format!("{}/omr_marker.jpg", ASSET_HOST)
    }

    pub fn sheet_url(roll: &str) -> String {
        format!("{}/sheets/{}.jpg", ASSET_HOST, roll)
    }

    /// A minimal template the engine accepts.
    pub fn template_json() -> Vec<u8> {
        br#"{
  "pageDimensions": [1846, 1500],
  "bubbleDimensions": [40, 40],
  "fieldBlocks": {
    "MCQBlock1": {"fieldType": "QTYPE_MCQ4", "origin": [65, 60], "fieldLabels": ["q1..10"]}
  },
  "preProcessors": [{"name": "CropOnMarkers", "options": {"relativePath": "marker.jpg"}}]
}"#
        .to_vec()
    }

    /// A partial tuning config; unspecified values fall back to defaults.
    pub fn tuning_json() -> Vec<u8> {
        br#"{"dimensions": {"processing_width": 700}, "threshold_params": {"MIN_JUMP": 30}}"#
            .to_vec()
    }

    /// Stand-in JPEG bytes.
    pub fn image_bytes(tag: &str) -> Vec<u8> {
        let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
        bytes.extend_from_slice(tag.as_bytes());
        bytes
    }

    /// A job request for the given rolls, pointing at fixture URLs.
    pub fn job_request(rolls: &[&str]) -> JobRequest {
        JobRequest {
            template_url: template_url(),
            config_url: config_url(),
            marker_img_url: marker_url(),
            images: rolls
                .iter()
                .map(|roll| SheetImage::new(*roll, sheet_url(roll)))
                .collect(),
            auto_align: false,
            set_layout: false,
        }
    }

    /// A fetcher serving every asset `request` names.
    pub async fn mock_fetcher_for(request: &JobRequest) -> MockFetcher {
        let fetcher = MockFetcher::new();
        fetcher
            .add_asset(request.template_url.clone(), template_json())
            .await;
        fetcher
            .add_asset(request.config_url.clone(), tuning_json())
            .await;
        fetcher
            .add_asset(request.marker_img_url.clone(), image_bytes("marker"))
            .await;
        for sheet in &request.images {
            fetcher
                .add_asset(sheet.url.clone(), image_bytes(&sheet.roll))
                .await;
        }
        fetcher
    }
}
