//! Common test utilities for end-to-end testing with mocks.
//!
//! This module provides a test fixture that builds the router in-process with
//! a mock fetcher and mock engine injected and a temporary workspace root,
//! so jobs run without network access or an engine binary.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use omrgate_core::{
    load_config_from_str,
    testing::{MockEngine, MockFetcher},
    CleanupPolicy, JobOrchestrator, JobRequest, JobsConfig, WorkspaceConfig, WorkspaceManager,
};

/// Re-export fixtures for test convenience
pub use omrgate_core::testing::fixtures;

/// Test fixture for end-to-end testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_job() {
///     let request = fixtures::job_request(&["A1"]);
///     let fixture = TestFixture::new(&request).await;
///
///     let response = fixture.post("/process", serde_json::to_value(&request).unwrap()).await;
///
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock fetcher - configure served assets and failures
    pub fetcher: MockFetcher,
    /// Mock engine - configure responses and errors
    pub engine: MockEngine,
    /// Workspace root holding `inputs/` and `outputs/`
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a fixture whose fetcher serves every asset `request` names.
    pub async fn new(request: &JobRequest) -> Self {
        Self::with_cleanup(request, CleanupPolicy::default()).await
    }

    pub async fn with_cleanup(request: &JobRequest, cleanup: CleanupPolicy) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let fetcher = fixtures::mock_fetcher_for(request).await;
        let engine = MockEngine::new();

        let config = load_config_from_str(
            r#"
[server]
service_name = "omr-analyzer-test"

[engine]
program = "mock-engine"
"#,
        )
        .expect("Failed to parse test config");

        let workspaces = WorkspaceManager::new(
            WorkspaceConfig::with_root(temp_dir.path()).with_cleanup(cleanup),
        );
        let orchestrator = Arc::new(JobOrchestrator::new(
            JobsConfig::default(),
            workspaces,
            Arc::new(fetcher.clone()),
            Arc::new(engine.clone()),
        ));

        let state = Arc::new(omrgate_server::state::AppState::new(config, orchestrator));
        let router = omrgate_server::api::create_router(state);

        Self {
            router,
            fetcher,
            engine,
            temp_dir,
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Job directories currently present under `inputs/`.
    pub fn input_jobs(&self) -> Vec<PathBuf> {
        job_dirs(&self.root().join("inputs"))
    }

    /// Job directories currently present under `outputs/`.
    pub fn output_jobs(&self) -> Vec<PathBuf> {
        job_dirs(&self.root().join("outputs"))
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, Body::empty(), None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        let bytes = serde_json::to_vec(&body).unwrap();
        self.request("POST", path, Body::from(bytes), Some("application/json"))
            .await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        self.request(
            "POST",
            path,
            Body::from(body.to_string()),
            Some("application/json"),
        )
        .await
    }

    async fn request(
        &self,
        method: &str,
        path: &str,
        body: Body,
        content_type: Option<&str>,
    ) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);
        if let Some(content_type) = content_type {
            request_builder = request_builder.header("Content-Type", content_type);
        }
        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

fn job_dirs(root: &Path) -> Vec<PathBuf> {
    match std::fs::read_dir(root) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .map(|n| n.to_string_lossy().starts_with("job_"))
                    .unwrap_or(false)
            })
            .collect(),
        Err(_) => Vec::new(),
    }
}
