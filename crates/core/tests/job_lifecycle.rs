//! Job lifecycle integration tests.
//!
//! These tests run the job orchestrator against a mock fetcher and a mock
//! engine in a temporary workspace root:
//! - Successful jobs and the success envelope
//! - Fail-fast ordering of asset fetches and the stage messages
//! - Workspace cleanup under each cleanup policy
//! - Concurrent jobs and bounded image-fetch concurrency

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;

use omrgate_core::{
    engine::EngineError,
    job::{JobOrchestrator, JobRequest, JobResult, JobsConfig},
    testing::{fixtures, MockEngine, MockFailure, MockFetcher},
    workspace::{CleanupPolicy, WorkspaceConfig, WorkspaceManager},
};

/// Test helper wiring an orchestrator to mocks.
struct TestHarness {
    orchestrator: Arc<JobOrchestrator>,
    fetcher: MockFetcher,
    engine: MockEngine,
    temp_dir: TempDir,
}

impl TestHarness {
    async fn new(request: &JobRequest) -> Self {
        Self::with_options(request, CleanupPolicy::default(), 1).await
    }

    async fn with_options(
        request: &JobRequest,
        cleanup: CleanupPolicy,
        max_concurrent_image_fetches: usize,
    ) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let fetcher = fixtures::mock_fetcher_for(request).await;
        let engine = MockEngine::new();

        let workspaces = WorkspaceManager::new(
            WorkspaceConfig::with_root(temp_dir.path()).with_cleanup(cleanup),
        );
        let orchestrator = JobOrchestrator::new(
            JobsConfig {
                max_concurrent_image_fetches,
            },
            workspaces,
            Arc::new(fetcher.clone()),
            Arc::new(engine.clone()),
        );

        Self {
            orchestrator: Arc::new(orchestrator),
            fetcher,
            engine,
            temp_dir,
        }
    }

    fn input_jobs(&self) -> Vec<PathBuf> {
        job_dirs(&self.temp_dir.path().join("inputs"))
    }

    fn output_jobs(&self) -> Vec<PathBuf> {
        job_dirs(&self.temp_dir.path().join("outputs"))
    }
}

fn job_dirs(root: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(root) else {
        return Vec::new();
    };
    entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy().starts_with("job_"))
                .unwrap_or(false)
        })
        .collect()
}

fn error_of(result: &JobResult) -> &str {
    result
        .error_message()
        .unwrap_or_else(|| panic!("expected an error envelope, got {:?}", result))
}

// =============================================================================
// Success path
// =============================================================================

#[tokio::test]
async fn test_successful_job_returns_responses_and_releases_inputs() {
    let request = fixtures::job_request(&["A1", "B2"]);
    let harness = TestHarness::new(&request).await;

    let result = harness.orchestrator.run(request).await;

    match &result {
        JobResult::Success {
            status,
            workspace_relative_path,
            responses,
            message,
        } => {
            assert_eq!(status, "success");
            assert!(workspace_relative_path.starts_with("inputs"));
            assert!(workspace_relative_path.contains("job_"));
            assert_eq!(message, "OMR processing completed successfully");
            assert_eq!(
                responses,
                &vec![
                    json!({"file_id": "sheet_A1.jpg"}),
                    json!({"file_id": "sheet_B2.jpg"})
                ]
            );
        }
        other => panic!("expected success, got {:?}", other),
    }

    assert!(harness.input_jobs().is_empty(), "input tree should be released");
    assert_eq!(harness.output_jobs().len(), 1, "output tree is retained");
}

#[tokio::test]
async fn test_assets_fetched_in_order_before_engine() {
    let request = fixtures::job_request(&["A1", "B2", "C3"]);
    let harness = TestHarness::new(&request).await;

    let result = harness.orchestrator.run(request).await;
    assert!(result.is_success());

    assert_eq!(
        harness.fetcher.requests().await,
        vec![
            fixtures::template_url(),
            fixtures::config_url(),
            fixtures::marker_url(),
            fixtures::sheet_url("A1"),
            fixtures::sheet_url("B2"),
            fixtures::sheet_url("C3"),
        ]
    );

    let calls = harness.engine.recorded_invocations().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].image_files,
        vec!["sheet_A1.jpg", "sheet_B2.jpg", "sheet_C3.jpg"]
    );
}

#[tokio::test]
async fn test_engine_responses_passed_through_verbatim() {
    let request = fixtures::job_request(&["A1"]);
    let harness = TestHarness::new(&request).await;
    let responses = vec![
        json!({"file_id": "sheet_A1.jpg", "score": 42, "q1": "B", "nested": {"x": [1, 2]}}),
        json!("free-form"),
    ];
    harness.engine.set_responses(responses.clone()).await;

    let result = harness.orchestrator.run(request).await;

    assert_eq!(result.responses(), Some(responses.as_slice()));
}

#[tokio::test]
async fn test_job_without_images_still_invokes_engine() {
    let request = fixtures::job_request(&[]);
    let harness = TestHarness::new(&request).await;

    let result = harness.orchestrator.run(request).await;

    assert_eq!(result.responses(), Some(&[][..]));
    assert_eq!(harness.engine.invocation_count().await, 1);
}

#[tokio::test]
async fn test_invocation_bundle() {
    let mut request = fixtures::job_request(&["A1"]);
    request.auto_align = true;
    request.set_layout = true;
    let harness = TestHarness::new(&request).await;

    harness.orchestrator.run(request).await;

    let calls = harness.engine.recorded_invocations().await;
    let invocation = &calls[0].invocation;
    assert!(invocation.args.auto_align);
    assert!(invocation.args.set_layout);
    assert!(!invocation.args.debug);
    assert_eq!(invocation.args.input_paths, vec![invocation.root_dir.clone()]);
    assert_eq!(invocation.root_dir, invocation.current_dir);
    assert!(invocation.root_dir.ends_with("images"));
    assert!(invocation
        .args
        .output_dir
        .starts_with(harness.temp_dir.path().join("outputs")));

    assert_eq!(invocation.template.page_dimensions, [1846, 1500]);
    assert_eq!(invocation.tuning_config.dimensions.processing_width, 700);
    assert_eq!(invocation.tuning_config.threshold_params.min_jump, 30);
    // Not in the fixture, so the default applies.
    assert_eq!(invocation.tuning_config.threshold_params.min_gap, 30);
}

// =============================================================================
// Fail-fast fetch stages
// =============================================================================

#[tokio::test]
async fn test_template_failure_stops_before_other_fetches() {
    let request = fixtures::job_request(&["A1"]);
    let harness = TestHarness::new(&request).await;
    harness
        .fetcher
        .fail(fixtures::template_url(), MockFailure::Status(404))
        .await;

    let result = harness.orchestrator.run(request).await;

    assert_eq!(error_of(&result), "Failed to download template");
    assert_eq!(harness.fetcher.requests().await, vec![fixtures::template_url()]);
    assert_eq!(harness.engine.invocation_count().await, 0);
    assert!(harness.input_jobs().is_empty());
}

#[tokio::test]
async fn test_config_failure_stops_before_images() {
    let request = fixtures::job_request(&["A1"]);
    let harness = TestHarness::new(&request).await;
    harness
        .fetcher
        .fail(fixtures::config_url(), MockFailure::Transport)
        .await;

    let result = harness.orchestrator.run(request).await;

    assert_eq!(error_of(&result), "Failed to download config");
    assert_eq!(harness.fetcher.request_count().await, 2);
    assert!(!harness.fetcher.was_requested(&fixtures::sheet_url("A1")).await);
}

#[tokio::test]
async fn test_marker_failure_stops_before_images() {
    let request = fixtures::job_request(&["A1", "B2"]);
    let harness = TestHarness::new(&request).await;
    harness
        .fetcher
        .fail(fixtures::marker_url(), MockFailure::Status(500))
        .await;

    let result = harness.orchestrator.run(request).await;

    assert_eq!(error_of(&result), "Failed to download marker image");
    assert_eq!(harness.fetcher.request_count().await, 3);
    assert!(harness.input_jobs().is_empty());
}

#[tokio::test]
async fn test_unreachable_sheet_names_roll_and_releases_workspace() {
    let request = fixtures::job_request(&["A1"]);
    let harness = TestHarness::new(&request).await;
    harness
        .fetcher
        .fail(fixtures::sheet_url("A1"), MockFailure::Transport)
        .await;

    let result = harness.orchestrator.run(request).await;

    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({"error": "Failed to download image for roll A1"})
    );
    assert_eq!(harness.engine.invocation_count().await, 0);
    assert!(harness.input_jobs().is_empty());
}

#[tokio::test]
async fn test_sheet_failure_skips_remaining_sheets() {
    let request = fixtures::job_request(&["A1", "B2", "C3"]);
    let harness = TestHarness::new(&request).await;
    harness
        .fetcher
        .fail(fixtures::sheet_url("B2"), MockFailure::Status(403))
        .await;

    let result = harness.orchestrator.run(request).await;

    assert_eq!(error_of(&result), "Failed to download image for roll B2");
    assert!(harness.fetcher.was_requested(&fixtures::sheet_url("A1")).await);
    assert!(!harness.fetcher.was_requested(&fixtures::sheet_url("C3")).await);
}

// =============================================================================
// Engine scope and cleanup policy
// =============================================================================

#[tokio::test]
async fn test_engine_failure_retains_workspace_by_default() {
    let request = fixtures::job_request(&["A1"]);
    let harness = TestHarness::new(&request).await;
    harness
        .engine
        .set_next_error(EngineError::InvocationFailed {
            reason: "engine exited with code: Some(1)".to_string(),
            stderr: Some("marker not found".to_string()),
        })
        .await;

    let result = harness.orchestrator.run(request).await;

    assert_eq!(
        error_of(&result),
        "Error during OMR processing: Engine invocation failed: engine exited with code: Some(1)"
    );
    let retained = harness.input_jobs();
    assert_eq!(retained.len(), 1);
    assert!(retained[0].join("template.json").is_file());
    assert!(retained[0].join("images").join("sheet_A1.jpg").is_file());
}

#[tokio::test]
async fn test_engine_failure_released_when_always_release() {
    let request = fixtures::job_request(&["A1"]);
    let harness = TestHarness::with_options(&request, CleanupPolicy::AlwaysRelease, 1).await;
    harness
        .engine
        .set_next_error(EngineError::Timeout { timeout_secs: 30 })
        .await;

    let result = harness.orchestrator.run(request).await;

    assert_eq!(
        error_of(&result),
        "Error during OMR processing: Engine timed out after 30 seconds"
    );
    assert!(harness.input_jobs().is_empty());
}

#[tokio::test]
async fn test_invalid_tuning_config_is_engine_scope_failure() {
    let request = fixtures::job_request(&["A1"]);
    let harness = TestHarness::new(&request).await;
    harness
        .fetcher
        .add_asset(fixtures::config_url(), br#"{"dimensions": "wide"}"#.to_vec())
        .await;

    let result = harness.orchestrator.run(request).await;

    assert!(error_of(&result)
        .starts_with("Error during OMR processing: Failed to load tuning config"));
    assert_eq!(harness.engine.invocation_count().await, 0);
}

#[tokio::test]
async fn test_template_without_page_dimensions_is_engine_scope_failure() {
    let request = fixtures::job_request(&["A1"]);
    let harness = TestHarness::new(&request).await;
    harness
        .fetcher
        .add_asset(fixtures::template_url(), br#"{"fieldBlocks": {}}"#.to_vec())
        .await;

    let result = harness.orchestrator.run(request).await;

    assert!(error_of(&result).starts_with("Error during OMR processing: Invalid template"));
    assert_eq!(harness.engine.invocation_count().await, 0);
}

#[tokio::test]
async fn test_engine_panic_removes_workspace() {
    let request = fixtures::job_request(&["A1"]);
    let harness = TestHarness::new(&request).await;
    harness.engine.set_panic_on_invoke(true).await;

    let orchestrator = Arc::clone(&harness.orchestrator);
    let joined = tokio::spawn(async move { orchestrator.run(request).await }).await;

    assert!(joined.unwrap_err().is_panic());
    assert!(harness.input_jobs().is_empty());
}

#[tokio::test]
async fn test_cleanup_failure_keeps_success_outcome() {
    let request = fixtures::job_request(&["A1"]);
    let harness = TestHarness::new(&request).await;
    harness.engine.set_block_cleanup(true).await;

    let result = harness.orchestrator.run(request).await;

    assert!(result.is_success(), "expected success, got {:?}", result);
    assert_eq!(
        result.responses(),
        Some(&[json!({"file_id": "sheet_A1.jpg"})][..])
    );
    let leftovers = harness.input_jobs();
    assert_eq!(leftovers.len(), 1);
    assert!(leftovers[0].is_file());
}

// =============================================================================
// Sheet file naming
// =============================================================================

#[tokio::test]
async fn test_distinct_rolls_keep_distinct_sheet_files() {
    let rolls = ["A.1", "A 1", "A_1"];
    let request = fixtures::job_request(&rolls);
    let harness = TestHarness::new(&request).await;

    let result = harness.orchestrator.run(request).await;

    assert!(result.is_success());
    assert_eq!(result.responses().map(|r| r.len()), Some(3));
    let calls = harness.engine.recorded_invocations().await;
    assert_eq!(
        calls[0].image_files,
        vec!["sheet_A_201.jpg", "sheet_A_2e1.jpg", "sheet_A_5f1.jpg"]
    );
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test]
async fn test_job_runs_on_spawned_task() {
    let request = fixtures::job_request(&["A1", "B2", "C3"]);
    let harness = TestHarness::with_options(&request, CleanupPolicy::default(), 3).await;

    let orchestrator = Arc::clone(&harness.orchestrator);
    let result = tokio::spawn(async move { orchestrator.run(request).await })
        .await
        .unwrap();

    assert!(result.is_success());
    assert!(harness.input_jobs().is_empty());
}

#[tokio::test]
async fn test_concurrent_jobs_use_distinct_workspaces() {
    let request = fixtures::job_request(&["A1", "B2"]);
    let harness = TestHarness::new(&request).await;

    let (a, b) = tokio::join!(
        harness.orchestrator.run(request.clone()),
        harness.orchestrator.run(request.clone())
    );

    let path_of = |result: &JobResult| match result {
        JobResult::Success {
            workspace_relative_path,
            ..
        } => workspace_relative_path.clone(),
        other => panic!("expected success, got {:?}", other),
    };
    assert_ne!(path_of(&a), path_of(&b));
    assert_eq!(harness.output_jobs().len(), 2);

    for call in harness.engine.recorded_invocations().await {
        assert_eq!(call.image_files, vec!["sheet_A1.jpg", "sheet_B2.jpg"]);
    }
}

#[tokio::test]
async fn test_concurrent_image_fetch_downloads_every_sheet() {
    let rolls = ["A1", "B2", "C3", "D4", "E5"];
    let request = fixtures::job_request(&rolls);
    let harness = TestHarness::with_options(&request, CleanupPolicy::default(), 3).await;
    harness
        .fetcher
        .delay(fixtures::sheet_url("A1"), Duration::from_millis(50))
        .await;

    let result = harness.orchestrator.run(request).await;

    assert!(result.is_success());
    let calls = harness.engine.recorded_invocations().await;
    let expected: Vec<String> = rolls.iter().map(|r| format!("sheet_{}.jpg", r)).collect();
    assert_eq!(calls[0].image_files, expected);
}

#[tokio::test]
async fn test_concurrent_image_fetch_reports_first_failing_roll_in_request_order() {
    let request = fixtures::job_request(&["A1", "B2", "C3"]);
    let harness = TestHarness::with_options(&request, CleanupPolicy::default(), 3).await;
    harness
        .fetcher
        .delay(fixtures::sheet_url("A1"), Duration::from_millis(100))
        .await;
    harness
        .fetcher
        .delay(fixtures::sheet_url("B2"), Duration::from_millis(50))
        .await;
    harness
        .fetcher
        .fail(fixtures::sheet_url("B2"), MockFailure::Status(500))
        .await;
    // Fails first in time, but comes later in the request.
    harness
        .fetcher
        .fail(fixtures::sheet_url("C3"), MockFailure::Transport)
        .await;

    let result = harness.orchestrator.run(request).await;

    assert_eq!(error_of(&result), "Failed to download image for roll B2");
    assert!(harness.input_jobs().is_empty());
}
