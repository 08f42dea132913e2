//! Job orchestrator implementation.
//!
//! Drives one job through a linear lifecycle with no backtracking:
//! init, workspace ready, template, config, marker, sheet images, engine,
//! then success or failure. The first failing stage ends the job.

use std::path::Path;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, StreamExt};
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::engine::{
    EngineError, EngineInvocation, EngineResponse, RecognitionEngine, TemplateDescriptor,
    TuningConfig,
};
use crate::fetcher::{AssetFetcher, FetchReport};
use crate::workspace::{JobId, Workspace, WorkspaceGuard, WorkspaceManager};

use super::config::JobsConfig;
use super::error::{AssetKind, JobError};
use super::types::{JobRequest, JobResult, JobStage, SheetImage};

/// Runs grading jobs against a fetcher and a recognition engine.
pub struct JobOrchestrator {
    config: JobsConfig,
    workspaces: WorkspaceManager,
    fetcher: Arc<dyn AssetFetcher>,
    engine: Arc<dyn RecognitionEngine>,
}

impl JobOrchestrator {
    pub fn new(
        config: JobsConfig,
        workspaces: WorkspaceManager,
        fetcher: Arc<dyn AssetFetcher>,
        engine: Arc<dyn RecognitionEngine>,
    ) -> Self {
        Self {
            config,
            workspaces,
            fetcher,
            engine,
        }
    }

    pub fn workspaces(&self) -> &WorkspaceManager {
        &self.workspaces
    }

    /// Runs a job to completion. Every failure is reported through the
    /// error envelope; this never panics on job errors.
    pub async fn run(&self, request: JobRequest) -> JobResult {
        let job_id = JobId::new();
        let span = info_span!("job", job_id = %job_id);
        self.run_job(job_id, request).instrument(span).await
    }

    async fn run_job(&self, job_id: JobId, request: JobRequest) -> JobResult {
        info!(
            stage = %JobStage::Init,
            images = request.images.len(),
            auto_align = request.auto_align,
            set_layout = request.set_layout,
            "Starting job"
        );

        let guard = match self.workspaces.acquire(job_id).await {
            Ok(guard) => guard,
            Err(e) => {
                let err = JobError::from(e);
                error!(stage = %JobStage::Failed, error = %err, "Could not provision workspace");
                return JobResult::error(err.to_string());
            }
        };
        info!(stage = %JobStage::WorkspaceReady, "Workspace ready");

        let outcome = self.execute(guard.workspace(), &request).await;
        self.finish(guard, outcome).await
    }

    async fn execute(
        &self,
        workspace: &Workspace,
        request: &JobRequest,
    ) -> Result<Vec<EngineResponse>, JobError> {
        info!(
            stage = %JobStage::FetchTemplate,
            url = %request.template_url,
            "Fetching template"
        );
        self.fetch_asset(
            AssetKind::Template,
            &request.template_url,
            &workspace.template_path(),
        )
        .await?;

        info!(
            stage = %JobStage::FetchConfig,
            url = %request.config_url,
            "Fetching tuning config"
        );
        self.fetch_asset(
            AssetKind::Config,
            &request.config_url,
            &workspace.config_path(),
        )
        .await?;

        info!(
            stage = %JobStage::FetchMarker,
            url = %request.marker_img_url,
            "Fetching marker image"
        );
        self.fetch_asset(
            AssetKind::Marker,
            &request.marker_img_url,
            &workspace.marker_path(),
        )
        .await?;

        self.fetch_sheets(workspace, &request.images).await?;

        Ok(self.recognize(workspace, request).await?)
    }

    async fn fetch_asset(
        &self,
        asset: AssetKind,
        url: &str,
        destination: &Path,
    ) -> Result<FetchReport, JobError> {
        self.fetcher
            .fetch(url, destination)
            .await
            .map_err(|source| JobError::Fetch { asset, source })
    }

    /// Fetches sheet images in request order. With a concurrency limit above
    /// one, fetches overlap but results are still consumed in order, so the
    /// first failing roll in the request is the one reported. Returning early
    /// drops the stream, which cancels fetches still in flight.
    async fn fetch_sheets(
        &self,
        workspace: &Workspace,
        images: &[SheetImage],
    ) -> Result<(), JobError> {
        let limit = self.config.max_concurrent_image_fetches.max(1);
        info!(
            stage = %JobStage::FetchImages,
            count = images.len(),
            concurrency = limit,
            "Fetching sheet images"
        );

        // Each fetch owns its inputs so the job future stays `Send`.
        let pending: Vec<BoxFuture<'static, Result<(String, FetchReport), JobError>>> = images
            .iter()
            .map(|sheet| {
                let fetcher = Arc::clone(&self.fetcher);
                let roll = sheet.roll.clone();
                let url = sheet.url.clone();
                let destination = workspace.sheet_path(&sheet.roll);
                async move {
                    match fetcher.fetch(&url, &destination).await {
                        Ok(report) => Ok((roll, report)),
                        Err(source) => Err(JobError::Fetch {
                            asset: AssetKind::Sheet { roll },
                            source,
                        }),
                    }
                }
                .boxed()
            })
            .collect();

        let mut fetches = stream::iter(pending).buffered(limit);

        while let Some(result) = fetches.next().await {
            let (roll, report) = result?;
            debug!(roll = %roll, bytes = report.bytes, "Fetched sheet image");
        }
        Ok(())
    }

    /// Loads the tuning config and template, then hands the workspace to the
    /// engine.
    async fn recognize(
        &self,
        workspace: &Workspace,
        request: &JobRequest,
    ) -> Result<Vec<EngineResponse>, EngineError> {
        let tuning = TuningConfig::load(&workspace.config_path()).await?;
        let template = TemplateDescriptor::load(&workspace.template_path()).await?;
        let invocation = EngineInvocation::for_workspace(
            workspace,
            request.auto_align,
            request.set_layout,
            template,
            tuning,
        );

        info!(
            stage = %JobStage::EngineInvoked,
            engine = self.engine.name(),
            "Invoking recognition engine"
        );
        self.engine.invoke(invocation).await
    }

    async fn finish(
        &self,
        guard: WorkspaceGuard,
        outcome: Result<Vec<EngineResponse>, JobError>,
    ) -> JobResult {
        match outcome {
            Ok(responses) => {
                let relative = self.workspaces.relative_path(guard.workspace());
                if let Err(e) = guard.release().await {
                    warn!(error = %e, "Failed to clean up job workspace");
                }
                info!(
                    stage = %JobStage::Succeeded,
                    responses = responses.len(),
                    "Job completed"
                );
                JobResult::success(relative.to_string_lossy().into_owned(), responses)
            }
            Err(err) => {
                log_failure(&err);
                if self.workspaces.policy().retains_after(err.is_engine_failure()) {
                    let workspace = guard.retain();
                    warn!(
                        path = %workspace.input_dir.display(),
                        "Retaining job workspace for inspection"
                    );
                } else if let Err(e) = guard.release().await {
                    warn!(error = %e, "Failed to clean up job workspace");
                }
                JobResult::error(err.to_string())
            }
        }
    }
}

fn log_failure(err: &JobError) {
    match err {
        JobError::Fetch { asset, source } => error!(
            stage = %JobStage::Failed,
            asset = %asset,
            retryable = source.is_retryable(),
            cause = %source,
            "Asset download failed"
        ),
        JobError::Engine(EngineError::InvocationFailed {
            reason,
            stderr: Some(stderr),
        }) => error!(
            stage = %JobStage::Failed,
            cause = %reason,
            stderr = %stderr,
            "Recognition failed"
        ),
        JobError::Engine(e) => error!(stage = %JobStage::Failed, cause = %e, "Recognition failed"),
        JobError::Workspace(e) => error!(stage = %JobStage::Failed, cause = %e, "Workspace failure"),
    }
}
