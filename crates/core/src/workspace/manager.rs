//! Workspace manager implementation.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

use super::config::{CleanupPolicy, WorkspaceConfig};
use super::error::WorkspaceError;
use super::types::{JobId, Workspace};

/// Creates and destroys per-job directory trees.
#[derive(Debug, Clone)]
pub struct WorkspaceManager {
    config: WorkspaceConfig,
}

impl WorkspaceManager {
    pub fn new(config: WorkspaceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    pub fn policy(&self) -> CleanupPolicy {
        self.config.cleanup
    }

    /// Ensures the `inputs/` and `outputs/` roots exist and are directories.
    pub async fn check_ready(&self) -> Result<(), WorkspaceError> {
        ensure_dir(&self.config.inputs_dir()).await?;
        ensure_dir(&self.config.outputs_dir()).await
    }

    /// Creates `inputs/job_<id>/`, its `images/` subdirectory and
    /// `outputs/job_<id>/`.
    ///
    /// Fails with [`WorkspaceError::Collision`] if the input tree already
    /// exists. A partially created input tree is removed before returning an
    /// error.
    pub async fn provision(&self, job_id: JobId) -> Result<Workspace, WorkspaceError> {
        let inputs_root = self.config.inputs_dir();
        let outputs_root = self.config.outputs_dir();
        ensure_dir(&inputs_root).await?;

        let workspace = Workspace::layout(job_id, &inputs_root, &outputs_root);

        match fs::create_dir(&workspace.input_dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(WorkspaceError::Collision {
                    path: workspace.input_dir,
                });
            }
            Err(e) => {
                return Err(WorkspaceError::CreateFailed {
                    path: workspace.input_dir,
                    source: e,
                });
            }
        }

        if let Err(e) = create_job_subtrees(&workspace).await {
            let _ = fs::remove_dir_all(&workspace.input_dir).await;
            return Err(e);
        }

        info!(
            job_id = %job_id,
            path = %workspace.input_dir.display(),
            "Created job workspace"
        );
        Ok(workspace)
    }

    /// Provisions a workspace and wraps it in a guard that releases the input
    /// tree on every exit path.
    pub async fn acquire(&self, job_id: JobId) -> Result<WorkspaceGuard, WorkspaceError> {
        let workspace = self.provision(job_id).await?;
        Ok(WorkspaceGuard::new(workspace))
    }

    /// Recursively removes the input tree. Missing content is not an error.
    /// The output tree is left untouched.
    pub async fn destroy(&self, workspace: &Workspace) -> Result<(), WorkspaceError> {
        remove_input_tree(&workspace.input_dir).await
    }

    /// Input tree location relative to the workspace root, e.g.
    /// `inputs/job_<id>`.
    pub fn relative_path(&self, workspace: &Workspace) -> PathBuf {
        workspace
            .input_dir
            .strip_prefix(&self.config.root)
            .unwrap_or(&workspace.input_dir)
            .to_path_buf()
    }
}

/// Scoped ownership of a workspace's input tree.
///
/// Call [`release`](Self::release) to remove the tree or
/// [`retain`](Self::retain) to keep it. A guard dropped without either (job
/// panicked or its future was dropped) removes the tree synchronously.
#[derive(Debug)]
pub struct WorkspaceGuard {
    workspace: Workspace,
    armed: bool,
}

impl WorkspaceGuard {
    fn new(workspace: Workspace) -> Self {
        Self {
            workspace,
            armed: true,
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Removes the input tree.
    pub async fn release(mut self) -> Result<(), WorkspaceError> {
        self.armed = false;
        remove_input_tree(&self.workspace.input_dir).await?;
        debug!(job_id = %self.workspace.job_id, "Released job workspace");
        Ok(())
    }

    /// Keeps the input tree on disk and hands the workspace back.
    pub fn retain(mut self) -> Workspace {
        self.armed = false;
        self.workspace.clone()
    }
}

impl Drop for WorkspaceGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match std::fs::remove_dir_all(&self.workspace.input_dir) {
            Ok(()) => warn!(
                job_id = %self.workspace.job_id,
                "Job ended without releasing its workspace, removed on drop"
            ),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(
                job_id = %self.workspace.job_id,
                path = %self.workspace.input_dir.display(),
                error = %e,
                "Failed to remove workspace on drop"
            ),
        }
    }
}

async fn ensure_dir(path: &Path) -> Result<(), WorkspaceError> {
    match fs::metadata(path).await {
        Ok(meta) if meta.is_dir() => return Ok(()),
        Ok(_) => {
            return Err(WorkspaceError::NotADirectory {
                path: path.to_path_buf(),
            })
        }
        Err(_) => {}
    }

    fs::create_dir_all(path)
        .await
        .map_err(|e| WorkspaceError::CreateFailed {
            path: path.to_path_buf(),
            source: e,
        })
}

async fn create_job_subtrees(workspace: &Workspace) -> Result<(), WorkspaceError> {
    fs::create_dir(&workspace.images_dir)
        .await
        .map_err(|e| WorkspaceError::CreateFailed {
            path: workspace.images_dir.clone(),
            source: e,
        })?;

    fs::create_dir_all(&workspace.output_dir)
        .await
        .map_err(|e| WorkspaceError::CreateFailed {
            path: workspace.output_dir.clone(),
            source: e,
        })
}

async fn remove_input_tree(path: &Path) -> Result<(), WorkspaceError> {
    match fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(WorkspaceError::RemoveFailed {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}
