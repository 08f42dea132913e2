//! Engine implementation that runs an external program.
//!
//! The invocation bundle is written to the program's stdin as JSON; the
//! program answers with a JSON array of response records on stdout.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::{debug, info};

use super::config::EngineConfig;
use super::error::EngineError;
use super::traits::RecognitionEngine;
use super::types::{EngineInvocation, EngineResponse};

/// Runs the recognition engine as a child process.
pub struct CommandEngine {
    config: EngineConfig,
}

impl CommandEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Resolves the configured program to an executable path, searching
    /// `PATH` for bare names.
    fn resolve_program(&self) -> Option<PathBuf> {
        let program = Path::new(&self.config.program);
        if program.components().count() > 1 {
            return program.is_file().then(|| program.to_path_buf());
        }

        let path_var = std::env::var_os("PATH")?;
        std::env::split_paths(&path_var)
            .map(|dir| dir.join(program))
            .find(|candidate| candidate.is_file())
    }

    fn parse_output(stdout: &[u8]) -> Result<Vec<EngineResponse>, EngineError> {
        serde_json::from_slice(stdout).map_err(|e| EngineError::InvalidOutput {
            reason: format!("expected a JSON array of responses: {}", e),
        })
    }
}

#[async_trait]
impl RecognitionEngine for CommandEngine {
    fn name(&self) -> &str {
        "command"
    }

    async fn invoke(
        &self,
        invocation: EngineInvocation,
    ) -> Result<Vec<EngineResponse>, EngineError> {
        let start = Instant::now();
        let payload = serde_json::to_vec(&invocation).map_err(|e| {
            EngineError::invocation_failed(format!("failed to encode invocation: {}", e), None)
        })?;

        let mut command = Command::new(&self.config.program);
        command
            .args(&self.config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.config.working_dir {
            command.current_dir(dir);
        }

        debug!(
            program = %self.config.program,
            input = %invocation.root_dir.display(),
            "Starting recognition engine"
        );

        let mut child = command.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                EngineError::ProgramNotFound {
                    program: self.config.program.clone(),
                }
            } else {
                EngineError::Io(e)
            }
        })?;

        // Feed stdin concurrently so a chatty engine can't deadlock on a full
        // stdout pipe. An engine that exits without reading is not an error
        // here; its exit status decides.
        if let Some(mut stdin) = child.stdin.take() {
            tokio::spawn(async move {
                if let Err(e) = stdin.write_all(&payload).await {
                    debug!(error = %e, "Engine closed stdin early");
                }
            });
        }

        let output = match self.config.timeout_secs {
            Some(timeout_secs) => timeout(
                Duration::from_secs(timeout_secs),
                child.wait_with_output(),
            )
            .await
            .map_err(|_| EngineError::Timeout { timeout_secs })??,
            None => child.wait_with_output().await?,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(EngineError::invocation_failed(
                format!("engine exited with code: {:?}", output.status.code()),
                if stderr.is_empty() { None } else { Some(stderr) },
            ));
        }

        let responses = Self::parse_output(&output.stdout)?;
        info!(
            responses = responses.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Recognition engine finished"
        );
        Ok(responses)
    }

    async fn validate(&self) -> Result<(), EngineError> {
        match self.resolve_program() {
            Some(path) => {
                debug!(path = %path.display(), "Resolved engine program");
                Ok(())
            }
            None => Err(EngineError::ProgramNotFound {
                program: self.config.program.clone(),
            }),
        }
    }
}
