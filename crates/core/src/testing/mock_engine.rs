//! Mock recognition engine for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::engine::{EngineError, EngineInvocation, EngineResponse, RecognitionEngine};

/// A recorded engine call for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedInvocation {
    /// The bundle the engine received.
    pub invocation: EngineInvocation,
    /// Files present in the images directory when the engine was called.
    pub image_files: Vec<String>,
}

/// Mock implementation of the RecognitionEngine trait.
///
/// Unless configured otherwise it answers with one record per file in the
/// images directory, `{"file_id": <name>}`, sorted by name.
///
/// # Example
///
/// ```rust,ignore
/// use omrgate_core::testing::MockEngine;
///
/// let engine = MockEngine::new();
/// engine.set_next_error(EngineError::Timeout { timeout_secs: 60 }).await;
///
/// // ... run a job ...
///
/// assert_eq!(engine.invocation_count().await, 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockEngine {
    invocations: Arc<RwLock<Vec<RecordedInvocation>>>,
    responses: Arc<RwLock<Option<Vec<EngineResponse>>>>,
    /// If set, the next invocation fails with this error.
    next_error: Arc<RwLock<Option<EngineError>>>,
    panic_on_invoke: Arc<RwLock<bool>>,
    /// Replace the job's input tree with a plain file during invocation.
    block_cleanup: Arc<RwLock<bool>>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixes the responses returned by every successful invocation.
    pub async fn set_responses(&self, responses: Vec<EngineResponse>) {
        *self.responses.write().await = Some(responses);
    }

    pub async fn set_next_error(&self, error: EngineError) {
        *self.next_error.write().await = Some(error);
    }

    /// Makes invocations panic, simulating an engine fault.
    pub async fn set_panic_on_invoke(&self, panic: bool) {
        *self.panic_on_invoke.write().await = panic;
    }

    /// Swaps the job's input directory for a regular file while the engine
    /// runs, so releasing the workspace afterwards fails.
    pub async fn set_block_cleanup(&self, block: bool) {
        *self.block_cleanup.write().await = block;
    }

    pub async fn recorded_invocations(&self) -> Vec<RecordedInvocation> {
        self.invocations.read().await.clone()
    }

    pub async fn invocation_count(&self) -> usize {
        self.invocations.read().await.len()
    }
}

#[async_trait]
impl RecognitionEngine for MockEngine {
    fn name(&self) -> &str {
        "mock"
    }

    async fn invoke(
        &self,
        invocation: EngineInvocation,
    ) -> Result<Vec<EngineResponse>, EngineError> {
        let mut image_files = Vec::new();
        let mut entries = tokio::fs::read_dir(&invocation.root_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            image_files.push(entry.file_name().to_string_lossy().into_owned());
        }
        image_files.sort();
        let input_dir = invocation.root_dir.parent().map(|p| p.to_path_buf());

        self.invocations.write().await.push(RecordedInvocation {
            invocation,
            image_files: image_files.clone(),
        });

        if *self.block_cleanup.read().await {
            if let Some(input_dir) = input_dir {
                tokio::fs::remove_dir_all(&input_dir).await?;
                tokio::fs::write(&input_dir, b"not a directory").await?;
            }
        }

        if *self.panic_on_invoke.read().await {
            panic!("mock engine fault");
        }

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        if let Some(responses) = self.responses.read().await.clone() {
            return Ok(responses);
        }

        Ok(image_files
            .into_iter()
            .map(|name| serde_json::json!({ "file_id": name }))
            .collect())
    }

    async fn validate(&self) -> Result<(), EngineError> {
        Ok(())
    }
}
