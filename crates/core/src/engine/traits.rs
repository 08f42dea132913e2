//! Trait definitions for the engine module.

use async_trait::async_trait;

use super::error::EngineError;
use super::types::{EngineInvocation, EngineResponse};

/// An OMR recognition engine.
#[async_trait]
pub trait RecognitionEngine: Send + Sync {
    /// Returns the name of this engine implementation.
    fn name(&self) -> &str;

    /// Runs recognition over the invocation's input paths and returns one
    /// opaque record per processed sheet.
    async fn invoke(&self, invocation: EngineInvocation)
        -> Result<Vec<EngineResponse>, EngineError>;

    /// Validates that the engine is properly configured and ready.
    async fn validate(&self) -> Result<(), EngineError>;
}
