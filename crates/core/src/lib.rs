pub mod config;
pub mod engine;
pub mod fetcher;
pub mod job;
pub mod testing;
pub mod workspace;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, LogFormat,
    LoggingConfig, ServerConfig,
};
pub use engine::{CommandEngine, EngineConfig, EngineError, RecognitionEngine};
pub use fetcher::{AssetFetcher, FetchError, FetcherConfig, HttpFetcher};
pub use job::{JobError, JobOrchestrator, JobRequest, JobResult, JobsConfig};
pub use workspace::{CleanupPolicy, JobId, WorkspaceConfig, WorkspaceManager};
