use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::engine::EngineConfig;
use crate::fetcher::FetcherConfig;
use crate::job::JobsConfig;
use crate::workspace::WorkspaceConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub jobs: JobsConfig,
    pub engine: EngineConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Name reported by the liveness endpoint
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            service_name: default_service_name(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    5000
}

fn default_service_name() -> String {
    "omr-analyzer".to_string()
}

/// Logging configuration, resolved once at startup.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
    /// Optional log file written in addition to stdout.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::CleanupPolicy;

    #[test]
    fn test_deserialize_minimal_config() {
        let toml = r#"
[engine]
program = "omr-engine"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.engine.program, "omr-engine");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.server.service_name, "omr-analyzer");
        assert_eq!(config.workspace.root, PathBuf::from("."));
        assert_eq!(config.workspace.cleanup, CleanupPolicy::RetainOnEngineFailure);
        assert_eq!(config.fetcher.chunk_size, 8192);
        assert_eq!(config.fetcher.max_retries, 0);
        assert!(config.fetcher.timeout_secs.is_none());
        assert_eq!(config.fetcher.rewrite_rules.len(), 1);
        assert_eq!(config.jobs.max_concurrent_image_fetches, 1);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_deserialize_missing_engine_fails() {
        let toml = r#"
[server]
port = 8080
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_full_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000
service_name = "grader"

[workspace]
root = "/srv/omr"
cleanup = "always_release"

[fetcher]
timeout_secs = 15
max_retries = 2
retry_backoff_ms = 100
chunk_size = 4096

[[fetcher.rewrite_rules]]
domain = "drive.example.com"
param_match = "export=view"
replacement = "export=download"

[jobs]
max_concurrent_image_fetches = 4

[engine]
program = "/opt/omr/bin/engine"
args = ["--server"]
timeout_secs = 600

[logging]
level = "debug"
format = "json"
file = "omr_checker.log"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.service_name, "grader");
        assert_eq!(config.workspace.root, PathBuf::from("/srv/omr"));
        assert_eq!(config.workspace.cleanup, CleanupPolicy::AlwaysRelease);
        assert_eq!(config.fetcher.timeout_secs, Some(15));
        assert_eq!(config.fetcher.max_retries, 2);
        assert_eq!(config.fetcher.chunk_size, 4096);
        assert_eq!(config.fetcher.rewrite_rules.len(), 1);
        assert_eq!(config.fetcher.rewrite_rules[0].domain, "drive.example.com");
        assert_eq!(config.jobs.max_concurrent_image_fetches, 4);
        assert_eq!(config.engine.args, vec!["--server".to_string()]);
        assert_eq!(config.engine.timeout_secs, Some(600));
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.file, Some(PathBuf::from("omr_checker.log")));
    }
}
