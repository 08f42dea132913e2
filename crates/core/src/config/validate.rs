use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Engine section exists (enforced by serde) and names a program
/// - Server port is not 0
/// - Fetch chunk size and image fetch concurrency are positive
/// - Rewrite rules have no empty fields
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.engine.program.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "engine.program cannot be empty".to_string(),
        ));
    }

    if config.fetcher.chunk_size == 0 {
        return Err(ConfigError::ValidationError(
            "fetcher.chunk_size cannot be 0".to_string(),
        ));
    }

    if config.jobs.max_concurrent_image_fetches == 0 {
        return Err(ConfigError::ValidationError(
            "jobs.max_concurrent_image_fetches cannot be 0".to_string(),
        ));
    }

    for (i, rule) in config.fetcher.rewrite_rules.iter().enumerate() {
        if rule.domain.is_empty() || rule.param_match.is_empty() || rule.replacement.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "fetcher.rewrite_rules[{}] has an empty field",
                i
            )));
        }
    }

    Ok(())
}
