use crate::config::types::Config;
use crate::ConfigError;
use regex::Regex;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.crawler.max_concurrency < 1 || config.crawler.max_concurrency > 256 {
        return Err(ConfigError::Validation(format!(
            "max-concurrency must be between 1 and 256, got {}",
            config.crawler.max_concurrency
        )));
    }

    if let Some(user_agent) = &config.crawler.user_agent {
        if user_agent.trim().is_empty() {
            return Err(ConfigError::Validation(
                "user-agent cannot be empty".to_string(),
            ));
        }
    }

    compile_includes(&config.crawler.includes)?;
    Ok(())
}

/// Compiles the include patterns, surfacing the offending pattern on
/// failure
pub fn compile_includes(patterns: &[String]) -> Result<Vec<Regex>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern).map_err(|error| ConfigError::InvalidPattern {
                pattern: pattern.clone(),
                message: error.to_string(),
            })
        })
        .collect()
}
