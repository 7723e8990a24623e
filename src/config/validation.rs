use crate::config::types::{CacheConfig, Config, CrawlerConfig, OutputConfig};
use crate::scoring::ScoreWeights;
use crate::ConfigError;
use url::Url;

/// Upper bound on fetch workers per batch
const MAX_WORKERS_LIMIT: usize = 64;

/// Upper bound on fetch attempts per URL
const MAX_ATTEMPTS_LIMIT: u32 = 10;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_cache_config(&config.cache)?;
    validate_output_config(&config.output)?;
    validate_weights(&config.weights)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.max_workers < 1 || config.max_workers > MAX_WORKERS_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max_workers must be between 1 and {}, got {}",
            MAX_WORKERS_LIMIT, config.max_workers
        )));
    }

    if !config.timeout.is_finite() || config.timeout <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "timeout must be > 0 seconds, got {}",
            config.timeout
        )));
    }

    if !config.delay_seconds.is_finite() || config.delay_seconds < 0.0 {
        return Err(ConfigError::Validation(format!(
            "delay_seconds must be >= 0, got {}",
            config.delay_seconds
        )));
    }

    if !config.retry_base_delay.is_finite() || config.retry_base_delay < 0.0 {
        return Err(ConfigError::Validation(format!(
            "retry_base_delay must be >= 0, got {}",
            config.retry_base_delay
        )));
    }

    if config.max_attempts < 1 || config.max_attempts > MAX_ATTEMPTS_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be between 1 and {}, got {}",
            MAX_ATTEMPTS_LIMIT, config.max_attempts
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    // An empty base URL is allowed here; the CLI may still supply one.
    if !config.base_url.is_empty() {
        let url = Url::parse(&config.base_url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid base_url '{}': {}", config.base_url, e))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "base_url '{}' must use http or https",
                config.base_url
            )));
        }
    }

    Ok(())
}

/// Validates cache configuration
fn validate_cache_config(config: &CacheConfig) -> Result<(), ConfigError> {
    if config.enabled && config.expire_after < 1 {
        return Err(ConfigError::Validation(
            "expire_after must be >= 1 second when the cache is enabled".to_string(),
        ));
    }
    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates score weights: finite, non-negative, non-zero sum
pub(crate) fn validate_weights(weights: &ScoreWeights) -> Result<(), ConfigError> {
    for (name, value) in weights.entries() {
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::Validation(format!(
                "weight '{}' must be a non-negative number, got {}",
                name, value
            )));
        }
    }

    if weights.total() == 0.0 {
        return Err(ConfigError::Validation(
            "weights must not all be zero".to_string(),
        ));
    }

    Ok(())
}
