use crate::config::types::Config;
use crate::config::validation::{validate, validate_weights};
use crate::scoring::ScoreWeights;
use crate::ConfigError;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Parses configuration TOML without validating it
///
/// Callers that merge command-line overrides validate afterwards.
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Loads score weights from a JSON object such as `{"accuracy": 0.5}`
///
/// Missing keys keep their default weight.
pub fn load_weights(path: &Path) -> Result<ScoreWeights, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let weights: ScoreWeights = serde_json::from_str(&content)?;
    validate_weights(&weights)?;
    Ok(weights)
}
