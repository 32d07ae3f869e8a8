//! Configuration loader and validation.
//!
//! Loading pipeline: read file, parse YAML, validate, freeze with
//! `Arc`. Validation collects every issue instead of stopping at the
//! first so a broken file can be fixed in one pass.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::config::schema::EngineConfig;
use crate::error::ConfigError;

/// Loads and validates a configuration file.
///
/// # Errors
///
/// Returns [`ConfigError`] when the file is unreadable, not valid
/// YAML, or fails validation.
pub fn load_config(path: &Path) -> Result<Arc<EngineConfig>, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let config: EngineConfig =
        serde_yaml::from_str(&raw).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    validate(&config, &path.display().to_string())?;
    Ok(Arc::new(config))
}

/// Validates a configuration, collecting all issues.
///
/// # Errors
///
/// Returns [`ConfigError::ValidationError`] listing every issue found.
pub fn validate(config: &EngineConfig, path: &str) -> Result<(), ConfigError> {
    let mut issues = Vec::new();

    let offsets = config.timeline.offsets_in_order();
    if !offsets.windows(2).all(|w| w[0] < w[1]) {
        issues.push("timeline offsets must be strictly increasing".to_string());
    }

    if config.particles.count == 0 {
        issues.push("particles.count must be at least 1".to_string());
    }
    if config.particles.max_distance < config.particles.min_distance {
        issues.push("particles.max_distance must be >= particles.min_distance".to_string());
    }
    if config.particles.max_duration < config.particles.min_duration {
        issues.push("particles.max_duration must be >= particles.min_duration".to_string());
    }

    if config.messages.recognition.is_empty() {
        issues.push("messages.recognition must not be empty".to_string());
    }
    if config.messages.comfort_lines.is_empty() {
        issues.push("messages.comfort_lines must not be empty".to_string());
    }

    if config.interaction.debounce.is_zero() {
        issues.push("interaction.debounce must be non-zero".to_string());
    }

    if config.breath.cycles == 0 {
        issues.push("breath.cycles must be at least 1".to_string());
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            path: path.to_string(),
            issues,
        })
    }
}
