#![allow(clippy::result_large_err)]

use super::{default_config_path, ConfigValidator, StoredConfig};
use crate::core::error::{AppError, CODE_CONFIGURATION_UNREADABLE};
use crate::core::types::ErrorCategory;
use std::env;
use std::path::Path;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config from the workspace (workspace/.gitship/config.toml)
    /// Environment variables override config file values
    /// A missing file yields defaults with no project configured
    pub fn load_from_workspace(workspace_path: &Path) -> Result<StoredConfig, AppError> {
        Self::load(&default_config_path(workspace_path))
    }

    /// Load from an explicit path, applying env overrides and validation
    pub fn load(path: &Path) -> Result<StoredConfig, AppError> {
        let mut config = Self::load_from_file(path)?.unwrap_or_default();
        Self::apply_env_overrides(&mut config);
        Self::validate_config(&config)?;
        Ok(config)
    }

    /// Load config from specific file path, exactly as stored
    /// Returns Ok(None) if file doesn't exist
    pub fn load_from_file(path: &Path) -> Result<Option<StoredConfig>, AppError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::new(
                ErrorCategory::ConfigurationError,
                format!("Failed to read config file {}: {}", path.display(), e),
            )
            .with_code(CODE_CONFIGURATION_UNREADABLE)
        })?;

        let config: StoredConfig = toml::from_str(&content).map_err(|e| {
            AppError::new(
                ErrorCategory::ConfigurationError,
                format!("Failed to parse config file {}: {}", path.display(), e),
            )
            .with_code(CODE_CONFIGURATION_UNREADABLE)
        })?;

        Ok(Some(config))
    }

    /// Apply environment variable overrides to the configuration
    /// Environment variables take precedence over config file values
    fn apply_env_overrides(config: &mut StoredConfig) {
        // Only an already-configured project can receive a token
        if let Some(project) = config.project.as_mut() {
            if let Ok(token) = env::var("GITSHIP_TOKEN") {
                if !token.trim().is_empty() {
                    project.token = token.trim().to_string();
                }
            }
        }

        if let Ok(branch) = env::var("GITSHIP_BRANCH") {
            if !branch.trim().is_empty() {
                config.pipeline.branch = branch.trim().to_string();
            }
        }

        if let Ok(remote) = env::var("GITSHIP_REMOTE") {
            if !remote.trim().is_empty() {
                config.pipeline.remote = remote.trim().to_string();
            }
        }

        if let Ok(timeout) = env::var("GITSHIP_COMMAND_TIMEOUT") {
            if humantime::parse_duration(timeout.trim()).is_ok() {
                config.pipeline.command_timeout = timeout.trim().to_string();
            }
        }
    }

    /// Get documentation for supported environment variables
    pub fn env_var_documentation() -> &'static [&'static str] {
        &[
            "GITSHIP_TOKEN - Override the stored access token of a configured project",
            "GITSHIP_BRANCH - Override the published branch (default: main)",
            "GITSHIP_REMOTE - Override the managed remote name (default: origin)",
            "GITSHIP_COMMAND_TIMEOUT - Per-command timeout, e.g. 90s (default: 5m, 0s disables)",
            "GITSHIP_LOG_DIR - Override the log directory",
            "RUST_LOG - Override the log filter",
        ]
    }

    /// Validate configuration values
    pub fn validate_config(config: &StoredConfig) -> Result<(), AppError> {
        if let Some(project) = &config.project {
            ConfigValidator::validate_project(project)?;
        }
        ConfigValidator::validate_settings(&config.pipeline)
    }
}
