#![allow(clippy::result_large_err)]

use super::PipelineSettings;
use crate::core::error::{AppError, CODE_INVALID_CONFIG_FIELD};
use gitship_types::{AuthMode, ProjectConfig};
use url::Url;

pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a project record before it is stored or used
    pub fn validate_project(project: &ProjectConfig) -> Result<(), AppError> {
        let repository_url = project.repository_url.trim();
        if repository_url.is_empty() {
            return Err(invalid("repository_url cannot be empty"));
        }
        Url::parse(repository_url).map_err(|err| {
            invalid(format!(
                "repository_url '{}' is not a valid URL: {}",
                repository_url, err
            ))
        })?;

        if project.username.trim().is_empty() {
            return Err(invalid("username cannot be empty"));
        }

        if project.email.trim().is_empty() {
            return Err(invalid("email cannot be empty"));
        }

        if project.auth_mode == AuthMode::Token && project.token.trim().is_empty() {
            return Err(invalid("token is required when auth_mode is token"));
        }

        Ok(())
    }

    /// Validate pipeline tunables
    pub fn validate_settings(settings: &PipelineSettings) -> Result<(), AppError> {
        for (field, value) in [
            ("pipeline.branch", &settings.branch),
            ("pipeline.remote", &settings.remote),
            ("pipeline.marker_file", &settings.marker_file),
            ("pipeline.fallback_marker_file", &settings.fallback_marker_file),
            ("pipeline.publish_commit_message", &settings.publish_commit_message),
            ("pipeline.empty_commit_message", &settings.empty_commit_message),
        ] {
            if value.trim().is_empty() {
                return Err(invalid(format!("{} cannot be empty", field)));
            }
        }

        settings.command_timeout().map_err(|err| {
            invalid(format!(
                "pipeline.command_timeout '{}' is not a duration: {}",
                settings.command_timeout, err
            ))
        })?;

        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> AppError {
    AppError::validation(CODE_INVALID_CONFIG_FIELD, message)
}
