use crate::core::types::{ErrorCategory, ErrorSeverity};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

pub const CODE_EMPTY_VERSION_LABEL: &str = "VAL-001";
pub const CODE_INVALID_CONFIG_FIELD: &str = "VAL-002";
pub const CODE_CONFIGURATION_MISSING: &str = "CFG-001";
pub const CODE_CONFIGURATION_UNREADABLE: &str = "CFG-002";
pub const CODE_OPERATION_IN_PROGRESS: &str = "OPS-001";
pub const CODE_LAUNCH_FAILURE: &str = "CMD-001";
pub const CODE_COMMAND_FAILURE: &str = "CMD-002";
pub const CODE_TIMEOUT: &str = "CMD-003";

#[derive(Debug)]
pub struct AppError {
    pub category: ErrorCategory,
    pub severity: ErrorSeverity,
    pub code: String,
    pub message: String,
    pub context: HashMap<String, String>,
    pub recovery_suggestions: Vec<String>,
    pub occurred_at: DateTime<Utc>,
    pub source: Option<anyhow::Error>,
}

impl AppError {
    pub fn new<T: Into<String>>(category: ErrorCategory, message: T) -> Self {
        let severity = match category {
            ErrorCategory::ValidationError
            | ErrorCategory::ConfigurationError
            | ErrorCategory::LaunchError
            | ErrorCategory::CommandError
            | ErrorCategory::TimeoutError
            | ErrorCategory::IoError
            | ErrorCategory::SerializationError
            | ErrorCategory::InternalError => ErrorSeverity::Error,
            ErrorCategory::ConcurrencyError => ErrorSeverity::Warning,
            ErrorCategory::Unknown => ErrorSeverity::Info,
        };
        AppError {
            category,
            severity,
            code: format!("ERR-{}", uuid::Uuid::new_v4()),
            message: message.into(),
            context: HashMap::new(),
            recovery_suggestions: vec![],
            occurred_at: Utc::now(),
            source: None,
        }
    }

    pub fn with_source<T: Into<String>>(
        category: ErrorCategory,
        message: T,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        let mut error = AppError::new(category, message);
        error.source = Some(anyhow::anyhow!(source));
        error
    }

    pub fn with_context<T: Into<String>>(mut self, context: T) -> Self {
        self.context.insert("context".to_string(), context.into());
        self
    }

    pub fn with_code<T: Into<String>>(mut self, code: T) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_suggestion<T: Into<String>>(mut self, suggestion: T) -> Self {
        self.recovery_suggestions.push(suggestion.into());
        self
    }

    pub fn add_context(&mut self, key: &str, value: &str) {
        self.context.insert(key.to_string(), value.to_string());
    }

    pub fn severity(&self) -> ErrorSeverity {
        self.severity
    }

    pub fn is_category(&self, category: ErrorCategory) -> bool {
        self.category == category
    }

    /// No project record has been saved yet.
    pub fn configuration_missing() -> Self {
        AppError::new(
            ErrorCategory::ConfigurationError,
            "project is not configured; save a repository URL and identity first",
        )
        .with_code(CODE_CONFIGURATION_MISSING)
        .with_suggestion("Run `gitship config set --help` to store the project settings")
    }

    /// The reentrancy guard for `workspace` is already held.
    pub fn operation_in_progress(workspace: &Path) -> Self {
        let mut error = AppError::new(
            ErrorCategory::ConcurrencyError,
            format!(
                "another operation is already running in {}",
                workspace.display()
            ),
        )
        .with_code(CODE_OPERATION_IN_PROGRESS);
        error.add_context("workspace", &workspace.display().to_string());
        error
    }

    pub fn validation<C: Into<String>, T: Into<String>>(code: C, message: T) -> Self {
        AppError::new(ErrorCategory::ValidationError, message).with_code(code)
    }

    pub fn launch_failure(program: &str, source: std::io::Error) -> Self {
        let mut error = AppError::with_source(
            ErrorCategory::LaunchError,
            format!("failed to start '{}': {}", program, source),
            Box::new(source),
        )
        .with_code(CODE_LAUNCH_FAILURE);
        error.add_context("program", program);
        error
    }

    pub fn timeout(command: &str, limit: Duration) -> Self {
        let mut error = AppError::new(
            ErrorCategory::TimeoutError,
            format!(
                "'{}' did not finish within {}",
                command,
                humantime::format_duration(limit)
            ),
        )
        .with_code(CODE_TIMEOUT);
        error.add_context("command", command);
        error
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.category, self.message)?;
        if !self.context.is_empty() {
            let mut entries: Vec<_> = self.context.iter().collect();
            entries.sort();
            write!(f, " (Context: {:?})", entries)?;
        }
        if let Some(ref source) = self.source {
            write!(f, "\nCaused by: {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        AppError {
            category: ErrorCategory::InternalError,
            severity: ErrorSeverity::Error,
            code: "ANYHOW_ERROR".to_string(),
            message: e.to_string(),
            context: HashMap::new(),
            recovery_suggestions: vec!["Check the error details".to_string()],
            occurred_at: Utc::now(),
            source: Some(e),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError {
            category: ErrorCategory::IoError,
            severity: ErrorSeverity::Error,
            code: "IO_ERROR".to_string(),
            message: e.to_string(),
            context: HashMap::new(),
            recovery_suggestions: vec!["Check file permissions and paths".to_string()],
            occurred_at: Utc::now(),
            source: Some(anyhow::anyhow!(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_error_creation() {
        let error = AppError::new(ErrorCategory::ValidationError, "test error");
        assert_eq!(error.category, ErrorCategory::ValidationError);
        assert_eq!(error.message, "test error");
        assert!(error.code.starts_with("ERR-"));
    }

    #[test]
    fn test_error_with_context() {
        let mut error = AppError::new(ErrorCategory::CommandError, "push failed");
        error.add_context("remote", "origin");
        assert_eq!(error.context.get("remote"), Some(&"origin".to_string()));
    }

    #[test]
    fn test_error_severity() {
        assert_eq!(
            AppError::new(ErrorCategory::LaunchError, "x").severity(),
            ErrorSeverity::Error
        );
        assert_eq!(
            AppError::new(ErrorCategory::ConcurrencyError, "x").severity(),
            ErrorSeverity::Warning
        );
        assert_eq!(
            AppError::new(ErrorCategory::Unknown, "x").severity(),
            ErrorSeverity::Info
        );
    }

    #[test]
    fn test_operation_in_progress_names_workspace() {
        let error = AppError::operation_in_progress(&PathBuf::from("/work/repo"));
        assert!(error.is_category(ErrorCategory::ConcurrencyError));
        assert_eq!(error.code, CODE_OPERATION_IN_PROGRESS);
        assert!(error.to_string().contains("/work/repo"));
    }

    #[test]
    fn test_configuration_missing_has_suggestion() {
        let error = AppError::configuration_missing();
        assert_eq!(error.code, CODE_CONFIGURATION_MISSING);
        assert!(!error.recovery_suggestions.is_empty());
    }

    #[test]
    fn test_launch_failure_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let error = AppError::launch_failure("git", io);
        assert!(error.is_category(ErrorCategory::LaunchError));
        assert!(error.source.is_some());
        assert!(error.to_string().contains("Caused by"));
    }

    #[test]
    fn test_timeout_message_uses_human_duration() {
        let error = AppError::timeout("git push", Duration::from_secs(90));
        assert!(error.message.contains("1m 30s"));
        assert_eq!(error.code, CODE_TIMEOUT);
    }
}
