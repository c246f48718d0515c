#![allow(clippy::result_large_err)]

use super::{ConfigLoader, ConfigValidator, StoredConfig};
use crate::core::error::{AppError, CODE_CONFIGURATION_UNREADABLE};
use crate::core::types::ErrorCategory;
use gitship_types::ProjectConfig;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Owner of the persisted project record.
///
/// Reads go through [`ConfigLoader`]; writes replace the `[project]` table
/// wholesale and land atomically, so a crash mid-save leaves the previous
/// record in place.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn for_workspace(workspace_path: &Path) -> Self {
        Self::new(super::default_config_path(workspace_path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<StoredConfig, AppError> {
        ConfigLoader::load(&self.path)
    }

    /// Validate and persist `project` as the single active record.
    pub fn save_project(&self, project: &ProjectConfig) -> Result<ProjectConfig, AppError> {
        let project = project.normalized();
        ConfigValidator::validate_project(&project)?;

        let mut table = self.read_table()?;
        let value = toml::Value::try_from(&project).map_err(|e| {
            AppError::new(
                ErrorCategory::SerializationError,
                format!("Failed to serialize project record: {}", e),
            )
        })?;
        table.insert("project".to_string(), value);
        self.write_table(&table)?;

        tracing::info!(path = %self.path.display(), "project configuration saved");
        Ok(project)
    }

    // Sections other than [project] survive a save untouched, and a broken
    // [project] table can still be replaced.
    fn read_table(&self) -> Result<toml::Table, AppError> {
        if !self.path.exists() {
            return Ok(toml::Table::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        content.parse::<toml::Table>().map_err(|e| {
            AppError::new(
                ErrorCategory::ConfigurationError,
                format!("Failed to parse config file {}: {}", self.path.display(), e),
            )
            .with_code(CODE_CONFIGURATION_UNREADABLE)
        })
    }

    fn write_table(&self, table: &toml::Table) -> Result<(), AppError> {
        let content = toml::to_string_pretty(table).map_err(|e| {
            AppError::new(
                ErrorCategory::SerializationError,
                format!("Failed to serialize config: {}", e),
            )
        })?;

        let directory = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&directory)?;

        let mut file = NamedTempFile::new_in(&directory)?;
        file.write_all(content.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(&self.path).map_err(|e| AppError::from(e.error))?;
        Ok(())
    }
}

/// True when a stored config would hand out a project.
pub fn is_configured(config: &StoredConfig) -> bool {
    config.project.is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gitship_types::AuthMode;
    use tempfile::TempDir;

    fn project() -> ProjectConfig {
        ProjectConfig::new("https://github.com/owner/repo.git", "owner", "owner@example.com")
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = ConfigStore::for_workspace(temp_dir.path());
        assert!(!is_configured(&store.load().unwrap()));

        store.save_project(&project().with_token("abc123")).unwrap();

        let loaded = store.load().unwrap();
        assert!(is_configured(&loaded));
        let stored = loaded.project.unwrap();
        assert_eq!(stored.auth_mode, AuthMode::Token);
        assert_eq!(stored.token, "abc123");
    }

    #[test]
    fn test_save_replaces_record_wholesale() {
        let temp_dir = TempDir::new().unwrap();
        let store = ConfigStore::for_workspace(temp_dir.path());

        store.save_project(&project().with_token("abc123")).unwrap();
        let replaced = ProjectConfig::new("https://example.com/x/y.git", "x", "x@example.com");
        store.save_project(&replaced).unwrap();

        let stored = store.load().unwrap().project.unwrap();
        assert_eq!(stored, replaced);
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(!raw.contains("abc123"));
    }

    #[test]
    fn test_save_keeps_pipeline_section() {
        let temp_dir = TempDir::new().unwrap();
        let store = ConfigStore::new(temp_dir.path().join("custom.toml"));
        std::fs::write(store.path(), "[pipeline]\nbranch = \"trunk\"\n").unwrap();

        store.save_project(&project()).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.pipeline.branch, "trunk");
        assert!(loaded.project.is_some());
    }

    #[test]
    fn test_invalid_record_is_not_written() {
        let temp_dir = TempDir::new().unwrap();
        let store = ConfigStore::for_workspace(temp_dir.path());

        let err = store.save_project(&project().with_token("")).unwrap_err();
        assert!(err.is_category(ErrorCategory::ValidationError));
        assert!(!store.path().exists());
    }

    #[test]
    fn test_save_replaces_broken_project_table() {
        let temp_dir = TempDir::new().unwrap();
        let store = ConfigStore::new(temp_dir.path().join("config.toml"));
        std::fs::write(store.path(), "[project]\nusername = \"half\"\n").unwrap();
        assert!(store.load().is_err());

        store.save_project(&project()).unwrap();
        assert_eq!(store.load().unwrap().project.unwrap(), project());
    }
}
