use gitship_types::ProjectConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub mod loader;
pub mod store;
pub mod validation;

pub use loader::ConfigLoader;
pub use store::ConfigStore;
pub use validation::ConfigValidator;

/// Directory holding gitship's local state inside a working tree.
pub const STATE_DIR: &str = ".gitship";
pub const CONFIG_FILE: &str = "config.toml";

/// Default location of the configuration record for a working tree.
pub fn default_config_path(workspace_path: &Path) -> PathBuf {
    workspace_path.join(STATE_DIR).join(CONFIG_FILE)
}

/// Contents of the configuration file.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct StoredConfig {
    /// The active project; `None` means "not yet configured".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectConfig>,

    /// Tunables for the pipeline operations
    #[serde(default)]
    pub pipeline: PipelineSettings,
}

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineSettings {
    /// Branch that Publish creates and TriggerBuild pushes
    #[serde(default = "default_branch")]
    pub branch: String,

    /// Remote name managed by the pipeline
    #[serde(default = "default_remote")]
    pub remote: String,

    /// Per-command time budget in humantime form; "0s" disables it
    #[serde(default = "default_command_timeout")]
    pub command_timeout: String,

    /// File that receives the build marker when it exists
    #[serde(default = "default_marker_file")]
    pub marker_file: String,

    /// Dedicated marker file used when `marker_file` is absent
    #[serde(default = "default_fallback_marker_file")]
    pub fallback_marker_file: String,

    /// Message of the Publish commit
    #[serde(default = "default_publish_commit_message")]
    pub publish_commit_message: String,

    /// Message of the empty commit Publish falls back to
    #[serde(default = "default_empty_commit_message")]
    pub empty_commit_message: String,
}

impl PipelineSettings {
    /// Parsed `command_timeout`; zero means unbounded.
    pub fn command_timeout(&self) -> Result<Option<Duration>, humantime::DurationError> {
        let parsed = humantime::parse_duration(self.command_timeout.trim())?;
        Ok(if parsed.is_zero() { None } else { Some(parsed) })
    }
}

// Default functions
fn default_branch() -> String {
    "main".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_command_timeout() -> String {
    "5m".to_string()
}

fn default_marker_file() -> String {
    "README.md".to_string()
}

fn default_fallback_marker_file() -> String {
    ".build_trigger".to_string()
}

fn default_publish_commit_message() -> String {
    "Update: publish working tree".to_string()
}

fn default_empty_commit_message() -> String {
    "Initial commit".to_string()
}

impl Default for PipelineSettings {
    fn default() -> Self {
        PipelineSettings {
            branch: default_branch(),
            remote: default_remote(),
            command_timeout: default_command_timeout(),
            marker_file: default_marker_file(),
            fallback_marker_file: default_fallback_marker_file(),
            publish_commit_message: default_publish_commit_message(),
            empty_commit_message: default_empty_commit_message(),
        }
    }
}
