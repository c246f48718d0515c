#![allow(clippy::result_large_err)]

mod branch;
mod commit;
mod remote;
mod tag;

pub use branch::BranchManager;
pub use commit::CommitManager;
pub use remote::RemoteManager;
pub use tag::TagManager;

use crate::core::command::{CommandRequest, CommandRunner};
use crate::core::error::AppError;
use gitship_types::CommandResult;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

const NOTHING_TO_COMMIT_MARKERS: &[&str] = &["nothing to commit", "nothing added to commit"];
const UP_TO_DATE_MARKER: &str = "Everything up-to-date";

/// Git operations manager - facade for git operations in one working tree
#[derive(Clone)]
pub struct GitManager {
    workspace_path: PathBuf,
    runner: Arc<dyn CommandRunner>,
    timeout: Option<Duration>,
}

impl GitManager {
    pub fn new(workspace_path: &Path, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            workspace_path: workspace_path.to_path_buf(),
            runner,
            timeout: None,
        }
    }

    /// Bound every git invocation; `None` lets commands run to completion.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn workspace_path(&self) -> &Path {
        &self.workspace_path
    }

    /// Check if the workspace has its own repository (not an enclosing one)
    pub fn is_git_repo(&self) -> bool {
        self.workspace_path.join(".git").exists()
    }

    /// Run `git <args>` in the workspace.
    pub async fn git(&self, args: &[&str]) -> Result<CommandResult, AppError> {
        let request = CommandRequest::new("git")
            .args(args.iter().copied())
            .current_dir(&self.workspace_path)
            .env("GIT_TERMINAL_PROMPT", "0")
            // Output classifiers below match untranslated messages.
            .env("LC_ALL", "C")
            .env("LANGUAGE", "")
            .timeout(self.timeout);
        self.runner.run(&request).await
    }

    pub async fn version(&self) -> Result<CommandResult, AppError> {
        self.git(&["--version"]).await
    }

    pub async fn init(&self) -> Result<CommandResult, AppError> {
        self.git(&["init"]).await
    }

    /// Repository-local `git config <key> <value>`.
    pub async fn set_config(&self, key: &str, value: &str) -> Result<CommandResult, AppError> {
        self.git(&["config", key, value]).await
    }

    pub fn branch_manager(&self) -> BranchManager {
        BranchManager::new(self.clone())
    }

    pub fn commit_manager(&self) -> CommitManager {
        CommitManager::new(self.clone())
    }

    pub fn remote_manager(&self) -> RemoteManager {
        RemoteManager::new(self.clone())
    }

    pub fn tag_manager(&self) -> TagManager {
        TagManager::new(self.clone())
    }
}

/// True when a failed commit failed only because the index had no changes.
pub fn is_nothing_to_commit(result: &CommandResult) -> bool {
    let output = result.combined_output();
    NOTHING_TO_COMMIT_MARKERS
        .iter()
        .any(|marker| output.contains(marker))
}

/// True when push output says the remote already has everything.
pub fn is_up_to_date(result: &CommandResult) -> bool {
    result.combined_output().contains(UP_TO_DATE_MARKER)
}

/// Short human summary of a command's output for step details.
pub fn summarize(result: &CommandResult) -> String {
    let output = result.combined_output();
    let summary = output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("; ");
    if summary.is_empty() {
        match result.exit_code {
            Some(code) => format!("exit code {}", code),
            None => "terminated by signal".to_string(),
        }
    } else {
        summary
            .split(' ')
            .map(crate::core::credentials::redact_url)
            .collect::<Vec<_>>()
            .join(" ")
    }
}
