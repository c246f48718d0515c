#![allow(clippy::result_large_err)] // Git commit helpers return AppError directly to preserve step diagnostics without boxing.

use super::GitManager;
use crate::core::error::AppError;
use gitship_types::CommandResult;

/// Manages staging and commits
pub struct CommitManager {
    git: GitManager,
}

impl CommitManager {
    pub fn new(git: GitManager) -> Self {
        Self { git }
    }

    /// Stage every working-tree change, including deletions (git add -A)
    pub async fn stage_all(&self) -> Result<CommandResult, AppError> {
        self.git.git(&["add", "-A"]).await
    }

    /// Stage a single path
    pub async fn stage_path(&self, path: &str) -> Result<CommandResult, AppError> {
        self.git.git(&["add", "--", path]).await
    }

    /// Commit whatever is staged
    pub async fn commit(&self, message: &str) -> Result<CommandResult, AppError> {
        self.git.git(&["commit", "-m", message]).await
    }

    /// Commit even when the index matches HEAD
    pub async fn commit_allow_empty(&self, message: &str) -> Result<CommandResult, AppError> {
        self.git
            .git(&["commit", "--allow-empty", "-m", message])
            .await
    }

    /// Commit only the given paths, leaving anything else in the index alone
    pub async fn commit_paths(
        &self,
        message: &str,
        paths: &[&str],
    ) -> Result<CommandResult, AppError> {
        let mut args = vec!["commit", "-m", message, "--"];
        args.extend_from_slice(paths);
        self.git.git(&args).await
    }
}
