#![allow(clippy::result_large_err)] // Git branch operations bubble AppError for launch failures so extra boxing is unnecessary.

use super::GitManager;
use crate::core::error::AppError;
use gitship_types::CommandResult;

/// Manages branch naming and pushes
pub struct BranchManager {
    git: GitManager,
}

impl BranchManager {
    pub fn new(git: GitManager) -> Self {
        Self { git }
    }

    /// Rename the current branch, overwriting any branch of that name (git branch -M)
    pub async fn rename_current(&self, name: &str) -> Result<CommandResult, AppError> {
        self.git.git(&["branch", "-M", name]).await
    }

    /// Push a branch, optionally recording it as the upstream
    pub async fn push(
        &self,
        remote: &str,
        branch: &str,
        set_upstream: bool,
    ) -> Result<CommandResult, AppError> {
        if set_upstream {
            self.git.git(&["push", "-u", remote, branch]).await
        } else {
            self.git.git(&["push", remote, branch]).await
        }
    }

    /// Get the current branch name
    pub async fn current(&self) -> Result<CommandResult, AppError> {
        self.git
            .git(&["rev-parse", "--abbrev-ref", "HEAD"])
            .await
    }
}
