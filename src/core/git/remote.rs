#![allow(clippy::result_large_err)]

use super::GitManager;
use crate::core::error::AppError;
use gitship_types::CommandResult;

/// Manages remote definitions
pub struct RemoteManager {
    git: GitManager,
}

impl RemoteManager {
    pub fn new(git: GitManager) -> Self {
        Self { git }
    }

    /// Remove a remote; fails harmlessly when it does not exist
    pub async fn remove(&self, name: &str) -> Result<CommandResult, AppError> {
        self.git.git(&["remote", "remove", name]).await
    }

    pub async fn add(&self, name: &str, url: &str) -> Result<CommandResult, AppError> {
        self.git.git(&["remote", "add", name, url]).await
    }

    /// Point an existing remote at a new URL
    pub async fn set_url(&self, name: &str, url: &str) -> Result<CommandResult, AppError> {
        self.git.git(&["remote", "set-url", name, url]).await
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::GitManager;
    use crate::core::command::TokioCommandRunner;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn remote_url(path: &std::path::Path) -> String {
        String::from_utf8_lossy(&git(path, &["remote", "get-url", "origin"]).stdout)
            .trim()
            .to_string()
    }

    #[tokio::test]
    async fn test_remove_missing_remote_fails_without_error() {
        let temp_dir = TempDir::new().unwrap();
        init_git_repo(temp_dir.path());

        let remotes =
            GitManager::new(temp_dir.path(), Arc::new(TokioCommandRunner)).remote_manager();
        let result = remotes.remove("origin").await.unwrap();
        assert!(!result.succeeded);
    }

    #[tokio::test]
    async fn test_add_then_set_url() {
        let temp_dir = TempDir::new().unwrap();
        init_git_repo(temp_dir.path());

        let remotes =
            GitManager::new(temp_dir.path(), Arc::new(TokioCommandRunner)).remote_manager();
        assert!(remotes
            .add("origin", "https://example.com/u/r.git")
            .await
            .unwrap()
            .succeeded);
        assert_eq!(remote_url(temp_dir.path()), "https://example.com/u/r.git");

        assert!(remotes
            .set_url("origin", "https://tok@example.com/u/r.git")
            .await
            .unwrap()
            .succeeded);
        assert_eq!(remote_url(temp_dir.path()), "https://tok@example.com/u/r.git");

        assert!(remotes.remove("origin").await.unwrap().succeeded);
    }
}
