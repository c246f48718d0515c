#![allow(clippy::result_large_err)]

use super::GitManager;
use crate::core::error::AppError;
use gitship_types::CommandResult;

/// Manages release tags
pub struct TagManager {
    git: GitManager,
}

impl TagManager {
    pub fn new(git: GitManager) -> Self {
        Self { git }
    }

    /// Create an annotated tag at HEAD
    pub async fn create_annotated(
        &self,
        name: &str,
        message: &str,
    ) -> Result<CommandResult, AppError> {
        self.git.git(&["tag", "-a", "-m", message, name]).await
    }

    /// Push a single tag; other local tags stay unpublished
    pub async fn push(&self, remote: &str, name: &str) -> Result<CommandResult, AppError> {
        let refspec = format!("refs/tags/{}", name);
        self.git.git(&["push", remote, &refspec]).await
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::GitManager;
    use crate::core::command::TokioCommandRunner;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_create_and_push_single_tag() {
        let remote = TempDir::new().unwrap();
        init_bare_remote(remote.path());
        let work = TempDir::new().unwrap();
        init_with_commit(work.path());
        git(
            work.path(),
            &["remote", "add", "origin", &remote.path().display().to_string()],
        );
        git(work.path(), &["tag", "-a", "-m", "other", "v0.0.1"]);

        let tags = GitManager::new(work.path(), Arc::new(TokioCommandRunner)).tag_manager();
        let created = tags.create_annotated("v1.0.0", "Release v1.0.0").await.unwrap();
        assert!(created.succeeded, "tag failed: {}", created.stderr);

        let tag_type = git(work.path(), &["cat-file", "-t", "v1.0.0"]);
        assert_eq!(String::from_utf8_lossy(&tag_type.stdout).trim(), "tag");

        let pushed = tags.push("origin", "v1.0.0").await.unwrap();
        assert!(pushed.succeeded, "push failed: {}", pushed.stderr);

        let remote_tags = git(remote.path(), &["tag", "--list"]);
        let listed = String::from_utf8_lossy(&remote_tags.stdout).to_string();
        assert!(listed.contains("v1.0.0"));
        assert!(!listed.contains("v0.0.1"));
    }

    #[tokio::test]
    async fn test_duplicate_tag_fails_as_data() {
        let work = TempDir::new().unwrap();
        init_with_commit(work.path());

        let tags = GitManager::new(work.path(), Arc::new(TokioCommandRunner)).tag_manager();
        assert!(tags.create_annotated("v1", "Release v1").await.unwrap().succeeded);
        let again = tags.create_annotated("v1", "Release v1").await.unwrap();
        assert!(!again.succeeded);
        assert!(again.stderr.contains("already exists"));
    }
}
