//! End-to-end runs against a real git binary and a local bare remote.

use gitship::core::config::PipelineSettings;
use gitship::core::pipeline::{Pipeline, WorkspaceLocks};
use gitship::core::progress::NoopReporter;
use gitship::types::{ProjectConfig, StepFailureKind};
use serial_test::serial;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use tempfile::TempDir;

fn git(path: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(path)
        .output()
        .unwrap();
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

struct Fixture {
    _root: TempDir,
    workspace: std::path::PathBuf,
    remote: std::path::PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        let workspace = root.path().join("work");
        let remote = root.path().join("remote.git");
        std::fs::create_dir_all(&workspace).unwrap();
        std::fs::create_dir_all(&remote).unwrap();
        git(&remote, &["init", "--bare"]);
        std::fs::write(workspace.join("README.md"), "# demo\n").unwrap();
        std::fs::write(workspace.join("main.txt"), "hello\n").unwrap();
        Fixture {
            _root: root,
            workspace,
            remote,
        }
    }

    fn project(&self) -> ProjectConfig {
        ProjectConfig::new(
            format!("file://{}", self.remote.display()),
            "Release Bot",
            "bot@example.com",
        )
    }

    fn pipeline(&self) -> Pipeline {
        let settings = PipelineSettings {
            command_timeout: "60s".to_string(),
            ..PipelineSettings::default()
        };
        Pipeline::new(&self.workspace, settings)
            .unwrap()
            .with_reporter(Arc::new(NoopReporter))
            .with_locks(WorkspaceLocks::new())
    }

    fn remote_head(&self) -> String {
        git(&self.remote, &["rev-parse", "main"])
    }
}

#[tokio::test]
async fn test_publish_creates_remote_branch() {
    let fixture = Fixture::new();
    std::fs::create_dir_all(fixture.workspace.join(".gitship")).unwrap();
    std::fs::write(
        fixture.workspace.join(".gitship/config.toml"),
        "[project]\ntoken = \"secret\"\n",
    )
    .unwrap();

    let result = fixture
        .pipeline()
        .publish(Some(&fixture.project()))
        .await
        .unwrap();

    assert!(result.final_succeeded, "{:?}", result);
    assert_eq!(result.failed_steps().count(), 0);
    assert_eq!(fixture.remote_head(), git(&fixture.workspace, &["rev-parse", "HEAD"]));
    assert_eq!(git(&fixture.workspace, &["config", "user.name"]), "Release Bot");

    let tracked = git(&fixture.workspace, &["ls-files"]);
    assert!(tracked.contains("main.txt"));
    assert!(!tracked.contains(".gitship"));
}

#[tokio::test]
async fn test_second_publish_without_changes_still_succeeds() {
    let fixture = Fixture::new();
    let pipeline = fixture.pipeline();
    let project = fixture.project();

    let first = pipeline.publish(Some(&project)).await.unwrap();
    assert!(first.final_succeeded);

    let second = pipeline.publish(Some(&project)).await.unwrap();
    assert!(second.final_succeeded, "{:?}", second);
    let commit = second.step("commit").unwrap();
    assert!(!commit.succeeded);
    assert_eq!(commit.failure, Some(StepFailureKind::Command));
    assert!(second.step("empty commit").unwrap().succeeded);
    assert_eq!(
        fixture.remote_head(),
        git(&fixture.workspace, &["rev-parse", "HEAD"])
    );
}

#[tokio::test]
#[serial]
async fn test_publish_of_empty_tree_under_translated_locale() {
    let fixture = Fixture::new();
    std::fs::remove_file(fixture.workspace.join("README.md")).unwrap();
    std::fs::remove_file(fixture.workspace.join("main.txt")).unwrap();

    let saved: Vec<_> = ["LANGUAGE", "LC_ALL"]
        .iter()
        .map(|key| (*key, std::env::var(key).ok()))
        .collect();
    std::env::set_var("LANGUAGE", "de");
    std::env::set_var("LC_ALL", "C.UTF-8");

    let result = fixture.pipeline().publish(Some(&fixture.project())).await;

    for (key, value) in saved {
        match value {
            Some(value) => std::env::set_var(key, value),
            None => std::env::remove_var(key),
        }
    }

    let result = result.unwrap();
    assert!(result.final_succeeded, "{:?}", result);
    assert_eq!(result.step("commit").unwrap().detail, "nothing to commit");
    assert!(result.step("empty commit").unwrap().succeeded);
    assert_eq!(
        fixture.remote_head(),
        git(&fixture.workspace, &["rev-parse", "HEAD"])
    );
}

#[tokio::test]
async fn test_trigger_build_commits_exactly_the_marker() {
    let fixture = Fixture::new();
    let pipeline = fixture.pipeline();
    let project = fixture.project();
    assert!(pipeline.publish(Some(&project)).await.unwrap().final_succeeded);

    // Unrelated edits stay out of trigger commits.
    std::fs::write(fixture.workspace.join("main.txt"), "edited\n").unwrap();

    let mut previous = std::fs::metadata(fixture.workspace.join("README.md"))
        .unwrap()
        .len();
    for _ in 0..2 {
        let result = pipeline.trigger_build(Some(&project)).await.unwrap();
        assert!(result.final_succeeded, "{:?}", result);
        assert!(result.link.as_deref().unwrap().ends_with("/actions"));

        let changed = git(&fixture.workspace, &["show", "--name-only", "--format=", "HEAD"]);
        assert_eq!(changed, "README.md");

        let size = std::fs::metadata(fixture.workspace.join("README.md"))
            .unwrap()
            .len();
        assert!(size > previous);
        previous = size;
    }

    assert_eq!(
        fixture.remote_head(),
        git(&fixture.workspace, &["rev-parse", "HEAD"])
    );
    let status = git(&fixture.workspace, &["status", "--porcelain"]);
    assert!(status.contains("main.txt"));
}

#[tokio::test]
async fn test_release_pushes_only_its_tag() {
    let fixture = Fixture::new();
    let pipeline = fixture.pipeline();
    let project = fixture.project();
    assert!(pipeline.publish(Some(&project)).await.unwrap().final_succeeded);
    git(&fixture.workspace, &["tag", "scratch"]);

    let result = pipeline
        .create_release(Some(&project), "v1.0.0")
        .await
        .unwrap();

    assert!(result.final_succeeded, "{:?}", result);
    let remote_tags = git(&fixture.remote, &["tag", "--list"]);
    assert!(remote_tags.contains("v1.0.0"));
    assert!(!remote_tags.contains("scratch"));
    assert_eq!(
        git(&fixture.workspace, &["tag", "-l", "--format=%(contents:subject)", "v1.0.0"]),
        "Release v1.0.0"
    );

    // Re-releasing the same label: creation fails, the push is still tried.
    let again = pipeline
        .create_release(Some(&project), "v1.0.0")
        .await
        .unwrap();
    assert!(!again.step("create tag").unwrap().succeeded);
    assert!(again.step("push tag").is_some());
}

#[tokio::test]
async fn test_unreachable_remote_fails_at_push() {
    let fixture = Fixture::new();
    let mut project = fixture.project();
    project.repository_url = format!(
        "file://{}",
        fixture.remote.with_file_name("missing.git").display()
    );

    let result = fixture.pipeline().publish(Some(&project)).await.unwrap();

    assert!(!result.final_succeeded);
    assert!(!result.cancelled);
    let push = result.step("push").unwrap();
    assert_eq!(push.failure, Some(StepFailureKind::Command));
    assert!(result.step("commit").unwrap().succeeded);
}
