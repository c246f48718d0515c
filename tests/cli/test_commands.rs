use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn gitship(workspace: &Path) -> Command {
    let mut cmd = Command::cargo_bin("gitship").unwrap();
    cmd.arg("--workspace").arg(workspace);
    for var in [
        "GITSHIP_TOKEN",
        "GITSHIP_BRANCH",
        "GITSHIP_REMOTE",
        "GITSHIP_COMMAND_TIMEOUT",
        "GITSHIP_LOG_DIR",
        "GITSHIP_MACHINE_OUTPUT",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

fn configure(workspace: &Path, repository_url: &str) {
    gitship(workspace)
        .args([
            "config",
            "set",
            "--repository-url",
            repository_url,
            "--username",
            "Release Bot",
            "--email",
            "bot@example.com",
        ])
        .assert()
        .success();
}

#[test]
fn test_help_lists_commands() {
    let mut cmd = Command::cargo_bin("gitship").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("publish"))
        .stdout(predicate::str::contains("trigger"))
        .stdout(predicate::str::contains("release"));
}

#[test]
fn test_version_command() {
    let mut cmd = Command::cargo_bin("gitship").unwrap();
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("gitship"));
}

#[test]
fn test_release_with_empty_label_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    configure(temp_dir.path(), "https://example.com/u/r.git");

    gitship(temp_dir.path())
        .args(["release", ""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("VAL-001"));
    assert!(!temp_dir.path().join(".git").exists());
}

#[test]
fn test_publish_without_configuration_fails_without_running_git() {
    let temp_dir = TempDir::new().unwrap();

    gitship(temp_dir.path())
        .arg("publish")
        .assert()
        .failure()
        .stdout(predicate::str::contains("not configured"));
    assert!(!temp_dir.path().join(".git").exists());
}

#[test]
fn test_config_set_then_show_redacts_token() {
    let temp_dir = TempDir::new().unwrap();

    gitship(temp_dir.path())
        .args([
            "config",
            "set",
            "--repository-url",
            "https://example.com/u/r.git",
            "--username",
            "u",
            "--email",
            "u@example.com",
            "--auth-mode",
            "token",
            "--token",
            "abc123",
        ])
        .assert()
        .success();

    gitship(temp_dir.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("auth_mode      = token"))
        .stdout(predicate::str::contains("abc123").not());
}

#[test]
fn test_config_set_rejects_token_mode_without_token() {
    let temp_dir = TempDir::new().unwrap();

    gitship(temp_dir.path())
        .args([
            "config",
            "set",
            "--repository-url",
            "https://example.com/u/r.git",
            "--username",
            "u",
            "--email",
            "u@example.com",
            "--auth-mode",
            "token",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("token is required"));
    assert!(!temp_dir.path().join(".gitship/config.toml").exists());
}

#[test]
fn test_urls_command() {
    let temp_dir = TempDir::new().unwrap();
    configure(temp_dir.path(), "https://host/owner/repo.git");

    gitship(temp_dir.path())
        .arg("urls")
        .assert()
        .success()
        .stdout(predicate::str::contains("https://host/owner/repo/actions"))
        .stdout(predicate::str::contains("https://host/owner/repo/releases"));
}

#[test]
fn test_publish_and_release_against_local_remote() {
    let root = TempDir::new().unwrap();
    let workspace = root.path().join("work");
    let remote = root.path().join("remote.git");
    std::fs::create_dir_all(&workspace).unwrap();
    std::fs::create_dir_all(&remote).unwrap();
    std::process::Command::new("git")
        .args(["init", "--bare"])
        .current_dir(&remote)
        .output()
        .unwrap();
    std::fs::write(workspace.join("README.md"), "# demo\n").unwrap();
    configure(&workspace, &format!("file://{}", remote.display()));

    gitship(&workspace)
        .arg("publish")
        .assert()
        .success()
        .stdout(predicate::str::contains("publish succeeded"));

    let output = gitship(&workspace)
        .args(["release", "v0.1.0", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let result: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(result["operation"], "create_release");
    assert_eq!(result["final_succeeded"], true);
    assert_eq!(result["steps"].as_array().unwrap().len(), 2);
}
