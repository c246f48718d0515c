use gitship::core::config::{ConfigLoader, ConfigStore};
use gitship::types::{AuthMode, ProjectConfig};
use serial_test::serial;
use std::env;
use tempfile::TempDir;

fn clear_gitship_env() {
    for v in &[
        "GITSHIP_TOKEN",
        "GITSHIP_BRANCH",
        "GITSHIP_REMOTE",
        "GITSHIP_COMMAND_TIMEOUT",
    ] {
        env::remove_var(v);
    }
}

#[test]
#[serial]
fn test_saved_record_is_loaded_with_env_overrides() {
    clear_gitship_env();
    let temp_dir = TempDir::new().unwrap();
    let store = ConfigStore::for_workspace(temp_dir.path());

    let project = ProjectConfig::new(
        " https://github.com/owner/repo.git ",
        "owner",
        "o@example.com",
    )
    .with_token("from-save");
    store.save_project(&project).unwrap();

    env::set_var("GITSHIP_TOKEN", "from-env");
    env::set_var("GITSHIP_REMOTE", "upstream");
    env::set_var("GITSHIP_COMMAND_TIMEOUT", "90s");

    let loaded = ConfigLoader::load_from_workspace(temp_dir.path()).unwrap();
    let stored = loaded.project.unwrap();
    assert_eq!(stored.repository_url, "https://github.com/owner/repo.git");
    assert_eq!(stored.auth_mode, AuthMode::Token);
    assert_eq!(stored.token, "from-env");
    assert_eq!(loaded.pipeline.remote, "upstream");
    assert_eq!(
        loaded.pipeline.command_timeout().unwrap(),
        Some(std::time::Duration::from_secs(90))
    );

    // The override never reaches the file.
    let raw = std::fs::read_to_string(store.path()).unwrap();
    assert!(raw.contains("from-save"));
    assert!(!raw.contains("from-env"));

    clear_gitship_env();
}

#[test]
#[serial]
fn test_switching_to_password_mode_drops_the_token() {
    clear_gitship_env();
    let temp_dir = TempDir::new().unwrap();
    let store = ConfigStore::for_workspace(temp_dir.path());

    store
        .save_project(
            &ProjectConfig::new("https://example.com/u/r.git", "u", "u@example.com")
                .with_token("abc123"),
        )
        .unwrap();

    let mut password = ProjectConfig::new("https://example.com/u/r.git", "u", "u@example.com");
    password.token = "stale".to_string();
    let saved = store.save_project(&password).unwrap();
    assert!(saved.token.is_empty());

    let raw = std::fs::read_to_string(store.path()).unwrap();
    assert!(!raw.contains("abc123"));
    assert!(!raw.contains("stale"));
    assert!(!raw.contains("token ="));
}

#[test]
#[serial]
fn test_zero_timeout_disables_the_bound() {
    clear_gitship_env();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("custom.toml");
    std::fs::write(&path, "[pipeline]\ncommand_timeout = \"0s\"\n").unwrap();

    let loaded = ConfigLoader::load(&path).unwrap();
    assert!(loaded.project.is_none());
    assert_eq!(loaded.pipeline.command_timeout().unwrap(), None);
}
