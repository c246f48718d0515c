use crate::cli::args::{ConfigSetArgs, OutputArgs};
use crate::cli::render;
use crate::core::config::{ConfigLoader, ConfigStore, StoredConfig};
use crate::core::error::AppError;
use crate::core::pipeline::{OperationRequest, Pipeline};
use crate::core::progress::{ChannelReporter, MultiReporter, ProgressEvent, TracingReporter};
use crate::core::urls::{ci_status_url, releases_url, repository_page_url};
use crate::Result;
use anyhow::Context;
use gitship_types::{AuthMode, ProjectConfig};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;

const REDACTED: &str = "***";

/// Pipeline operation selected on the command line.
#[derive(Debug, Clone)]
pub enum Operation {
    Publish,
    TriggerBuild,
    CreateRelease(String),
}

impl From<Operation> for OperationRequest {
    fn from(operation: Operation) -> Self {
        match operation {
            Operation::Publish => OperationRequest::Publish,
            Operation::TriggerBuild => OperationRequest::TriggerBuild,
            Operation::CreateRelease(version) => OperationRequest::CreateRelease { version },
        }
    }
}

/// Run one pipeline operation, streaming progress until it finishes.
/// Ctrl-C cancels before the next step.
pub async fn operate(
    workspace: &Path,
    config_path: &Path,
    operation: Operation,
    output: &OutputArgs,
) -> Result<bool> {
    let stored = ConfigLoader::load(config_path)?;
    let (reporter, mut events) = ChannelReporter::new();
    let reporter = MultiReporter::new()
        .with(Arc::new(reporter))
        .with(Arc::new(TracingReporter));
    let pipeline = Pipeline::new(workspace, stored.pipeline)?.with_reporter(Arc::new(reporter));
    let handle = pipeline.spawn(operation.into(), stored.project)?;
    drop(pipeline);

    let cancel = handle.cancel_flag();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut interrupted = false;

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                let finished = matches!(event, ProgressEvent::Finished(_));
                if !output.json {
                    println!("{}", render::event(&event));
                }
                if finished {
                    break;
                }
            }
            signal = &mut ctrl_c, if !interrupted => {
                interrupted = true;
                if signal.is_ok() {
                    tracing::warn!("interrupt received; cancelling after the current step");
                    eprintln!("Cancelling after the current step...");
                    cancel.cancel();
                }
            }
        }
    }

    let result = handle.wait().await?;
    if output.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }
    Ok(result.final_succeeded)
}

pub fn config_show(config_path: &Path, output: &OutputArgs) -> Result<bool> {
    let stored = ConfigLoader::load(config_path)?;
    let project = stored.project.as_ref().map(redacted_project);

    if output.json {
        let document = json!({
            "path": config_path.display().to_string(),
            "project": project,
            "pipeline": stored.pipeline,
        });
        println!("{}", serde_json::to_string_pretty(&document)?);
        return Ok(true);
    }

    println!("Config file: {}", config_path.display());
    match project {
        Some(project) => {
            println!("[project]");
            println!("repository_url = {}", project.repository_url);
            println!("username       = {}", project.username);
            println!("email          = {}", project.email);
            println!("auth_mode      = {}", project.auth_mode);
            if project.uses_token() {
                println!("token          = {}", project.token);
            }
        }
        None => println!("Project is not configured; run `gitship config set`."),
    }
    let pipeline = toml::to_string_pretty(&stored.pipeline)
        .context("failed to render pipeline settings")?;
    println!("[pipeline]\n{}", pipeline.trim_end());
    Ok(true)
}

pub fn config_set(config_path: &Path, args: ConfigSetArgs) -> Result<bool> {
    let mut project = ProjectConfig::new(args.repository_url, args.username, args.email);
    project.auth_mode = args.auth_mode;
    if let Some(token) = args.token {
        project.token = token;
    }
    if project.auth_mode == AuthMode::Password && !project.token.is_empty() {
        tracing::warn!("--token is ignored with --auth-mode password");
    }

    let saved = ConfigStore::new(config_path).save_project(&project)?;
    println!(
        "Saved project {} ({} auth) to {}",
        saved.repository_url,
        saved.auth_mode,
        config_path.display()
    );
    Ok(true)
}

pub fn config_path(config_path: &Path) -> Result<bool> {
    println!("{}", config_path.display());
    Ok(true)
}

pub async fn doctor(workspace: &Path, config_path: &Path) -> Result<bool> {
    let mut healthy = true;

    let settings = match ConfigLoader::load(config_path) {
        Ok(stored) => {
            report_config(&stored, config_path);
            stored.pipeline
        }
        Err(err) => {
            healthy = false;
            println!("config:    error: {}", err.message);
            Default::default()
        }
    };

    let pipeline = Pipeline::new(workspace, settings)?;
    match pipeline.check_environment().await {
        Ok(version) => println!("git:       {}", version),
        Err(err) => {
            healthy = false;
            println!("git:       error: {}", err.message);
        }
    }

    let repository = if workspace.join(".git").exists() {
        "initialized"
    } else {
        "not initialized (publish will run git init)"
    };
    println!("workspace: {} ({})", workspace.display(), repository);

    println!("\nEnvironment overrides:");
    for doc in ConfigLoader::env_var_documentation() {
        println!("  {}", doc);
    }
    Ok(healthy)
}

fn report_config(stored: &StoredConfig, config_path: &Path) {
    match &stored.project {
        Some(project) => println!(
            "config:    {} ({} auth) from {}",
            project.repository_url,
            project.auth_mode,
            config_path.display()
        ),
        None => println!("config:    not configured ({})", config_path.display()),
    }
}

pub fn urls(config_path: &Path, output: &OutputArgs) -> Result<bool> {
    let stored = ConfigLoader::load(config_path)?;
    let project = stored
        .project
        .ok_or_else(AppError::configuration_missing)?;
    let url = &project.repository_url;

    let repository = repository_page_url(url);
    let ci_status = ci_status_url(url);
    let releases = releases_url(url);

    if output.json {
        let document = json!({
            "repository": repository,
            "ci_status": ci_status,
            "releases": releases,
        });
        println!("{}", serde_json::to_string_pretty(&document)?);
    } else {
        for (label, value) in [
            ("repository", repository),
            ("ci status", ci_status),
            ("releases", releases),
        ] {
            println!("{:<11} {}", format!("{}:", label), value.unwrap_or_default());
        }
    }
    Ok(true)
}

fn redacted_project(project: &ProjectConfig) -> ProjectConfig {
    let mut shown = project.clone();
    if !shown.token.is_empty() {
        shown.token = REDACTED.to_string();
    }
    shown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacted_project_hides_token() {
        let project = ProjectConfig::new("https://example.com/u/r.git", "u", "u@example.com")
            .with_token("abc123");
        let shown = redacted_project(&project);
        assert_eq!(shown.token, "***");
        assert_eq!(shown.repository_url, project.repository_url);

        let password = ProjectConfig::new("https://example.com/u/r.git", "u", "u@example.com");
        assert!(redacted_project(&password).token.is_empty());
    }

    #[test]
    fn test_operation_maps_to_request() {
        let request: OperationRequest = Operation::CreateRelease("v1".to_string()).into();
        assert_eq!(
            request,
            OperationRequest::CreateRelease {
                version: "v1".to_string()
            }
        );
    }
}
