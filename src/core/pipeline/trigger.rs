use super::steps::{
    pushed, repoint_remote, succeeded, Completion, Halt, OperationRun, StepResult,
    STEP_CONFIGURE_REMOTE,
};
use super::RunContext;
use crate::core::config::PipelineSettings;
use crate::core::urls::ci_status_url;
use chrono::Local;
use gitship_types::PipelineResult;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

pub(crate) const STEP_WRITE_MARKER: &str = "write marker";
pub(crate) const STEP_STAGE_MARKER: &str = "stage marker";
pub(crate) const STEP_COMMIT_MARKER: &str = "commit marker";
pub(crate) const STEP_PUSH: &str = "push";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The file receiving this run's marker and the text appended to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Marker {
    pub file: String,
    pub text: String,
}

impl Marker {
    /// The designated marker file when present, else the dedicated fallback.
    pub fn select(workspace: &Path, settings: &PipelineSettings, timestamp: &str) -> Self {
        if workspace.join(&settings.marker_file).is_file() {
            Marker {
                file: settings.marker_file.clone(),
                text: format!("\n<!-- Build triggered: {} -->\n", timestamp),
            }
        } else {
            Marker {
                file: settings.fallback_marker_file.clone(),
                text: format!("Build triggered at {}\n", timestamp),
            }
        }
    }

    /// Append only; the file never shrinks.
    fn append(&self, workspace: &Path) -> StepResult {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(workspace.join(&self.file))?;
        file.write_all(self.text.as_bytes())?;
        Ok(format!("appended build marker to {}", self.file))
    }
}

pub(crate) async fn run(ctx: &RunContext<'_>, mut run: OperationRun<'_>) -> PipelineResult {
    let outcome = steps(ctx, &mut run).await;
    run.complete(outcome)
}

async fn steps(ctx: &RunContext<'_>, run: &mut OperationRun<'_>) -> Result<Completion, Halt> {
    let git = &ctx.git;
    let settings = ctx.settings;
    let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
    let marker = Marker::select(git.workspace_path(), settings, &timestamp);

    run.checkpoint()?;
    run.record(STEP_WRITE_MARKER, marker.append(git.workspace_path()))?;

    run.checkpoint()?;
    let staged = succeeded(git.commit_manager().stage_path(&marker.file).await)
        .map(|_| format!("staged {}", marker.file));
    run.record(STEP_STAGE_MARKER, staged)?;

    run.checkpoint()?;
    let message = format!("chore: trigger build [{}]", timestamp);
    let committed = succeeded(
        git.commit_manager()
            .commit_paths(&message, &[marker.file.as_str()])
            .await,
    )
    .map(|_| format!("committed \"{}\"", message));
    run.record(STEP_COMMIT_MARKER, committed)?;

    if ctx.project.uses_token() {
        run.checkpoint()?;
        run.record(STEP_CONFIGURE_REMOTE, repoint_remote(ctx).await)?;
    }

    run.checkpoint()?;
    let push = pushed(
        git.branch_manager()
            .push(&settings.remote, &settings.branch, false)
            .await,
        &settings.branch,
    );
    let push_error = push.as_ref().err().map(|failure| failure.detail.clone());
    run.record(STEP_PUSH, push)?;

    Ok(match push_error {
        None => Completion {
            succeeded: true,
            message: format!("build triggered on {}", settings.branch),
            next_steps: Vec::new(),
            link: ci_status_url(&ctx.project.repository_url),
        },
        Some(detail) => Completion::failed(format!("trigger push failed: {}", detail)),
    })
}
