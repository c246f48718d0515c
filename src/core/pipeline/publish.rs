use super::steps::{
    pushed, ran, succeeded, Completion, Halt, OperationRun, StepFailure, StepResult,
    STEP_CONFIGURE_REMOTE,
};
use super::RunContext;
use crate::core::config::STATE_DIR;
use crate::core::credentials::{authenticated_url, redact_url};
use crate::core::git::{is_nothing_to_commit, summarize, GitManager};
use gitship_types::{PipelineResult, StepFailureKind};
use std::fs::OpenOptions;
use std::io::Write;

pub(crate) const STEP_ENSURE_REPOSITORY: &str = "ensure repository";
pub(crate) const STEP_CONFIGURE_IDENTITY: &str = "configure identity";
pub(crate) const STEP_EXCLUDE_STATE: &str = "exclude local state";
pub(crate) const STEP_STAGE: &str = "stage changes";
pub(crate) const STEP_COMMIT: &str = "commit";
pub(crate) const STEP_EMPTY_COMMIT: &str = "empty commit";
pub(crate) const STEP_RENAME_BRANCH: &str = "rename branch";
pub(crate) const STEP_PUSH: &str = "push";

pub(crate) async fn run(ctx: &RunContext<'_>, mut run: OperationRun<'_>) -> PipelineResult {
    let outcome = steps(ctx, &mut run).await;
    run.complete(outcome)
}

async fn steps(ctx: &RunContext<'_>, run: &mut OperationRun<'_>) -> Result<Completion, Halt> {
    let git = &ctx.git;
    let settings = ctx.settings;

    // Identity writes are repository-local, so the repository comes first.
    run.checkpoint()?;
    run.record(STEP_ENSURE_REPOSITORY, ensure_repository(git).await)?;

    run.checkpoint()?;
    run.record(STEP_CONFIGURE_IDENTITY, configure_identity(ctx).await)?;

    run.checkpoint()?;
    run.record(STEP_EXCLUDE_STATE, exclude_local_state(git).await)?;

    run.checkpoint()?;
    run.record(STEP_CONFIGURE_REMOTE, reset_remote(ctx).await)?;

    run.checkpoint()?;
    let staged = succeeded(git.commit_manager().stage_all().await)
        .map(|_| "staged all working-tree changes".to_string());
    run.record(STEP_STAGE, staged)?;

    run.checkpoint()?;
    let commit = ran(git
        .commit_manager()
        .commit(&settings.publish_commit_message)
        .await);
    let nothing_to_commit =
        matches!(&commit, Ok(output) if !output.succeeded && is_nothing_to_commit(output));
    let committed = match commit {
        Ok(output) if output.succeeded => {
            Ok(format!("committed \"{}\"", settings.publish_commit_message))
        }
        Ok(_) if nothing_to_commit => Err(StepFailure::new(
            StepFailureKind::Command,
            "nothing to commit",
        )),
        Ok(output) => Err(StepFailure::new(
            StepFailureKind::Command,
            summarize(&output),
        )),
        Err(failure) => Err(failure),
    };
    run.record(STEP_COMMIT, committed)?;

    if nothing_to_commit {
        run.checkpoint()?;
        let empty = succeeded(
            git.commit_manager()
                .commit_allow_empty(&settings.empty_commit_message)
                .await,
        )
        .map(|_| format!("created empty commit \"{}\"", settings.empty_commit_message));
        run.record(STEP_EMPTY_COMMIT, empty)?;
    }

    run.checkpoint()?;
    let renamed = succeeded(git.branch_manager().rename_current(&settings.branch).await)
        .map(|_| format!("current branch renamed to {}", settings.branch));
    run.record(STEP_RENAME_BRANCH, renamed)?;

    run.checkpoint()?;
    let push = pushed(
        git.branch_manager()
            .push(&settings.remote, &settings.branch, true)
            .await,
        &settings.branch,
    );
    let push_error = push.as_ref().err().map(|failure| failure.detail.clone());
    run.record(STEP_PUSH, push)?;

    Ok(match push_error {
        None => Completion {
            succeeded: true,
            message: format!(
                "published {} to {}",
                settings.branch,
                redact_url(&ctx.project.repository_url)
            ),
            next_steps: vec![
                "Enable the CI workflows of the remote repository".to_string(),
                "Trigger a build to run them".to_string(),
            ],
            link: None,
        },
        Some(detail) => {
            Completion::failed(format!("push to {} failed: {}", settings.remote, detail))
        }
    })
}

async fn ensure_repository(git: &GitManager) -> StepResult {
    if git.is_git_repo() {
        return Ok("repository already initialized".to_string());
    }
    succeeded(git.init().await)?;
    Ok("initialized new repository".to_string())
}

async fn configure_identity(ctx: &RunContext<'_>) -> StepResult {
    let project = ctx.project;
    for (key, value) in [
        ("user.name", project.username.as_str()),
        ("user.email", project.email.as_str()),
    ] {
        succeeded(ctx.git.set_config(key, value).await)?;
    }
    Ok(format!("{} <{}>", project.username, project.email))
}

/// Keep the stored token and logs out of every commit.
async fn exclude_local_state(git: &GitManager) -> StepResult {
    let entry = format!("/{}/", STATE_DIR);
    let location = succeeded(git.git(&["rev-parse", "--git-path", "info/exclude"]).await)?;
    let exclude = git.workspace_path().join(location.stdout.trim());

    let current = match std::fs::read_to_string(&exclude) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(err) => return Err(err.into()),
    };
    if current.lines().any(|line| line.trim() == entry) {
        return Ok(format!("{} already excluded", entry));
    }

    if let Some(parent) = exclude.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(&exclude)?;
    if !current.is_empty() && !current.ends_with('\n') {
        writeln!(file)?;
    }
    writeln!(file, "{}", entry)?;
    Ok(format!("excluded {}", entry))
}

/// Remove then re-add the managed remote so it always matches the config.
async fn reset_remote(ctx: &RunContext<'_>) -> StepResult {
    let remotes = ctx.git.remote_manager();
    let remote = &ctx.settings.remote;

    // An absent remote makes `remove` fail; that is expected.
    ran(remotes.remove(remote).await)?;

    let url = authenticated_url(ctx.project);
    succeeded(remotes.add(remote, &url).await)?;
    Ok(format!("{} -> {}", remote, redact_url(&url)))
}
