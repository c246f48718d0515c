use super::steps::{
    ran, repoint_remote, succeeded, Completion, Halt, OperationRun, StepFailure,
    STEP_CONFIGURE_REMOTE,
};
use super::RunContext;
use crate::core::git::summarize;
use crate::core::urls::releases_url;
use gitship_types::{PipelineResult, StepFailureKind};

pub(crate) const STEP_CREATE_TAG: &str = "create tag";
pub(crate) const STEP_PUSH_TAG: &str = "push tag";

pub(crate) async fn run(
    ctx: &RunContext<'_>,
    mut run: OperationRun<'_>,
    version: &str,
) -> PipelineResult {
    let outcome = steps(ctx, &mut run, version).await;
    run.complete(outcome)
}

async fn steps(
    ctx: &RunContext<'_>,
    run: &mut OperationRun<'_>,
    version: &str,
) -> Result<Completion, Halt> {
    let tags = ctx.git.tag_manager();

    if ctx.project.uses_token() {
        run.checkpoint()?;
        run.record(STEP_CONFIGURE_REMOTE, repoint_remote(ctx).await)?;
    }

    // A failed tag creation is recorded; the push is still attempted.
    run.checkpoint()?;
    let message = format!("Release {}", version);
    let created = succeeded(tags.create_annotated(version, &message).await)
        .map(|_| format!("created annotated tag {}", version));
    run.record(STEP_CREATE_TAG, created)?;

    run.checkpoint()?;
    let push = ran(tags.push(&ctx.settings.remote, version).await).and_then(|output| {
        if output.succeeded {
            Ok(format!("pushed tag {} to {}", version, ctx.settings.remote))
        } else {
            Err(StepFailure::new(
                StepFailureKind::Command,
                summarize(&output),
            ))
        }
    });
    let push_error = push.as_ref().err().map(|failure| failure.detail.clone());
    run.record(STEP_PUSH_TAG, push)?;

    Ok(match push_error {
        None => Completion {
            succeeded: true,
            message: format!("released {}", version),
            next_steps: Vec::new(),
            link: releases_url(&ctx.project.repository_url),
        },
        Some(detail) => Completion::failed(format!("tag push failed: {}", detail)),
    })
}
