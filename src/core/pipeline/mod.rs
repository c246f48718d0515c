//! The publish / trigger-build / create-release automation.
//!
//! Every operation runs its git commands strictly in sequence against one
//! working tree, records one [`StepOutcome`](gitship_types::StepOutcome) per
//! logical step and ends with exactly one [`PipelineResult`]. Steps are never
//! rolled back.

#![allow(clippy::result_large_err)]

pub mod guard;
pub mod handle;
mod publish;
mod release;
mod steps;
mod trigger;

pub use guard::{WorkspaceGuard, WorkspaceLocks};
pub use handle::{CancelFlag, OperationHandle};

use crate::core::command::{CommandRunner, TokioCommandRunner};
use crate::core::config::{ConfigValidator, PipelineSettings};
use crate::core::error::{
    AppError, CODE_COMMAND_FAILURE, CODE_EMPTY_VERSION_LABEL, CODE_INVALID_CONFIG_FIELD,
};
use crate::core::git::{summarize, GitManager};
use crate::core::progress::{ProgressReporter, TracingReporter};
use crate::core::types::ErrorCategory;
use gitship_types::{OperationKind, PipelineResult, ProjectConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use steps::OperationRun;

/// One operator action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationRequest {
    Publish,
    TriggerBuild,
    CreateRelease { version: String },
}

impl OperationRequest {
    pub fn kind(&self) -> OperationKind {
        match self {
            OperationRequest::Publish => OperationKind::Publish,
            OperationRequest::TriggerBuild => OperationKind::TriggerBuild,
            OperationRequest::CreateRelease { .. } => OperationKind::CreateRelease,
        }
    }

    /// Reject malformed input before anything runs.
    fn validated(self) -> Result<Self, AppError> {
        match self {
            OperationRequest::CreateRelease { version } => {
                let label = version.trim();
                if label.is_empty() {
                    return Err(AppError::validation(
                        CODE_EMPTY_VERSION_LABEL,
                        "version label must not be empty",
                    ));
                }
                Ok(OperationRequest::CreateRelease {
                    version: label.to_string(),
                })
            }
            other => Ok(other),
        }
    }
}

/// Borrowed state for one operation run.
pub(crate) struct RunContext<'a> {
    pub git: GitManager,
    pub settings: &'a PipelineSettings,
    pub project: &'a ProjectConfig,
}

/// Runs pipeline operations against one working tree.
#[derive(Clone)]
pub struct Pipeline {
    workspace: PathBuf,
    settings: PipelineSettings,
    timeout: Option<Duration>,
    runner: Arc<dyn CommandRunner>,
    reporter: Arc<dyn ProgressReporter>,
    locks: WorkspaceLocks,
}

impl Pipeline {
    pub fn new(
        workspace: impl Into<PathBuf>,
        settings: PipelineSettings,
    ) -> Result<Self, AppError> {
        ConfigValidator::validate_settings(&settings)?;
        let timeout = settings.command_timeout().map_err(|err| {
            AppError::validation(
                CODE_INVALID_CONFIG_FIELD,
                format!("invalid command_timeout '{}': {}", settings.command_timeout, err),
            )
        })?;
        Ok(Self {
            workspace: workspace.into(),
            settings,
            timeout,
            runner: Arc::new(TokioCommandRunner),
            reporter: Arc::new(TracingReporter),
            locks: WorkspaceLocks::shared(),
        })
    }

    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn with_locks(mut self, locks: WorkspaceLocks) -> Self {
        self.locks = locks;
        self
    }

    pub fn workspace_path(&self) -> &Path {
        &self.workspace
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn locks(&self) -> &WorkspaceLocks {
        &self.locks
    }

    pub async fn publish(
        &self,
        project: Option<&ProjectConfig>,
    ) -> Result<PipelineResult, AppError> {
        self.execute(OperationRequest::Publish, project).await
    }

    pub async fn trigger_build(
        &self,
        project: Option<&ProjectConfig>,
    ) -> Result<PipelineResult, AppError> {
        self.execute(OperationRequest::TriggerBuild, project).await
    }

    pub async fn create_release(
        &self,
        project: Option<&ProjectConfig>,
        version: &str,
    ) -> Result<PipelineResult, AppError> {
        self.execute(
            OperationRequest::CreateRelease {
                version: version.to_string(),
            },
            project,
        )
        .await
    }

    /// Run an operation to completion on the current task.
    ///
    /// `Err` is returned only for refusals that happen before the run
    /// starts: an invalid request or a busy workspace. A missing project is
    /// reported as a failed result with no steps.
    pub async fn execute(
        &self,
        request: OperationRequest,
        project: Option<&ProjectConfig>,
    ) -> Result<PipelineResult, AppError> {
        let request = request.validated()?;
        let _guard = self.locks.try_acquire(&self.workspace, request.kind())?;
        Ok(self.run(&request, project, &CancelFlag::new()).await)
    }

    /// Run an operation on a background task. Must be called inside a tokio
    /// runtime. The workspace lock is taken before this returns, so a busy
    /// workspace is reported here rather than by the task.
    pub fn spawn(
        &self,
        request: OperationRequest,
        project: Option<ProjectConfig>,
    ) -> Result<OperationHandle, AppError> {
        let request = request.validated()?;
        let operation = request.kind();
        let guard = self.locks.try_acquire(&self.workspace, operation)?;

        let cancel = CancelFlag::new();
        let flag = cancel.clone();
        let pipeline = self.clone();
        let task = tokio::spawn(async move {
            let _guard = guard;
            pipeline.run(&request, project.as_ref(), &flag).await
        });
        Ok(OperationHandle::new(operation, cancel, task))
    }

    /// Confirm git can be launched; returns its version line.
    pub async fn check_environment(&self) -> Result<String, AppError> {
        let output = self.git().version().await?;
        if !output.succeeded {
            return Err(AppError::new(
                ErrorCategory::CommandError,
                format!("git --version failed: {}", summarize(&output)),
            )
            .with_code(CODE_COMMAND_FAILURE));
        }
        Ok(output.stdout.trim().to_string())
    }

    fn git(&self) -> GitManager {
        GitManager::new(&self.workspace, Arc::clone(&self.runner)).with_timeout(self.timeout)
    }

    async fn run(
        &self,
        request: &OperationRequest,
        project: Option<&ProjectConfig>,
        cancel: &CancelFlag,
    ) -> PipelineResult {
        let operation = request.kind();
        let run = OperationRun::start(operation, self.reporter.as_ref(), cancel);

        let Some(project) = project else {
            let err = AppError::configuration_missing();
            tracing::warn!(%operation, code = %err.code, "operation refused: {}", err.message);
            return run.refused(err.message);
        };

        tracing::info!(
            %operation,
            workspace = %self.workspace.display(),
            branch = %self.settings.branch,
            remote = %self.settings.remote,
            "starting operation"
        );
        let ctx = RunContext {
            git: self.git(),
            settings: &self.settings,
            project,
        };
        match request {
            OperationRequest::Publish => publish::run(&ctx, run).await,
            OperationRequest::TriggerBuild => trigger::run(&ctx, run).await,
            OperationRequest::CreateRelease { version } => release::run(&ctx, run, version).await,
        }
    }
}
