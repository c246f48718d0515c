//! Step bookkeeping shared by the three operations.

use super::handle::CancelFlag;
use super::RunContext;
use crate::core::credentials::{authenticated_url, redact_url};
use crate::core::error::AppError;
use crate::core::git::{is_up_to_date, summarize};
use crate::core::progress::{ProgressEvent, ProgressReporter};
use crate::core::types::ErrorCategory;
use chrono::Utc;
use gitship_types::{CommandResult, OperationKind, PipelineResult, StepFailureKind, StepOutcome};

pub(crate) const STEP_CONFIGURE_REMOTE: &str = "configure remote";

/// Why a step did not succeed.
#[derive(Debug, Clone)]
pub(crate) struct StepFailure {
    pub kind: StepFailureKind,
    pub detail: String,
}

impl StepFailure {
    pub fn new(kind: StepFailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    /// Launch and local IO failures leave later steps without a foundation.
    fn is_fatal(&self) -> bool {
        matches!(self.kind, StepFailureKind::Launch | StepFailureKind::Io)
    }
}

impl From<std::io::Error> for StepFailure {
    fn from(err: std::io::Error) -> Self {
        StepFailure::new(StepFailureKind::Io, err.to_string())
    }
}

pub(crate) type StepResult = Result<String, StepFailure>;

/// The command ran; its exit status is still up to the caller.
pub(crate) fn ran(result: Result<CommandResult, AppError>) -> Result<CommandResult, StepFailure> {
    result.map_err(|err| {
        let kind = if err.is_category(ErrorCategory::TimeoutError) {
            StepFailureKind::Timeout
        } else {
            StepFailureKind::Launch
        };
        StepFailure::new(kind, err.message)
    })
}

/// The command ran and exited zero.
pub(crate) fn succeeded(
    result: Result<CommandResult, AppError>,
) -> Result<CommandResult, StepFailure> {
    let output = ran(result)?;
    if output.succeeded {
        Ok(output)
    } else {
        Err(StepFailure::new(StepFailureKind::Command, summarize(&output)))
    }
}

/// Push outcome where "already up to date" counts as success.
pub(crate) fn pushed(result: Result<CommandResult, AppError>, what: &str) -> StepResult {
    let output = ran(result)?;
    if output.succeeded {
        Ok(format!("pushed {}", what))
    } else if is_up_to_date(&output) {
        Ok(format!("{} already up to date", what))
    } else {
        Err(StepFailure::new(StepFailureKind::Command, summarize(&output)))
    }
}

/// Point the managed remote at the token URL. Only token mode needs it.
pub(crate) async fn repoint_remote(ctx: &RunContext<'_>) -> StepResult {
    let url = authenticated_url(ctx.project);
    succeeded(
        ctx.git
            .remote_manager()
            .set_url(&ctx.settings.remote, &url)
            .await,
    )?;
    Ok(format!("{} -> {}", ctx.settings.remote, redact_url(&url)))
}

/// What a run that reached its last step reports.
pub(crate) struct Completion {
    pub succeeded: bool,
    pub message: String,
    pub next_steps: Vec<String>,
    pub link: Option<String>,
}

impl Completion {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            message: message.into(),
            next_steps: Vec::new(),
            link: None,
        }
    }
}

/// How a run stopped before reaching its final step.
#[derive(Debug)]
pub(crate) enum Halt {
    Cancelled,
    Aborted(String),
}

/// Ordered step log of one operation run, mirrored to the progress reporter.
pub(crate) struct OperationRun<'a> {
    operation: OperationKind,
    reporter: &'a dyn ProgressReporter,
    cancel: &'a CancelFlag,
    steps: Vec<StepOutcome>,
}

impl<'a> OperationRun<'a> {
    pub fn start(
        operation: OperationKind,
        reporter: &'a dyn ProgressReporter,
        cancel: &'a CancelFlag,
    ) -> Self {
        reporter.report(ProgressEvent::Started {
            operation,
            timestamp: Utc::now(),
        });
        Self {
            operation,
            reporter,
            cancel,
            steps: Vec::new(),
        }
    }

    /// Called before every step.
    pub fn checkpoint(&self) -> Result<(), Halt> {
        if self.cancel.is_cancelled() {
            Err(Halt::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Record one step. Returns whether it succeeded, or `Halt::Aborted`
    /// when the failure leaves nothing sensible to continue with.
    pub fn record(&mut self, label: &str, result: StepResult) -> Result<bool, Halt> {
        let (outcome, halt) = match result {
            Ok(detail) => (StepOutcome::success(label, detail), None),
            Err(failure) => {
                let halt = failure
                    .is_fatal()
                    .then(|| Halt::Aborted(format!("{}: {}", label, failure.detail)));
                (StepOutcome::failure(label, failure.kind, failure.detail), halt)
            }
        };
        let succeeded = outcome.succeeded;
        self.reporter.report(ProgressEvent::Step {
            operation: self.operation,
            index: self.steps.len(),
            outcome: outcome.clone(),
        });
        self.steps.push(outcome);
        match halt {
            Some(halt) => Err(halt),
            None => Ok(succeeded),
        }
    }

    /// Terminal result after the last step ran.
    pub fn finish(
        self,
        succeeded: bool,
        message: impl Into<String>,
        next_steps: Vec<String>,
        link: Option<String>,
    ) -> PipelineResult {
        let operation = self.operation;
        self.conclude(PipelineResult {
            operation,
            steps: Vec::new(),
            final_succeeded: succeeded,
            final_message: message.into(),
            next_steps,
            link,
            cancelled: false,
        })
    }

    pub fn complete(self, outcome: Result<Completion, Halt>) -> PipelineResult {
        match outcome {
            Ok(done) => self.finish(done.succeeded, done.message, done.next_steps, done.link),
            Err(halt) => self.halted(halt),
        }
    }

    /// Terminal result for a run that stopped early.
    pub fn halted(self, halt: Halt) -> PipelineResult {
        let (message, cancelled) = match halt {
            Halt::Cancelled => (
                format!("{} cancelled after {} step(s)", self.operation, self.steps.len()),
                true,
            ),
            Halt::Aborted(reason) => (format!("{} aborted: {}", self.operation, reason), false),
        };
        let operation = self.operation;
        self.conclude(PipelineResult {
            operation,
            steps: Vec::new(),
            final_succeeded: false,
            final_message: message,
            next_steps: Vec::new(),
            link: None,
            cancelled,
        })
    }

    /// Terminal result for a run refused before any step.
    pub fn refused(self, message: impl Into<String>) -> PipelineResult {
        let result = PipelineResult::refused(self.operation, message);
        self.conclude(result)
    }

    fn conclude(self, mut result: PipelineResult) -> PipelineResult {
        result.steps = self.steps;
        self.reporter.report(ProgressEvent::Finished(result.clone()));
        result
    }
}
