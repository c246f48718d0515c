use serde::{Deserialize, Serialize};
use std::fmt;

/// Captured result of one external command.
///
/// A non-zero exit is data, not an error: `succeeded` is false and `stderr`
/// holds what the command said.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    pub succeeded: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    /// True when undecodable bytes were replaced while decoding output.
    #[serde(default)]
    pub decoding_lossy: bool,
}

impl CommandResult {
    /// stdout followed by stderr, for classifiers that do not care which
    /// stream a message landed on.
    pub fn combined_output(&self) -> String {
        match (self.stdout.trim().is_empty(), self.stderr.trim().is_empty()) {
            (true, true) => String::new(),
            (false, true) => self.stdout.trim().to_string(),
            (true, false) => self.stderr.trim().to_string(),
            (false, false) => format!("{}\n{}", self.stdout.trim(), self.stderr.trim()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepFailureKind {
    /// The command could not be started at all.
    Launch,
    /// The command ran and exited non-zero.
    Command,
    /// The command exceeded its time budget.
    Timeout,
    /// A local file operation failed.
    Io,
}

impl fmt::Display for StepFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StepFailureKind::Launch => "launch failure",
            StepFailureKind::Command => "command failure",
            StepFailureKind::Timeout => "timeout",
            StepFailureKind::Io => "io failure",
        };
        f.write_str(label)
    }
}

/// One logical step inside a pipeline operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub label: String,
    pub succeeded: bool,
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<StepFailureKind>,
}

impl StepOutcome {
    pub fn success(label: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            succeeded: true,
            detail: detail.into(),
            failure: None,
        }
    }

    pub fn failure(
        label: impl Into<String>,
        kind: StepFailureKind,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            succeeded: false,
            detail: detail.into(),
            failure: Some(kind),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Publish,
    TriggerBuild,
    CreateRelease,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Publish => write!(f, "publish"),
            OperationKind::TriggerBuild => write!(f, "trigger-build"),
            OperationKind::CreateRelease => write!(f, "create-release"),
        }
    }
}

/// Terminal artifact of one operation run. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub operation: OperationKind,
    pub steps: Vec<StepOutcome>,
    pub final_succeeded: bool,
    pub final_message: String,
    /// Follow-up hints for the operator; nothing here is acted on.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub next_steps: Vec<String>,
    /// Page the presentation layer may open after a successful run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default)]
    pub cancelled: bool,
}

impl PipelineResult {
    /// Result for a run that was refused before any step executed.
    pub fn refused(operation: OperationKind, message: impl Into<String>) -> Self {
        Self {
            operation,
            steps: Vec::new(),
            final_succeeded: false,
            final_message: message.into(),
            next_steps: Vec::new(),
            link: None,
            cancelled: false,
        }
    }

    pub fn failed_steps(&self) -> impl Iterator<Item = &StepOutcome> {
        self.steps.iter().filter(|step| !step.succeeded)
    }

    pub fn step(&self, label: &str) -> Option<&StepOutcome> {
        self.steps.iter().find(|step| step.label == label)
    }
}
