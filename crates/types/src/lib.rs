//! Data model shared by the gitship library and any presentation shell.
//!
//! Everything here is plain data: the persisted project record, the result of
//! one external command, and the step-by-step outcome of a pipeline run.

mod outcome;
mod project;

pub use outcome::{CommandResult, OperationKind, PipelineResult, StepFailureKind, StepOutcome};
pub use project::{AuthMode, ParseAuthModeError, ProjectConfig};
