#![allow(clippy::result_large_err)]

use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use gitship_types::{OperationKind, PipelineResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Cooperative cancellation shared between a running operation and its owner.
///
/// Checked before each step; a command already running is left to finish.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// An operation running on a background task.
pub struct OperationHandle {
    operation: OperationKind,
    cancel: CancelFlag,
    task: JoinHandle<PipelineResult>,
}

impl OperationHandle {
    pub(crate) fn new(
        operation: OperationKind,
        cancel: CancelFlag,
        task: JoinHandle<PipelineResult>,
    ) -> Self {
        Self {
            operation,
            cancel,
            task,
        }
    }

    pub fn operation(&self) -> OperationKind {
        self.operation
    }

    /// Request cancellation; takes effect before the next step starts.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A flag that can cancel this operation after the handle is consumed.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the terminal result.
    pub async fn wait(self) -> Result<PipelineResult, AppError> {
        let operation = self.operation;
        self.task.await.map_err(|err| {
            AppError::with_source(
                ErrorCategory::InternalError,
                format!("{} task did not complete", operation),
                Box::new(err),
            )
        })
    }
}
