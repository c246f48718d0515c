//! Ordered status events emitted while a pipeline operation runs.

use chrono::{DateTime, Utc};
use gitship_types::{OperationKind, PipelineResult, StepOutcome};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;

/// One progress notification.
///
/// Per run the order is always `Started`, zero or more `Step`, then exactly
/// one `Finished`, including on failure paths.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressEvent {
    Started {
        operation: OperationKind,
        timestamp: DateTime<Utc>,
    },
    Step {
        operation: OperationKind,
        /// Zero-based position of the step within the run.
        index: usize,
        outcome: StepOutcome,
    },
    Finished(PipelineResult),
}

/// Receiver of progress events. `report` must not block the pipeline.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// Forwards events to an unbounded channel; a dropped receiver is ignored.
#[derive(Clone)]
pub struct ChannelReporter {
    event_tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ChannelReporter {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        (Self { event_tx }, event_rx)
    }
}

impl ProgressReporter for ChannelReporter {
    fn report(&self, event: ProgressEvent) {
        if self.event_tx.send(event).is_err() {
            tracing::trace!("progress receiver dropped; event discarded");
        }
    }
}

/// Writes every event to the tracing subscriber.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingReporter;

impl ProgressReporter for TracingReporter {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Started { operation, .. } => {
                tracing::info!(%operation, "operation started");
            }
            ProgressEvent::Step {
                operation,
                index,
                outcome,
            } if outcome.succeeded => {
                tracing::info!(
                    %operation,
                    index,
                    step = %outcome.label,
                    detail = %outcome.detail,
                    "step succeeded"
                );
            }
            ProgressEvent::Step {
                operation,
                index,
                outcome,
            } => {
                tracing::warn!(
                    %operation,
                    index,
                    step = %outcome.label,
                    detail = %outcome.detail,
                    failure = ?outcome.failure,
                    "step failed"
                );
            }
            ProgressEvent::Finished(result) => {
                tracing::info!(
                    operation = %result.operation,
                    succeeded = result.final_succeeded,
                    cancelled = result.cancelled,
                    message = %result.final_message,
                    "operation finished"
                );
            }
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn report(&self, _event: ProgressEvent) {}
}

/// Hands every event to each inner reporter in order.
#[derive(Clone, Default)]
pub struct MultiReporter {
    reporters: Vec<Arc<dyn ProgressReporter>>,
}

impl MultiReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporters.push(reporter);
        self
    }
}

impl ProgressReporter for MultiReporter {
    fn report(&self, event: ProgressEvent) {
        if let Some((last, rest)) = self.reporters.split_last() {
            for reporter in rest {
                reporter.report(event.clone());
            }
            last.report(event);
        }
    }
}
