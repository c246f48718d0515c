//! Plain-text rendering of progress events and results.

use crate::core::progress::ProgressEvent;
use gitship_types::{PipelineResult, StepOutcome};
use std::fmt::Write;

/// One line per event; `Finished` renders the full summary.
pub fn event(event: &ProgressEvent) -> String {
    match event {
        ProgressEvent::Started { operation, .. } => format!("==> {}", operation),
        ProgressEvent::Step { index, outcome, .. } => step(*index, outcome),
        ProgressEvent::Finished(result) => summary(result),
    }
}

pub fn step(index: usize, outcome: &StepOutcome) -> String {
    let status = if outcome.succeeded { "ok" } else { "FAILED" };
    let mut line = format!("[{}] {:<6} {}", index + 1, status, outcome.label);
    if !outcome.detail.is_empty() {
        let _ = write!(line, ": {}", outcome.detail);
    }
    if let Some(kind) = outcome.failure {
        let _ = write!(line, " ({})", kind);
    }
    line
}

pub fn summary(result: &PipelineResult) -> String {
    let verdict = if result.cancelled {
        "cancelled"
    } else if result.final_succeeded {
        "succeeded"
    } else {
        "failed"
    };
    let mut text = format!("{} {}: {}", result.operation, verdict, result.final_message);
    if !result.next_steps.is_empty() {
        text.push_str("\nNext steps:");
        for (position, hint) in result.next_steps.iter().enumerate() {
            let _ = write!(text, "\n  {}. {}", position + 1, hint);
        }
    }
    if let Some(link) = &result.link {
        let _ = write!(text, "\nOpen: {}", link);
    }
    text
}
