// Event types and payload structures for user-visible workflow updates
// Delivered over an unbounded channel to whoever drives the session (CLI, UI)

use crate::models::{DocumentType, Feedback, UnitId, WorkflowPhase};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::mpsc;

// Event name constants
pub const EVENT_PHASE_CHANGED: &str = "workflow:phase_changed";
pub const EVENT_OUTLINE_APPLIED: &str = "workflow:outline_applied";
pub const EVENT_OUTLINE_EMPTY: &str = "workflow:outline_empty";
pub const EVENT_GENERATION_COMPLETED: &str = "workflow:generation_completed";
pub const EVENT_UNIT_REFINED: &str = "unit:refined";
pub const EVENT_FEEDBACK_RECORDED: &str = "unit:feedback_recorded";
pub const EVENT_COMMENT_ADDED: &str = "unit:comment_added";
pub const EVENT_OPERATION_FAILED: &str = "operation:failed";
pub const EVENT_EXPORT_WRITTEN: &str = "export:written";

/// Payload for phase change events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseChangedPayload {
    pub session_id: String,
    pub old_phase: WorkflowPhase,
    pub new_phase: WorkflowPhase,
}

/// Payload for outline suggestion results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineAppliedPayload {
    pub session_id: String,
    pub document_type: DocumentType,
    pub unit_count: usize,
}

/// Payload for a successful structured generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationCompletedPayload {
    pub session_id: String,
    pub project_id: String,
    pub unit_count: usize,
}

/// Payload for unit refinement events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitRefinedPayload {
    pub project_id: String,
    pub unit_id: UnitId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRecordedPayload {
    pub project_id: String,
    pub unit_id: UnitId,
    pub feedback: Feedback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentAddedPayload {
    pub project_id: String,
    pub unit_id: UnitId,
    pub comment_count: usize,
}

/// Payload for any recoverable failure surfaced to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationFailedPayload {
    /// Session or project the failure belongs to
    pub scope_id: String,
    pub operation: String,
    pub unit_id: Option<UnitId>,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportWrittenPayload {
    pub project_id: String,
    pub path: PathBuf,
    pub bytes: usize,
}

/// All events emitted by the workflow and the refinement engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "camelCase")]
pub enum WorkflowEvent {
    PhaseChanged(PhaseChangedPayload),
    OutlineApplied(OutlineAppliedPayload),
    OutlineEmpty { session_id: String },
    GenerationCompleted(GenerationCompletedPayload),
    UnitRefined(UnitRefinedPayload),
    FeedbackRecorded(FeedbackRecordedPayload),
    CommentAdded(CommentAddedPayload),
    OperationFailed(OperationFailedPayload),
    ExportWritten(ExportWrittenPayload),
}

impl WorkflowEvent {
    /// Event name constant for this event
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowEvent::PhaseChanged(_) => EVENT_PHASE_CHANGED,
            WorkflowEvent::OutlineApplied(_) => EVENT_OUTLINE_APPLIED,
            WorkflowEvent::OutlineEmpty { .. } => EVENT_OUTLINE_EMPTY,
            WorkflowEvent::GenerationCompleted(_) => EVENT_GENERATION_COMPLETED,
            WorkflowEvent::UnitRefined(_) => EVENT_UNIT_REFINED,
            WorkflowEvent::FeedbackRecorded(_) => EVENT_FEEDBACK_RECORDED,
            WorkflowEvent::CommentAdded(_) => EVENT_COMMENT_ADDED,
            WorkflowEvent::OperationFailed(_) => EVENT_OPERATION_FAILED,
            WorkflowEvent::ExportWritten(_) => EVENT_EXPORT_WRITTEN,
        }
    }
}

/// Sending half for workflow events. A sink without a channel, or whose
/// receiver has gone away, drops events silently.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    tx: Option<mpsc::UnboundedSender<WorkflowEvent>>,
}

impl EventSink {
    pub fn new(tx: mpsc::UnboundedSender<WorkflowEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// Sink that discards everything
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Create a connected sink and its receiver
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<WorkflowEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    pub fn emit(&self, event: WorkflowEvent) {
        if let Some(tx) = &self.tx {
            log::trace!("Emitting {}", event.name());
            let _ = tx.send(event); // Best effort
        }
    }

    /// Emit an operation failure
    pub fn emit_failure(
        &self,
        scope_id: &str,
        operation: &str,
        unit_id: Option<&UnitId>,
        error: impl std::fmt::Display,
    ) {
        self.emit(WorkflowEvent::OperationFailed(OperationFailedPayload {
            scope_id: scope_id.to_string(),
            operation: operation.to_string(),
            unit_id: unit_id.cloned(),
            error: error.to_string(),
        }));
    }
}
