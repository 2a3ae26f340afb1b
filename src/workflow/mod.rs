//! Content Generation Workflow
//!
//! Drives one creation session through three phases:
//!
//! 1. **Topic** - prompt and document type entry
//! 2. **Structure** - section / slide structure editing, optionally seeded
//!    from an AI outline suggestion
//! 3. **Generating** - the confirmed structure is sent off for generation
//!
//! A successful generation hands the result to a
//! [`RefinementEngine`](crate::refinement::RefinementEngine) and ends the
//! session. A failed one drops back to Structure with every edit kept.

mod orchestrator;
pub mod state;

#[cfg(test)]
mod tests;

pub use orchestrator::GenerationWorkflow;
pub use state::CreationState;

use crate::models::state_machine::StateTransitionError;
use crate::models::WorkflowPhase;
use crate::service::ServiceError;
use crate::structure::StructureError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("Please describe what to create")]
    EmptyPrompt,

    #[error(transparent)]
    Transition(#[from] StateTransitionError),

    #[error(transparent)]
    Structure(#[from] StructureError),

    #[error("Document type can no longer change ({} phase)", .0.display_name())]
    DocumentTypeFrozen(WorkflowPhase),

    #[error("The structure can no longer be edited ({} phase)", .0.display_name())]
    NotEditable(WorkflowPhase),

    #[error("Cannot {operation} in the {} phase", .phase.display_name())]
    WrongPhase {
        operation: &'static str,
        phase: WorkflowPhase,
    },

    #[error("Failed to generate outline: {0}")]
    OutlineFailed(#[source] ServiceError),

    #[error("Failed to generate document: {0}")]
    GenerationFailed(#[source] ServiceError),
}
