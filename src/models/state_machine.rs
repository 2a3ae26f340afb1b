// Creation workflow phase state machine with validation

use super::WorkflowPhase;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateTransitionError {
    #[error("Invalid phase transition from {from:?} to {to:?} ({trigger:?})")]
    InvalidTransition {
        from: WorkflowPhase,
        to: WorkflowPhase,
        trigger: PhaseTrigger,
    },
}

/// What caused a phase change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseTrigger {
    /// The user confirmed the current phase
    Proceed,
    /// The user asked to go back
    Back,
    /// The structured generation call failed
    GenerationFailed,
}

/// Validates if the workflow can move from one phase to another
pub fn can_transition(from: WorkflowPhase, to: WorkflowPhase, trigger: PhaseTrigger) -> bool {
    match (from, to, trigger) {
        // Forward phases are strict
        (WorkflowPhase::Topic, WorkflowPhase::Structure, PhaseTrigger::Proceed) => true,
        (WorkflowPhase::Structure, WorkflowPhase::Generating, PhaseTrigger::Proceed) => true,

        // Explicit back only from the structure editor
        (WorkflowPhase::Structure, WorkflowPhase::Topic, PhaseTrigger::Back) => true,

        // Failure recovery keeps the structure the user built
        (WorkflowPhase::Generating, WorkflowPhase::Structure, PhaseTrigger::GenerationFailed) => {
            true
        }

        _ => false,
    }
}

/// Validates and performs a phase transition
pub fn transition_state(
    current: WorkflowPhase,
    target: WorkflowPhase,
    trigger: PhaseTrigger,
) -> Result<WorkflowPhase, StateTransitionError> {
    if !can_transition(current, target, trigger) {
        return Err(StateTransitionError::InvalidTransition {
            from: current,
            to: target,
            trigger,
        });
    }

    Ok(target)
}

/// Generating is terminal once the request succeeds
pub fn is_terminal_state(phase: WorkflowPhase) -> bool {
    matches!(phase, WorkflowPhase::Generating)
}

/// Check if the structure editor accepts mutations in this phase
pub fn is_editable_state(phase: WorkflowPhase) -> bool {
    matches!(phase, WorkflowPhase::Topic | WorkflowPhase::Structure)
}
