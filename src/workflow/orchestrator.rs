// Phase-driving orchestrator for a creation session

use super::{CreationState, WorkflowError};
use crate::events::{
    EventSink, GenerationCompletedPayload, OutlineAppliedPayload, PhaseChangedPayload,
    WorkflowEvent,
};
use crate::models::state_machine::{is_terminal_state, PhaseTrigger};
use crate::models::{DocumentType, WorkflowPhase};
use crate::parsers::parse_outline;
use crate::refinement::RefinementEngine;
use crate::service::DocumentService;
use crate::structure::StructureEditor;
use std::sync::Arc;

/// One creation session from prompt to generated project
pub struct GenerationWorkflow {
    state: CreationState,
    service: Arc<dyn DocumentService>,
    events: EventSink,
}

impl GenerationWorkflow {
    pub fn new(service: Arc<dyn DocumentService>, events: EventSink) -> Self {
        Self {
            state: CreationState::new(),
            service,
            events,
        }
    }

    pub fn state(&self) -> &CreationState {
        &self.state
    }

    pub fn phase(&self) -> WorkflowPhase {
        self.state.phase
    }

    /// Whether generation has been handed off and the session is over
    pub fn is_finished(&self) -> bool {
        is_terminal_state(self.state.phase)
    }

    pub fn session_id(&self) -> &str {
        &self.state.session_id
    }

    pub fn structure(&self) -> &StructureEditor {
        self.state.structure()
    }

    /// Edit the active structure (topic and structure phases only)
    pub fn structure_mut(&mut self) -> Result<&mut StructureEditor, WorkflowError> {
        self.state.structure_mut()
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) -> Result<(), WorkflowError> {
        self.state.set_prompt(prompt)
    }

    pub fn set_document_type(&mut self, document_type: DocumentType) -> Result<(), WorkflowError> {
        self.state.set_document_type(document_type)
    }

    /// Topic -> Structure. Requires a non-blank prompt.
    pub fn proceed_to_structure(&mut self) -> Result<(), WorkflowError> {
        if self.state.phase == WorkflowPhase::Topic && self.state.prompt.trim().is_empty() {
            return Err(WorkflowError::EmptyPrompt);
        }
        self.move_to(WorkflowPhase::Structure, PhaseTrigger::Proceed)
    }

    /// Structure -> Topic on explicit user request
    pub fn back_to_topic(&mut self) -> Result<(), WorkflowError> {
        self.move_to(WorkflowPhase::Topic, PhaseTrigger::Back)
    }

    /// Ask the service for an outline and apply it to the active structure.
    ///
    /// Returns how many units were applied; zero means the outline had no
    /// recognizable lines and the structure was left as it was.
    pub async fn suggest_outline(&mut self) -> Result<usize, WorkflowError> {
        if self.state.phase != WorkflowPhase::Structure {
            return Err(WorkflowError::WrongPhase {
                operation: "suggest an outline",
                phase: self.state.phase,
            });
        }

        let prompt = self.state.prompt.trim().to_string();
        let document_type = self.state.document_type;
        log::info!(
            "[workflow] Requesting {} outline for session {}",
            document_type,
            self.state.session_id
        );

        let outline = match self.service.generate_outline(&prompt, document_type).await {
            Ok(outline) => outline,
            Err(e) => {
                log::warn!("[workflow] Outline generation failed: {}", e);
                self.state.set_error(format!("Failed to generate outline: {}", e));
                self.events
                    .emit_failure(&self.state.session_id, "generate_outline", None, &e);
                return Err(WorkflowError::OutlineFailed(e));
            }
        };

        let kind = document_type.unit_kind();
        let entries = parse_outline(&outline, kind);
        self.state.outline_text = Some(outline);
        self.state.clear_error();

        let applied = self.state.structure_mut()?.apply_outline(entries);
        if !applied {
            log::info!("[outline] No {} found in outline, keeping structure", kind.plural());
            self.events.emit(WorkflowEvent::OutlineEmpty {
                session_id: self.state.session_id.clone(),
            });
            return Ok(0);
        }

        let count = self.state.structure().len();
        log::info!("[outline] Applied {} {}", count, kind.plural());
        self.events
            .emit(WorkflowEvent::OutlineApplied(OutlineAppliedPayload {
                session_id: self.state.session_id.clone(),
                document_type,
                unit_count: count,
            }));
        Ok(count)
    }

    /// Structure -> Generating: send the confirmed structure off for
    /// generation.
    ///
    /// On success the session ends in Generating and the returned engine owns
    /// the working set. On failure the session is back in Structure with the
    /// structure untouched and the error recorded.
    pub async fn generate(&mut self) -> Result<RefinementEngine, WorkflowError> {
        if self.state.phase != WorkflowPhase::Structure {
            return Err(WorkflowError::WrongPhase {
                operation: "generate",
                phase: self.state.phase,
            });
        }
        if self.state.prompt.trim().is_empty() {
            return Err(WorkflowError::EmptyPrompt);
        }
        self.state.structure().validate()?;

        let request = self.state.generation_request();
        self.move_to(WorkflowPhase::Generating, PhaseTrigger::Proceed)?;
        self.state.clear_error();
        log::info!(
            "[workflow] Generating {} with {} {}",
            request.document_type,
            request.titles.len(),
            request.document_type.unit_kind().plural()
        );

        match self.service.generate_structured_document(&request).await {
            Ok(document) => {
                let mut units = document.units;
                units.sort_by_key(|u| u.order);

                log::info!(
                    "[workflow] Generated project {} ({} units)",
                    document.project_id,
                    units.len()
                );
                self.events
                    .emit(WorkflowEvent::GenerationCompleted(GenerationCompletedPayload {
                        session_id: self.state.session_id.clone(),
                        project_id: document.project_id.clone(),
                        unit_count: units.len(),
                    }));

                Ok(RefinementEngine::new(
                    Arc::clone(&self.service),
                    document.project_id,
                    request.prompt,
                    request.document_type,
                    units,
                    self.events.clone(),
                ))
            }
            Err(e) => {
                log::warn!("[workflow] Generation failed: {}", e);
                self.move_to(WorkflowPhase::Structure, PhaseTrigger::GenerationFailed)?;
                self.state.set_error(format!("Failed to generate document: {}", e));
                self.events
                    .emit_failure(&self.state.session_id, "generate", None, &e);
                Err(WorkflowError::GenerationFailed(e))
            }
        }
    }

    fn move_to(&mut self, target: WorkflowPhase, trigger: PhaseTrigger) -> Result<(), WorkflowError> {
        let old = self.state.transition(target, trigger)?;
        log::debug!(
            "[workflow] {} -> {} ({:?})",
            old.display_name(),
            target.display_name(),
            trigger
        );
        self.events
            .emit(WorkflowEvent::PhaseChanged(PhaseChangedPayload {
                session_id: self.state.session_id.clone(),
                old_phase: old,
                new_phase: target,
            }));
        Ok(())
    }
}
