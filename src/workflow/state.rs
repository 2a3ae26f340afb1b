// Creation session state: phase, prompt, document type and both structures

use super::WorkflowError;
use crate::models::state_machine::{is_editable_state, transition_state, PhaseTrigger};
use crate::models::{DocumentType, GenerationRequest, UnitKind, WorkflowPhase};
use crate::structure::StructureEditor;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything a creation session holds before generation.
///
/// A section structure and a slide structure are kept side by side; the
/// document type picks the active one, so switching back and forth in the
/// topic phase never loses edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreationState {
    pub session_id: String,
    pub phase: WorkflowPhase,
    pub prompt: String,
    pub document_type: DocumentType,
    sections: StructureEditor,
    slides: StructureEditor,
    /// Raw text of the last outline suggestion
    pub outline_text: Option<String>,
    /// Last user-visible failure
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for CreationState {
    fn default() -> Self {
        Self::new()
    }
}

impl CreationState {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            phase: WorkflowPhase::Topic,
            prompt: String::new(),
            document_type: DocumentType::default(),
            sections: StructureEditor::new(UnitKind::Sections),
            slides: StructureEditor::new(UnitKind::Slides),
            outline_text: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Structure for the current document type
    pub fn structure(&self) -> &StructureEditor {
        match self.document_type.unit_kind() {
            UnitKind::Sections => &self.sections,
            UnitKind::Slides => &self.slides,
        }
    }

    /// Mutable structure for the current document type. Fails once
    /// generation has started.
    pub fn structure_mut(&mut self) -> Result<&mut StructureEditor, WorkflowError> {
        if !is_editable_state(self.phase) {
            return Err(WorkflowError::NotEditable(self.phase));
        }
        self.updated_at = Utc::now();
        Ok(match self.document_type.unit_kind() {
            UnitKind::Sections => &mut self.sections,
            UnitKind::Slides => &mut self.slides,
        })
    }

    /// Replace the prompt. Only allowed in the topic phase.
    pub fn set_prompt(&mut self, prompt: impl Into<String>) -> Result<(), WorkflowError> {
        if self.phase != WorkflowPhase::Topic {
            return Err(WorkflowError::WrongPhase {
                operation: "edit the prompt",
                phase: self.phase,
            });
        }
        self.prompt = prompt.into();
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Switch the document type. Only allowed in the topic phase.
    pub fn set_document_type(&mut self, document_type: DocumentType) -> Result<(), WorkflowError> {
        if self.phase != WorkflowPhase::Topic {
            return Err(WorkflowError::DocumentTypeFrozen(self.phase));
        }
        self.document_type = document_type;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Move to `target`, returning the phase left behind
    pub fn transition(
        &mut self,
        target: WorkflowPhase,
        trigger: PhaseTrigger,
    ) -> Result<WorkflowPhase, WorkflowError> {
        let old = self.phase;
        self.phase = transition_state(old, target, trigger)?;
        self.updated_at = Utc::now();
        Ok(old)
    }

    pub fn set_error(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
        self.updated_at = Utc::now();
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Package the active structure for generation. Titles only.
    pub fn generation_request(&self) -> GenerationRequest {
        GenerationRequest {
            prompt: self.prompt.trim().to_string(),
            document_type: self.document_type,
            titles: self.structure().titles(),
        }
    }
}
