// Refinement engine: owns the generated working set of one project

use super::inflight::{InFlightGuard, InFlightKey, InFlightRegistry, UnitOperation};
use super::RefinementError;
use crate::events::{
    CommentAddedPayload, EventSink, ExportWrittenPayload, FeedbackRecordedPayload,
    UnitRefinedPayload, WorkflowEvent,
};
use crate::file_storage::exports::save_export;
use crate::formatter::{self, DisplayNode};
use crate::models::{derive_project_title, DocumentType, Feedback, Project, Unit, UnitId};
use crate::service::{DocumentService, ServiceError};
use crate::utils::{lock_mutex_recover, unix_millis};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Editable state kept next to each generated unit
#[derive(Debug, Clone, PartialEq, Eq)]
struct UnitSlot {
    unit: Unit,
    /// Refinement instruction as last typed
    draft_instruction: String,
    comment_buffer: String,
    comment_panel_open: bool,
}

impl UnitSlot {
    fn new(unit: Unit) -> Self {
        Self {
            unit,
            draft_instruction: String::new(),
            comment_buffer: String::new(),
            comment_panel_open: false,
        }
    }
}

/// Per-unit refine, feedback and comment operations over a generated project.
///
/// All operations take `&self`; units live behind a mutex that is never held
/// across an await, so calls on different units can run concurrently. A
/// second call of the same operation on the same unit is rejected while the
/// first is pending.
pub struct RefinementEngine {
    project_id: String,
    title: String,
    prompt: String,
    document_type: DocumentType,
    service: Arc<dyn DocumentService>,
    units: Mutex<Vec<UnitSlot>>,
    in_flight: InFlightRegistry,
    events: EventSink,
}

impl RefinementEngine {
    /// Take ownership of a freshly generated working set
    pub fn new(
        service: Arc<dyn DocumentService>,
        project_id: impl Into<String>,
        prompt: impl Into<String>,
        document_type: DocumentType,
        units: Vec<Unit>,
        events: EventSink,
    ) -> Self {
        let prompt = prompt.into();
        Self {
            project_id: project_id.into(),
            title: derive_project_title(&prompt),
            prompt,
            document_type,
            service,
            units: Mutex::new(units.into_iter().map(UnitSlot::new).collect()),
            in_flight: InFlightRegistry::new(),
            events,
        }
    }

    /// Rehydrate an existing project by id (deep link).
    ///
    /// Units are ordered by the position the service reports for them.
    pub async fn open(
        service: Arc<dyn DocumentService>,
        project_id: &str,
        events: EventSink,
    ) -> Result<Self, RefinementError> {
        let project: Project = service
            .fetch_project(project_id)
            .await
            .map_err(RefinementError::Load)?;
        let mut units = service
            .fetch_project_content(project_id)
            .await
            .map_err(RefinementError::Load)?;

        if units.is_empty() {
            return Err(RefinementError::EmptyProject(project_id.to_string()));
        }
        // Stable: equal orders keep the service's order
        units.sort_by_key(|u| u.order);

        log::info!(
            "[refine] Opened project {} ({} {})",
            project.id,
            units.len(),
            project.document_type.unit_kind().plural()
        );

        let mut engine = Self::new(
            service,
            project.id.clone(),
            project.prompt().to_string(),
            project.document_type,
            units,
            events,
        );
        engine.title = project.title;
        Ok(engine)
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn document_type(&self) -> DocumentType {
        self.document_type
    }

    /// Snapshot of the working set in order
    pub fn units(&self) -> Vec<Unit> {
        lock_mutex_recover(&self.units)
            .iter()
            .map(|slot| slot.unit.clone())
            .collect()
    }

    pub fn unit(&self, unit_id: &UnitId) -> Option<Unit> {
        self.with_slot(unit_id, |slot| slot.unit.clone()).ok()
    }

    pub fn len(&self) -> usize {
        lock_mutex_recover(&self.units).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn draft_instruction(&self, unit_id: &UnitId) -> Option<String> {
        self.with_slot(unit_id, |slot| slot.draft_instruction.clone()).ok()
    }

    pub fn set_draft_instruction(
        &self,
        unit_id: &UnitId,
        text: impl Into<String>,
    ) -> Result<(), RefinementError> {
        let text = text.into();
        self.with_slot_mut(unit_id, |slot| slot.draft_instruction = text)
    }

    pub fn comment_buffer(&self, unit_id: &UnitId) -> Option<String> {
        self.with_slot(unit_id, |slot| slot.comment_buffer.clone()).ok()
    }

    pub fn is_comment_panel_open(&self, unit_id: &UnitId) -> bool {
        self.with_slot(unit_id, |slot| slot.comment_panel_open)
            .unwrap_or(false)
    }

    /// Show or hide a unit's comment panel
    pub fn toggle_comment_panel(&self, unit_id: &UnitId) -> Result<bool, RefinementError> {
        self.with_slot_mut(unit_id, |slot| {
            slot.comment_panel_open = !slot.comment_panel_open;
            slot.comment_panel_open
        })
    }

    pub fn is_in_flight(&self, unit_id: &UnitId, operation: UnitOperation) -> bool {
        self.in_flight.is_pending(Some(unit_id), operation)
    }

    /// All pending calls
    pub fn in_flight(&self) -> Vec<InFlightKey> {
        self.in_flight.snapshot()
    }

    /// Rewrite one unit's content from an instruction and return the new
    /// content. Other units are never touched.
    ///
    /// The instruction is kept as the unit's draft until the call succeeds.
    /// A call rejected up front leaves the existing draft alone.
    pub async fn refine(
        &self,
        unit_id: &UnitId,
        instruction: &str,
    ) -> Result<String, RefinementError> {
        let typed = instruction;
        let instruction = typed.trim();
        if instruction.is_empty() {
            return Err(RefinementError::EmptyInstruction);
        }
        self.with_slot(unit_id, |_| ())?;
        let _guard = self.acquire(unit_id, UnitOperation::Refine)?;
        self.set_draft_instruction(unit_id, typed)?;
        log::info!("[refine] Refining unit {} of {}", unit_id, self.project_id);

        let result = self
            .service
            .refine_section(&self.project_id, unit_id, instruction)
            .await;

        match result {
            Ok(content) => {
                self.with_slot_mut(unit_id, |slot| {
                    slot.unit.content = content.clone();
                    slot.draft_instruction.clear();
                })?;
                self.events
                    .emit(WorkflowEvent::UnitRefined(UnitRefinedPayload {
                        project_id: self.project_id.clone(),
                        unit_id: unit_id.clone(),
                    }));
                Ok(content)
            }
            Err(e) => Err(self.fail(unit_id, UnitOperation::Refine, e)),
        }
    }

    /// Store a feedback value for a unit.
    ///
    /// Setting the value a unit already has is a no-op that makes no call and
    /// returns `Ok(false)`.
    pub async fn set_feedback(
        &self,
        unit_id: &UnitId,
        feedback: Feedback,
    ) -> Result<bool, RefinementError> {
        let current = self.with_slot(unit_id, |slot| slot.unit.feedback)?;
        if current == Some(feedback) {
            log::debug!("[refine] Feedback for {} unchanged", unit_id);
            return Ok(false);
        }

        let _guard = self.acquire(unit_id, UnitOperation::Feedback)?;
        let result = self
            .service
            .record_feedback(&self.project_id, unit_id, feedback)
            .await;

        match result {
            Ok(()) => {
                self.with_slot_mut(unit_id, |slot| slot.unit.feedback = Some(feedback))?;
                self.events
                    .emit(WorkflowEvent::FeedbackRecorded(FeedbackRecordedPayload {
                        project_id: self.project_id.clone(),
                        unit_id: unit_id.clone(),
                        feedback,
                    }));
                Ok(true)
            }
            Err(e) => Err(self.fail(unit_id, UnitOperation::Feedback, e)),
        }
    }

    /// Append a comment to a unit. Returns the unit's comment count.
    ///
    /// The text sits in the unit's comment buffer with the panel open until
    /// the call succeeds; success clears the buffer and collapses the panel.
    pub async fn add_comment(
        &self,
        unit_id: &UnitId,
        text: &str,
    ) -> Result<usize, RefinementError> {
        self.with_slot(unit_id, |_| ())?;
        let comment = text.trim();
        if comment.is_empty() {
            return Err(RefinementError::EmptyComment);
        }

        let _guard = self.acquire(unit_id, UnitOperation::Comment)?;
        self.with_slot_mut(unit_id, |slot| {
            slot.comment_buffer = text.to_string();
            slot.comment_panel_open = true;
        })?;
        let result = self
            .service
            .record_comment(&self.project_id, unit_id, comment)
            .await;

        match result {
            Ok(()) => {
                let count = self.with_slot_mut(unit_id, |slot| {
                    slot.unit.comments.push(comment.to_string());
                    slot.comment_buffer.clear();
                    slot.comment_panel_open = false;
                    slot.unit.comments.len()
                })?;
                self.events
                    .emit(WorkflowEvent::CommentAdded(CommentAddedPayload {
                        project_id: self.project_id.clone(),
                        unit_id: unit_id.clone(),
                        comment_count: count,
                    }));
                Ok(count)
            }
            Err(e) => Err(self.fail(unit_id, UnitOperation::Comment, e)),
        }
    }

    /// Download the rendered document into `dir` as
    /// `document_{unix_millis}.{ext}`
    pub async fn export(&self, dir: &Path) -> Result<PathBuf, RefinementError> {
        let _guard = self
            .in_flight
            .try_acquire(None, UnitOperation::Export)
            .ok_or(RefinementError::ExportInFlight)?;

        let bytes = match self
            .service
            .export_document(&self.project_id, self.document_type)
            .await
        {
            Ok(bytes) => bytes,
            Err(e) => {
                self.events
                    .emit_failure(&self.project_id, UnitOperation::Export.as_str(), None, &e);
                return Err(RefinementError::Service {
                    operation: UnitOperation::Export,
                    source: e,
                });
            }
        };

        let path = save_export(dir, self.document_type, unix_millis(), &bytes)
            .map_err(RefinementError::Storage)?;

        self.events
            .emit(WorkflowEvent::ExportWritten(ExportWrittenPayload {
                project_id: self.project_id.clone(),
                path: path.clone(),
                bytes: bytes.len(),
            }));
        Ok(path)
    }

    /// Working set composed into one markdown document
    pub fn compose_markdown(&self) -> String {
        formatter::compose_markdown(&self.units())
    }

    /// Display nodes for the composed document
    pub fn preview(&self) -> Vec<DisplayNode> {
        formatter::format(&self.compose_markdown())
    }

    pub fn word_count(&self) -> usize {
        formatter::word_count(&self.compose_markdown())
    }

    fn acquire(
        &self,
        unit_id: &UnitId,
        operation: UnitOperation,
    ) -> Result<InFlightGuard, RefinementError> {
        self.in_flight
            .try_acquire(Some(unit_id), operation)
            .ok_or_else(|| RefinementError::OperationInFlight {
                unit_id: unit_id.clone(),
                operation,
            })
    }

    /// Log and surface a collaborator failure
    fn fail(
        &self,
        unit_id: &UnitId,
        operation: UnitOperation,
        error: ServiceError,
    ) -> RefinementError {
        log::warn!(
            "[refine] {} failed for unit {} of {}: {}",
            operation,
            unit_id,
            self.project_id,
            error
        );
        self.events
            .emit_failure(&self.project_id, operation.as_str(), Some(unit_id), &error);
        RefinementError::Service {
            operation,
            source: error,
        }
    }

    fn with_slot<R>(
        &self,
        unit_id: &UnitId,
        f: impl FnOnce(&UnitSlot) -> R,
    ) -> Result<R, RefinementError> {
        let units = lock_mutex_recover(&self.units);
        units
            .iter()
            .find(|slot| &slot.unit.id == unit_id)
            .map(f)
            .ok_or_else(|| RefinementError::UnitNotFound(unit_id.clone()))
    }

    fn with_slot_mut<R>(
        &self,
        unit_id: &UnitId,
        f: impl FnOnce(&mut UnitSlot) -> R,
    ) -> Result<R, RefinementError> {
        let mut units = lock_mutex_recover(&self.units);
        units
            .iter_mut()
            .find(|slot| &slot.unit.id == unit_id)
            .map(f)
            .ok_or_else(|| RefinementError::UnitNotFound(unit_id.clone()))
    }
}
