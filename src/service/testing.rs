//! Hand-written [`DocumentService`] double for unit tests

use super::{DocumentService, ServiceError};
use crate::models::{
    DocumentType, Feedback, GeneratedDocument, GenerationRequest, Identity, Project,
    ProjectSummary, Unit, UnitId,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub const OP_VERIFY: &str = "verify_identity";
pub const OP_OUTLINE: &str = "generate_outline";
pub const OP_GENERATE: &str = "generate_structured_document";
pub const OP_REFINE: &str = "refine_section";
pub const OP_FEEDBACK: &str = "record_feedback";
pub const OP_COMMENT: &str = "record_comment";
pub const OP_EXPORT: &str = "export_document";
pub const OP_FETCH: &str = "fetch_project";
pub const OP_CONTENT: &str = "fetch_project_content";
pub const OP_LIST: &str = "list_projects";

#[derive(Default)]
pub struct FakeDocumentService {
    calls: Mutex<HashMap<&'static str, usize>>,
    failing: Mutex<HashSet<&'static str>>,
    outline: Mutex<String>,
    content: Mutex<Vec<Unit>>,
    project: Mutex<Option<Project>>,
    generation_requests: Mutex<Vec<GenerationRequest>>,
    refine_instructions: Mutex<Vec<(UnitId, String)>>,
    /// When set, refine calls wait for a notification before answering
    refine_gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeDocumentService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn fail_on(&self, op: &'static str) {
        self.failing.lock().unwrap().insert(op);
    }

    pub fn succeed_on(&self, op: &'static str) {
        self.failing.lock().unwrap().remove(op);
    }

    pub fn set_outline(&self, outline: &str) {
        *self.outline.lock().unwrap() = outline.to_string();
    }

    pub fn set_project(&self, project: Project, content: Vec<Unit>) {
        *self.project.lock().unwrap() = Some(project);
        *self.content.lock().unwrap() = content;
    }

    pub fn gate_refine(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.refine_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn calls(&self, op: &'static str) -> usize {
        self.calls.lock().unwrap().get(op).copied().unwrap_or(0)
    }

    pub fn generation_requests(&self) -> Vec<GenerationRequest> {
        self.generation_requests.lock().unwrap().clone()
    }

    pub fn refine_instructions(&self) -> Vec<(UnitId, String)> {
        self.refine_instructions.lock().unwrap().clone()
    }

    fn record(&self, op: &'static str) -> Result<(), ServiceError> {
        *self.calls.lock().unwrap().entry(op).or_insert(0) += 1;
        if self.failing.lock().unwrap().contains(op) {
            return Err(ServiceError::Status {
                status: 500,
                detail: format!("{} unavailable", op),
            });
        }
        Ok(())
    }
}

pub fn sample_project(id: &str, document_type: DocumentType) -> Project {
    Project {
        id: id.to_string(),
        title: "Sample".to_string(),
        description: "A sample project".to_string(),
        document_type,
        outline: None,
        created_at: Utc::now(),
        updated_at: None,
        user_id: Some("user-1".to_string()),
        units: Vec::new(),
    }
}

#[async_trait]
impl DocumentService for FakeDocumentService {
    async fn verify_identity(&self, token: &str) -> Result<Identity, ServiceError> {
        self.record(OP_VERIFY)?;
        if token.is_empty() {
            return Err(ServiceError::Auth("missing token".to_string()));
        }
        Ok(Identity {
            uid: "user-1".to_string(),
            email: Some("writer@example.com".to_string()),
        })
    }

    async fn generate_outline(
        &self,
        _description: &str,
        _document_type: DocumentType,
    ) -> Result<String, ServiceError> {
        self.record(OP_OUTLINE)?;
        Ok(self.outline.lock().unwrap().clone())
    }

    async fn generate_structured_document(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedDocument, ServiceError> {
        self.generation_requests
            .lock()
            .unwrap()
            .push(request.clone());
        self.record(OP_GENERATE)?;
        let units = request
            .titles
            .iter()
            .enumerate()
            .map(|(i, title)| {
                Unit::new(
                    format!("u{}", i + 1),
                    title.clone(),
                    format!("Content for {}", title),
                )
                .with_order(i as u32)
            })
            .collect();
        Ok(GeneratedDocument {
            project_id: "proj-1".to_string(),
            units,
        })
    }

    async fn refine_section(
        &self,
        _project_id: &str,
        unit_id: &UnitId,
        instruction: &str,
    ) -> Result<String, ServiceError> {
        let gate = self.refine_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.refine_instructions
            .lock()
            .unwrap()
            .push((unit_id.clone(), instruction.to_string()));
        self.record(OP_REFINE)?;
        Ok(format!("Refined {} ({})", unit_id, instruction))
    }

    async fn record_feedback(
        &self,
        _project_id: &str,
        _unit_id: &UnitId,
        _feedback: Feedback,
    ) -> Result<(), ServiceError> {
        self.record(OP_FEEDBACK)
    }

    async fn record_comment(
        &self,
        _project_id: &str,
        _unit_id: &UnitId,
        _comment: &str,
    ) -> Result<(), ServiceError> {
        self.record(OP_COMMENT)
    }

    async fn export_document(
        &self,
        project_id: &str,
        document_type: DocumentType,
    ) -> Result<Vec<u8>, ServiceError> {
        self.record(OP_EXPORT)?;
        Ok(format!("{}:{}", project_id, document_type).into_bytes())
    }

    async fn fetch_project(&self, project_id: &str) -> Result<Project, ServiceError> {
        self.record(OP_FETCH)?;
        self.project
            .lock()
            .unwrap()
            .clone()
            .filter(|p| p.id == project_id)
            .ok_or_else(|| ServiceError::NotFound("Project not found".to_string()))
    }

    async fn fetch_project_content(&self, _project_id: &str) -> Result<Vec<Unit>, ServiceError> {
        self.record(OP_CONTENT)?;
        Ok(self.content.lock().unwrap().clone())
    }

    async fn list_projects(&self) -> Result<Vec<ProjectSummary>, ServiceError> {
        self.record(OP_LIST)?;
        Ok(self
            .project
            .lock()
            .unwrap()
            .iter()
            .map(ProjectSummary::from)
            .collect())
    }
}
