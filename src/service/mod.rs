//! Document service collaborator
//!
//! Everything network bound goes through [`DocumentService`]: identity
//! verification, outline suggestion, structured generation, per-unit
//! refinement/feedback/comments, export and project lookup. The workflow and
//! refinement engine only ever hold an `Arc<dyn DocumentService>`, so tests
//! swap in hand-written doubles.

pub mod http;

#[cfg(test)]
pub(crate) mod testing;

pub use http::HttpDocumentService;

use crate::models::{
    DocumentType, Feedback, GeneratedDocument, GenerationRequest, Identity, Project,
    ProjectSummary, Unit, UnitId,
};
use async_trait::async_trait;
use thiserror::Error;

/// Collaborator failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("Request failed: {0}")]
    Http(String),

    #[error("Service returned {status}: {detail}")]
    Status { status: u16, detail: String },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl ServiceError {
    /// Map an HTTP status and response body to the matching variant
    pub fn from_status(status: u16, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        match status {
            401 | 403 => ServiceError::Auth(detail),
            404 => ServiceError::NotFound(detail),
            _ => ServiceError::Status { status, detail },
        }
    }
}

/// Backend operations the core depends on
#[async_trait]
pub trait DocumentService: Send + Sync {
    /// Check the identity token. Called once per session.
    async fn verify_identity(&self, token: &str) -> Result<Identity, ServiceError>;

    /// Ask the AI for an outline of a document or deck
    async fn generate_outline(
        &self,
        description: &str,
        document_type: DocumentType,
    ) -> Result<String, ServiceError>;

    /// Create a project and generate content for every unit in the request
    async fn generate_structured_document(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedDocument, ServiceError>;

    /// Rewrite one unit's content and return the new content
    async fn refine_section(
        &self,
        project_id: &str,
        unit_id: &UnitId,
        instruction: &str,
    ) -> Result<String, ServiceError>;

    async fn record_feedback(
        &self,
        project_id: &str,
        unit_id: &UnitId,
        feedback: Feedback,
    ) -> Result<(), ServiceError>;

    async fn record_comment(
        &self,
        project_id: &str,
        unit_id: &UnitId,
        comment: &str,
    ) -> Result<(), ServiceError>;

    /// Render the project into a binary document
    async fn export_document(
        &self,
        project_id: &str,
        document_type: DocumentType,
    ) -> Result<Vec<u8>, ServiceError>;

    async fn fetch_project(&self, project_id: &str) -> Result<Project, ServiceError>;

    /// Units of a project in the order the service stores them
    async fn fetch_project_content(&self, project_id: &str) -> Result<Vec<Unit>, ServiceError>;

    /// Projects of the signed-in user, newest first
    async fn list_projects(&self) -> Result<Vec<ProjectSummary>, ServiceError>;
}
