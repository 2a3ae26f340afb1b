// Signed-in session: verified identity plus the service handle every
// workflow and refinement engine shares

use crate::events::EventSink;
use crate::models::{Identity, ProjectSummary};
use crate::refinement::{RefinementEngine, RefinementError};
use crate::service::{DocumentService, ServiceError};
use crate::workflow::GenerationWorkflow;
use std::sync::Arc;

/// A verified user session.
///
/// The identity token is checked exactly once, when the session is
/// established. Later calls reuse the same service client.
pub struct Session {
    identity: Identity,
    service: Arc<dyn DocumentService>,
    events: EventSink,
}

impl Session {
    /// Verify `token` and open a session. No retry on failure.
    pub async fn establish(
        service: Arc<dyn DocumentService>,
        token: &str,
        events: EventSink,
    ) -> Result<Self, ServiceError> {
        if token.trim().is_empty() {
            return Err(ServiceError::Auth("No identity token provided".to_string()));
        }
        let identity = service.verify_identity(token).await?;
        log::info!("[session] Signed in as {}", identity.uid);
        Ok(Self {
            identity,
            service,
            events,
        })
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn service(&self) -> Arc<dyn DocumentService> {
        Arc::clone(&self.service)
    }

    /// Start a new creation session in the topic phase
    pub fn new_workflow(&self) -> GenerationWorkflow {
        GenerationWorkflow::new(self.service(), self.events.clone())
    }

    /// Rehydrate an existing project for refinement
    pub async fn open_project(&self, project_id: &str) -> Result<RefinementEngine, RefinementError> {
        RefinementEngine::open(self.service(), project_id, self.events.clone()).await
    }

    /// Projects of the signed-in user, newest first
    pub async fn list_projects(&self) -> Result<Vec<ProjectSummary>, ServiceError> {
        self.service.list_projects().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DocumentType, Unit, WorkflowPhase};
    use crate::service::testing::{sample_project, FakeDocumentService, OP_LIST, OP_VERIFY};

    #[tokio::test]
    async fn test_establish_verifies_once() {
        let service = FakeDocumentService::shared();
        let session = Session::establish(service.clone(), "token-123", EventSink::disabled())
            .await
            .unwrap();

        assert_eq!(session.identity().uid, "user-1");
        let _workflow = session.new_workflow();
        session.list_projects().await.unwrap();

        assert_eq!(service.calls(OP_VERIFY), 1);
        assert_eq!(service.calls(OP_LIST), 1);
    }

    #[tokio::test]
    async fn test_blank_token_rejected_locally() {
        let service = FakeDocumentService::shared();
        let result = Session::establish(service.clone(), "  ", EventSink::disabled()).await;

        assert!(matches!(result, Err(ServiceError::Auth(_))));
        assert_eq!(service.calls(OP_VERIFY), 0);
    }

    #[tokio::test]
    async fn test_verification_failure() {
        let service = FakeDocumentService::shared();
        service.fail_on(OP_VERIFY);
        let result = Session::establish(service, "token", EventSink::disabled()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_new_workflow_and_open_project() {
        let service = FakeDocumentService::shared();
        service.set_project(
            sample_project("proj-7", DocumentType::Docx),
            vec![Unit::new("s1", "Intro", "Hello").with_order(0)],
        );
        let session = Session::establish(service, "token", EventSink::disabled())
            .await
            .unwrap();

        assert_eq!(session.new_workflow().phase(), WorkflowPhase::Topic);

        let engine = session.open_project("proj-7").await.unwrap();
        assert_eq!(engine.len(), 1);

        let projects = session.list_projects().await.unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].id, "proj-7");
    }
}
