//! Tests for the content generation workflow

use super::*;
use crate::events::{EventSink, WorkflowEvent};
use crate::models::{DocumentType, UnitKind, WorkflowPhase};
use crate::service::testing::{FakeDocumentService, OP_GENERATE, OP_OUTLINE};
use std::sync::Arc;

fn workflow_with(service: Arc<FakeDocumentService>) -> GenerationWorkflow {
    GenerationWorkflow::new(service, EventSink::disabled())
}

fn at_structure(service: Arc<FakeDocumentService>, document_type: DocumentType) -> GenerationWorkflow {
    let mut workflow = workflow_with(service);
    workflow.set_prompt("Electric vehicle market analysis").unwrap();
    workflow.set_document_type(document_type).unwrap();
    workflow.proceed_to_structure().unwrap();
    workflow
}

#[test]
fn test_new_session_starts_in_topic() {
    let workflow = workflow_with(FakeDocumentService::shared());
    assert_eq!(workflow.phase(), WorkflowPhase::Topic);
    assert_eq!(workflow.state().document_type, DocumentType::Docx);
    assert_eq!(
        workflow.structure().titles(),
        vec!["Introduction", "Main Content", "Conclusion"]
    );
}

#[test]
fn test_empty_prompt_blocks_structure_phase() {
    let mut workflow = workflow_with(FakeDocumentService::shared());
    workflow.set_prompt("   ").unwrap();

    assert_eq!(workflow.proceed_to_structure(), Err(WorkflowError::EmptyPrompt));
    assert_eq!(workflow.phase(), WorkflowPhase::Topic);
}

#[test]
fn test_document_type_frozen_after_topic() {
    let mut workflow = at_structure(FakeDocumentService::shared(), DocumentType::Docx);

    assert_eq!(
        workflow.set_document_type(DocumentType::Pptx),
        Err(WorkflowError::DocumentTypeFrozen(WorkflowPhase::Structure))
    );
    assert!(matches!(
        workflow.set_prompt("something else"),
        Err(WorkflowError::WrongPhase { .. })
    ));
}

#[test]
fn test_switching_type_keeps_each_structure() {
    let mut workflow = workflow_with(FakeDocumentService::shared());
    workflow.structure_mut().unwrap().rename_unit(1, "Overview").unwrap();

    workflow.set_document_type(DocumentType::Pptx).unwrap();
    assert_eq!(workflow.structure().kind(), UnitKind::Slides);
    assert_eq!(workflow.structure().titles()[0], "Introduction");

    workflow.set_document_type(DocumentType::Docx).unwrap();
    assert_eq!(workflow.structure().titles()[0], "Overview");
}

#[test]
fn test_back_to_topic_keeps_edits() {
    let mut workflow = at_structure(FakeDocumentService::shared(), DocumentType::Docx);
    workflow.structure_mut().unwrap().add_unit().unwrap();

    workflow.back_to_topic().unwrap();

    assert_eq!(workflow.phase(), WorkflowPhase::Topic);
    assert_eq!(workflow.structure().len(), 4);
    workflow.set_prompt("Revised prompt").unwrap();
}

#[tokio::test]
async fn test_suggest_outline_applies_sections() {
    let service = FakeDocumentService::shared();
    service.set_outline(
        "Here is an outline:\n1. Introduction\n2. **Market Size**\n2.1 Detail\n3. Outlook",
    );
    let mut workflow = at_structure(service.clone(), DocumentType::Docx);

    let count = workflow.suggest_outline().await.unwrap();

    assert_eq!(count, 3);
    assert_eq!(
        workflow.structure().titles(),
        vec!["Introduction", "Market Size", "Outlook"]
    );
    let ids: Vec<u32> = workflow.structure().entries().iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert!(workflow.state().outline_text.is_some());
}

#[tokio::test]
async fn test_suggest_outline_applies_slides() {
    let service = FakeDocumentService::shared();
    service.set_outline("Slide 1: Title\n- bullet\nSlide 2: Problem\nSlide 3: Solution\nSlide 4: Ask");
    let (sink, mut rx) = EventSink::channel();
    let mut workflow = GenerationWorkflow::new(service.clone(), sink);
    workflow.set_prompt("Startup pitch").unwrap();
    workflow.set_document_type(DocumentType::Pptx).unwrap();
    workflow.proceed_to_structure().unwrap();

    assert_eq!(workflow.suggest_outline().await.unwrap(), 4);
    assert_eq!(workflow.structure().len(), 4);

    let mut applied = None;
    while let Ok(event) = rx.try_recv() {
        if let WorkflowEvent::OutlineApplied(payload) = event {
            applied = Some(payload);
        }
    }
    let applied = applied.unwrap();
    assert_eq!(applied.unit_count, 4);
    assert_eq!(applied.document_type, DocumentType::Pptx);
}

#[tokio::test]
async fn test_empty_outline_keeps_structure() {
    let service = FakeDocumentService::shared();
    service.set_outline("I could not come up with anything useful.");
    let mut workflow = at_structure(service.clone(), DocumentType::Docx);
    let before = workflow.structure().clone();

    assert_eq!(workflow.suggest_outline().await.unwrap(), 0);
    assert_eq!(workflow.structure(), &before);
}

#[tokio::test]
async fn test_outline_failure_records_error() {
    let service = FakeDocumentService::shared();
    service.fail_on(OP_OUTLINE);
    let mut workflow = at_structure(service.clone(), DocumentType::Docx);
    let before = workflow.structure().clone();

    let err = workflow.suggest_outline().await.unwrap_err();

    assert!(matches!(err, WorkflowError::OutlineFailed(_)));
    assert_eq!(workflow.structure(), &before);
    assert!(workflow.state().error.is_some());
    assert_eq!(workflow.phase(), WorkflowPhase::Structure);
}

#[tokio::test]
async fn test_suggest_outline_requires_structure_phase() {
    let service = FakeDocumentService::shared();
    let mut workflow = workflow_with(service.clone());
    workflow.set_prompt("Topic").unwrap();

    assert!(matches!(
        workflow.suggest_outline().await,
        Err(WorkflowError::WrongPhase { .. })
    ));
    assert_eq!(service.calls(OP_OUTLINE), 0);
}

#[tokio::test]
async fn test_generate_sends_titles_only() {
    let service = FakeDocumentService::shared();
    let mut workflow = at_structure(service.clone(), DocumentType::Docx);
    {
        let structure = workflow.structure_mut().unwrap();
        structure.rename_unit(2, "Market Overview").unwrap();
        structure.move_down(0);
    }

    let engine = workflow.generate().await.unwrap();

    let requests = service.generation_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].prompt, "Electric vehicle market analysis");
    assert_eq!(requests[0].document_type, DocumentType::Docx);
    assert_eq!(
        requests[0].titles,
        vec!["Market Overview", "Introduction", "Conclusion"]
    );

    assert_eq!(workflow.phase(), WorkflowPhase::Generating);
    assert_eq!(engine.project_id(), "proj-1");
    assert_eq!(engine.len(), 3);
    assert_eq!(engine.units()[0].content, "Content for Market Overview");
}

#[tokio::test]
async fn test_failed_generation_returns_to_structure() {
    let service = FakeDocumentService::shared();
    service.fail_on(OP_GENERATE);
    let mut workflow = at_structure(service.clone(), DocumentType::Pptx);
    workflow.structure_mut().unwrap().set_unit_count(5).unwrap();
    let before = workflow.structure().clone();

    let err = workflow.generate().await.err().unwrap();

    assert!(matches!(err, WorkflowError::GenerationFailed(_)));
    assert_eq!(workflow.phase(), WorkflowPhase::Structure);
    assert_eq!(workflow.structure(), &before);
    assert!(workflow.state().error.is_some());

    // The retry uses the same structure
    service.succeed_on(OP_GENERATE);
    workflow.generate().await.unwrap();
    let requests = service.generation_requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].titles, requests[1].titles);
    assert!(workflow.state().error.is_none());
}

#[tokio::test]
async fn test_structure_locked_while_generating() {
    let service = FakeDocumentService::shared();
    let mut workflow = at_structure(service, DocumentType::Docx);
    assert!(!workflow.is_finished());
    let _engine = workflow.generate().await.unwrap();
    assert!(workflow.is_finished());

    assert_eq!(
        workflow.structure_mut().err(),
        Some(WorkflowError::NotEditable(WorkflowPhase::Generating))
    );
    assert!(matches!(
        workflow.generate().await,
        Err(WorkflowError::WrongPhase { .. })
    ));
    assert!(workflow.back_to_topic().is_err());
}

#[tokio::test]
async fn test_phase_events_are_emitted() {
    let service = FakeDocumentService::shared();
    let (sink, mut rx) = EventSink::channel();
    let mut workflow = GenerationWorkflow::new(service, sink);
    workflow.set_prompt("Quarterly report").unwrap();
    workflow.proceed_to_structure().unwrap();
    let _engine = workflow.generate().await.unwrap();

    let mut names = Vec::new();
    while let Ok(event) = rx.try_recv() {
        names.push(event.name());
    }
    assert_eq!(
        names,
        vec![
            crate::events::EVENT_PHASE_CHANGED,
            crate::events::EVENT_PHASE_CHANGED,
            crate::events::EVENT_GENERATION_COMPLETED,
        ]
    );
}
