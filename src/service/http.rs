// DocForge REST API client

use super::{DocumentService, ServiceError};
use crate::config::ApiConfig;
use crate::models::{
    derive_project_title, DocumentType, Feedback, GeneratedDocument, GenerationRequest, Identity,
    Project, ProjectSummary, Unit, UnitId,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

/// [`DocumentService`] over the DocForge HTTP API
pub struct HttpDocumentService {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpDocumentService {
    pub fn new(config: &ApiConfig, token: impl Into<String>) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ServiceError::Http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn unit_url(&self, project_id: &str, unit_id: &UnitId, action: &str) -> String {
        self.url(&format!(
            "/projects/{}/sections/{}/{}",
            project_id, unit_id, action
        ))
    }

    /// Send a request with the bearer token and check the status
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        token: &str,
    ) -> Result<reqwest::Response, ServiceError> {
        let response = request
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .map_err(|e| ServiceError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            log::warn!("[http] {} {}", status, text);
            return Err(ServiceError::from_status(status.as_u16(), error_detail(&text)));
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ServiceError> {
        log::debug!("[http] GET {}", path);
        let response = self
            .send(self.client.get(self.url(path)), &self.token)
            .await?;
        decode(response).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ServiceError> {
        log::debug!("[http] POST {}", path);
        let response = self
            .send(self.client.post(self.url(path)).json(body), &self.token)
            .await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ServiceError> {
    response
        .json()
        .await
        .map_err(|e| ServiceError::Decode(e.to_string()))
}

/// Pull `detail` out of a JSON error body, falling back to the raw text
fn error_detail(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["detail"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

/// Accept RFC 3339 timestamps and naive ISO timestamps (assumed UTC)
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

// Wire formats

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    uid: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OutlineResponse {
    outline: String,
}

#[derive(Debug, Deserialize)]
struct StructuredDocumentResponse {
    project_id: String,
}

#[derive(Debug, Deserialize)]
struct RefineResponse {
    content: String,
}

#[derive(Debug, Deserialize)]
struct SectionWire {
    id: String,
    title: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    order: Option<u32>,
    #[serde(default)]
    feedback: Option<String>,
    #[serde(default)]
    comments: Option<Vec<String>>,
}

impl From<SectionWire> for Unit {
    fn from(wire: SectionWire) -> Self {
        Unit {
            id: UnitId::new(wire.id),
            title: wire.title,
            content: wire.content.unwrap_or_default(),
            order: wire.order.unwrap_or(0),
            // Unknown feedback strings are treated as no feedback
            feedback: wire.feedback.and_then(|f| f.parse::<Feedback>().ok()),
            comments: wire.comments.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    sections: Vec<SectionWire>,
}

#[derive(Debug, Deserialize)]
struct ProjectWire {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(rename = "type", alias = "document_type")]
    document_type: String,
    #[serde(default)]
    outline: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
    #[serde(default)]
    user_id: Option<String>,
}

impl TryFrom<ProjectWire> for Project {
    type Error = ServiceError;

    fn try_from(wire: ProjectWire) -> Result<Self, Self::Error> {
        let document_type: DocumentType =
            wire.document_type.parse().map_err(ServiceError::Decode)?;
        let created_at = wire
            .created_at
            .as_deref()
            .and_then(parse_timestamp)
            .unwrap_or_else(Utc::now);
        let title = if wire.title.trim().is_empty() {
            derive_project_title(&wire.description)
        } else {
            wire.title
        };

        Ok(Project {
            id: wire.id,
            title,
            description: wire.description,
            document_type,
            outline: wire.outline,
            created_at,
            updated_at: wire.updated_at.as_deref().and_then(parse_timestamp),
            user_id: wire.user_id,
            units: Vec::new(),
        })
    }
}

/// Request body for structured generation: `{"sections": [{"title": ..}]}`
/// or `{"slides": [{"title": ..}]}`
fn structure_body(request: &GenerationRequest) -> serde_json::Value {
    let titles: Vec<serde_json::Value> = request
        .titles
        .iter()
        .map(|title| json!({ "title": title }))
        .collect();
    let mut structure = serde_json::Map::new();
    structure.insert(
        request.document_type.unit_kind().plural().to_string(),
        serde_json::Value::Array(titles),
    );
    json!({
        "prompt": request.prompt,
        "document_type": request.document_type.as_str(),
        "structure": structure,
    })
}

#[async_trait]
impl DocumentService for HttpDocumentService {
    async fn verify_identity(&self, token: &str) -> Result<Identity, ServiceError> {
        log::debug!("[http] POST /auth/verify");
        let response = self
            .send(self.client.post(self.url("/auth/verify")), token)
            .await?;
        let verified: VerifyResponse = decode(response).await?;
        Ok(Identity {
            uid: verified.uid,
            email: verified.email,
        })
    }

    async fn generate_outline(
        &self,
        description: &str,
        document_type: DocumentType,
    ) -> Result<String, ServiceError> {
        let body = json!({ "description": description, "type": document_type.as_str() });
        let response: OutlineResponse = self
            .post_json("/projects/generate-outline", &body)
            .await?;
        Ok(response.outline)
    }

    async fn generate_structured_document(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedDocument, ServiceError> {
        let body = structure_body(request);
        let created: StructuredDocumentResponse = self
            .post_json("/generate-structured-document", &body)
            .await?;

        // The create call only returns the id; content is read back
        let units = self.fetch_project_content(&created.project_id).await?;
        Ok(GeneratedDocument {
            project_id: created.project_id,
            units,
        })
    }

    async fn refine_section(
        &self,
        project_id: &str,
        unit_id: &UnitId,
        instruction: &str,
    ) -> Result<String, ServiceError> {
        let url = self.unit_url(project_id, unit_id, "refine");
        log::debug!("[http] POST {}", url);
        let response = self
            .send(
                self.client
                    .post(url)
                    .json(&json!({ "refinement_prompt": instruction })),
                &self.token,
            )
            .await?;
        let refined: RefineResponse = decode(response).await?;
        Ok(refined.content)
    }

    async fn record_feedback(
        &self,
        project_id: &str,
        unit_id: &UnitId,
        feedback: Feedback,
    ) -> Result<(), ServiceError> {
        let url = self.unit_url(project_id, unit_id, "feedback");
        log::debug!("[http] POST {}", url);
        self.send(
            self.client
                .post(url)
                .json(&json!({ "feedback": feedback.as_wire() })),
            &self.token,
        )
        .await?;
        Ok(())
    }

    async fn record_comment(
        &self,
        project_id: &str,
        unit_id: &UnitId,
        comment: &str,
    ) -> Result<(), ServiceError> {
        let url = self.unit_url(project_id, unit_id, "comment");
        log::debug!("[http] POST {}", url);
        self.send(
            self.client.post(url).json(&json!({ "comment": comment })),
            &self.token,
        )
        .await?;
        Ok(())
    }

    async fn export_document(
        &self,
        project_id: &str,
        document_type: DocumentType,
    ) -> Result<Vec<u8>, ServiceError> {
        let path = format!("/projects/{}/export/{}", project_id, document_type.as_str());
        log::debug!("[http] GET {}", path);
        let response = self
            .send(self.client.get(self.url(&path)), &self.token)
            .await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ServiceError::Decode(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn fetch_project(&self, project_id: &str) -> Result<Project, ServiceError> {
        let wire: ProjectWire = self.get_json(&format!("/projects/{}", project_id)).await?;
        Project::try_from(wire)
    }

    async fn fetch_project_content(&self, project_id: &str) -> Result<Vec<Unit>, ServiceError> {
        let content: ContentResponse = self
            .get_json(&format!("/projects/{}/content", project_id))
            .await?;
        Ok(content.sections.into_iter().map(Unit::from).collect())
    }

    async fn list_projects(&self) -> Result<Vec<ProjectSummary>, ServiceError> {
        let wires: Vec<ProjectWire> = self.get_json("/projects").await?;
        let mut summaries = Vec::with_capacity(wires.len());
        for wire in wires {
            match Project::try_from(wire) {
                Ok(project) => summaries.push(ProjectSummary::from(&project)),
                Err(e) => log::warn!("[http] Skipping unreadable project: {}", e),
            }
        }
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structure_body_sections() {
        let request = GenerationRequest {
            prompt: "EV market".to_string(),
            document_type: DocumentType::Docx,
            titles: vec!["Intro".to_string(), "Outlook".to_string()],
        };
        let body = structure_body(&request);
        assert_eq!(body["document_type"], "docx");
        assert_eq!(body["structure"]["sections"][1]["title"], "Outlook");
        assert!(body["structure"].get("slides").is_none());
    }

    #[test]
    fn test_structure_body_slides() {
        let request = GenerationRequest {
            prompt: "Pitch".to_string(),
            document_type: DocumentType::Pptx,
            titles: vec!["Welcome".to_string()],
        };
        let body = structure_body(&request);
        assert_eq!(body["structure"]["slides"][0]["title"], "Welcome");
    }

    #[test]
    fn test_section_wire_tolerates_nulls() {
        let wire: SectionWire = serde_json::from_str(
            r#"{"id": "s1", "title": "Intro", "content": "Hi", "order": 2, "feedback": null, "comments": null}"#,
        )
        .unwrap();
        let unit = Unit::from(wire);
        assert_eq!(unit.order, 2);
        assert_eq!(unit.feedback, None);
        assert!(unit.comments.is_empty());

        let wire: SectionWire = serde_json::from_str(
            r#"{"id": "s2", "title": "X", "content": "", "order": 0, "feedback": "dislike", "comments": ["a"]}"#,
        )
        .unwrap();
        let unit = Unit::from(wire);
        assert_eq!(unit.feedback, Some(Feedback::Negative));
        assert_eq!(unit.comments, vec!["a".to_string()]);
    }

    #[test]
    fn test_project_wire_naive_timestamp() {
        let wire: ProjectWire = serde_json::from_str(
            r#"{"id": "p1", "title": "", "description": "Quarterly board update", "type": "pptx", "created_at": "2025-03-01T10:20:30.123456"}"#,
        )
        .unwrap();
        let project = Project::try_from(wire).unwrap();
        assert_eq!(project.title, "Quarterly board update");
        assert_eq!(project.document_type, DocumentType::Pptx);
        assert_eq!(
            project.created_at,
            parse_timestamp("2025-03-01T10:20:30.123456Z").unwrap()
        );
    }

    #[test]
    fn test_project_wire_unknown_type() {
        let wire: ProjectWire =
            serde_json::from_str(r#"{"id": "p1", "title": "t", "type": "pdf"}"#).unwrap();
        assert!(matches!(
            Project::try_from(wire),
            Err(ServiceError::Decode(_))
        ));
    }

    #[test]
    fn test_error_detail() {
        assert_eq!(error_detail(r#"{"detail": "Project not found"}"#), "Project not found");
        assert_eq!(error_detail("  plain text "), "plain text");
    }

    #[test]
    fn test_new_trims_base_url() {
        let config = ApiConfig {
            base_url: "https://api.example.com/".to_string(),
            ..ApiConfig::default()
        };
        let service = HttpDocumentService::new(&config, "tok").unwrap();
        assert_eq!(service.base_url(), "https://api.example.com");
        assert_eq!(
            service.unit_url("p1", &UnitId::from("s9"), "refine"),
            "https://api.example.com/projects/p1/sections/s9/refine"
        );
    }
}
