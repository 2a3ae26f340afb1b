// Data models shared by the structuring workflow, the refinement engine and the API client

pub mod state_machine;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upper bound on the number of slides in a deck
pub const MAX_SLIDES: usize = 20;

/// Project titles derived from the prompt are cut to this many characters
pub const PROJECT_TITLE_MAX_CHARS: usize = 100;

/// Output document format. Decides which unit kind a structure holds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    /// Word document made of sections
    Docx,
    /// Slide deck made of slides
    Pptx,
}

impl DocumentType {
    /// Returns all supported document types
    pub fn all() -> &'static [DocumentType] {
        &[DocumentType::Docx, DocumentType::Pptx]
    }

    /// Returns the wire / file extension form of this type
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Docx => "docx",
            DocumentType::Pptx => "pptx",
        }
    }

    /// File extension used for exported downloads
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }

    /// Human readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            DocumentType::Docx => "Document",
            DocumentType::Pptx => "Presentation",
        }
    }

    /// The unit kind this document type is built from
    pub fn unit_kind(&self) -> UnitKind {
        match self {
            DocumentType::Docx => UnitKind::Sections,
            DocumentType::Pptx => UnitKind::Slides,
        }
    }
}

impl Default for DocumentType {
    fn default() -> Self {
        DocumentType::Docx
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "docx" | "document" | "doc" => Ok(DocumentType::Docx),
            "pptx" | "presentation" | "slides" | "deck" => Ok(DocumentType::Pptx),
            other => Err(format!("Unknown document type: {}", other)),
        }
    }
}

/// The kind of content unit a structure is made of
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Sections,
    Slides,
}

impl UnitKind {
    /// Singular label used for default titles ("Section 3", "Slide 2")
    pub fn label(&self) -> &'static str {
        match self {
            UnitKind::Sections => "Section",
            UnitKind::Slides => "Slide",
        }
    }

    /// Plural form for messages
    pub fn plural(&self) -> &'static str {
        match self {
            UnitKind::Sections => "sections",
            UnitKind::Slides => "slides",
        }
    }

    /// Default title for the unit at a 1-based position
    pub fn default_title(&self, position: usize) -> String {
        format!("{} {}", self.label(), position)
    }

    /// Titles a fresh structure starts with
    pub fn starter_titles(&self) -> &'static [&'static str] {
        match self {
            UnitKind::Sections => &["Introduction", "Main Content", "Conclusion"],
            UnitKind::Slides => &["Introduction", "Main Points", "Conclusion"],
        }
    }
}

/// A titled entry in a structure that has not been generated yet.
///
/// Produced by the outline parser and owned by the structure editor. The
/// numeric id is local to the editor; generated units get their ids from the
/// document service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineEntry {
    pub id: u32,
    pub title: String,
}

impl OutlineEntry {
    pub fn new(id: u32, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
        }
    }
}

/// Opaque, stable identifier of a generated unit
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(String);

impl UnitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UnitId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for UnitId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u32> for UnitId {
    fn from(value: u32) -> Self {
        Self(value.to_string())
    }
}

/// Reader feedback on a generated unit. At most one value is stored per unit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Feedback {
    #[serde(rename = "like", alias = "positive")]
    Positive,
    #[serde(rename = "dislike", alias = "negative")]
    Negative,
}

impl Feedback {
    /// Value sent to the document service
    pub fn as_wire(&self) -> &'static str {
        match self {
            Feedback::Positive => "like",
            Feedback::Negative => "dislike",
        }
    }
}

impl FromStr for Feedback {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "like" | "positive" | "up" | "+" => Ok(Feedback::Positive),
            "dislike" | "negative" | "down" | "-" => Ok(Feedback::Negative),
            other => Err(format!("Unknown feedback value: {}", other)),
        }
    }
}

/// A generated section or slide
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// 0-based position reported by the service
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub feedback: Option<Feedback>,
    #[serde(default)]
    pub comments: Vec<String>,
}

impl Unit {
    pub fn new(id: impl Into<UnitId>, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            order: 0,
            feedback: None,
            comments: Vec::new(),
        }
    }

    /// Set the reported position
    pub fn with_order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }
}

/// A user's project as stored by the document service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub title: String,
    /// The prompt the project was created from
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", alias = "document_type")]
    pub document_type: DocumentType,
    /// Raw outline text the structure came from, if any
    #[serde(default)]
    pub outline: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user_id: Option<String>,
    /// Ordered working set. Filled from the content endpoint, not the project record.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub units: Vec<Unit>,
}

impl Project {
    /// The prompt the project was created from, falling back to the title
    pub fn prompt(&self) -> &str {
        if self.description.trim().is_empty() {
            &self.title
        } else {
            &self.description
        }
    }
}

/// Dashboard listing entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: String,
    pub title: String,
    #[serde(rename = "type", alias = "document_type")]
    pub document_type: DocumentType,
    pub created_at: DateTime<Utc>,
}

impl From<&Project> for ProjectSummary {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id.clone(),
            title: project.title.clone(),
            document_type: project.document_type,
            created_at: project.created_at,
        }
    }
}

/// Request sent when the confirmed structure is handed off for generation.
/// Only titles travel; unit content does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub document_type: DocumentType,
    pub titles: Vec<String>,
}

/// Result of a structured generation call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedDocument {
    pub project_id: String,
    pub units: Vec<Unit>,
}

/// Verified identity of the signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Derive a project title from the prompt (first 100 characters, trimmed)
pub fn derive_project_title(prompt: &str) -> String {
    prompt
        .trim()
        .chars()
        .take(PROJECT_TITLE_MAX_CHARS)
        .collect::<String>()
        .trim_end()
        .to_string()
}

/// Title shown above a preview: the first line of the prompt
pub fn preview_title(prompt: &str) -> String {
    prompt
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("Generated Document")
        .to_string()
}

/// Phase of a creation session
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowPhase {
    /// Prompt and document type entry
    Topic,
    /// Section / slide structure definition
    Structure,
    /// Structured generation issued
    Generating,
}

impl WorkflowPhase {
    /// Get all phases in order
    pub fn all() -> &'static [WorkflowPhase] {
        &[
            WorkflowPhase::Topic,
            WorkflowPhase::Structure,
            WorkflowPhase::Generating,
        ]
    }

    /// Get the display name for this phase
    pub fn display_name(&self) -> &'static str {
        match self {
            WorkflowPhase::Topic => "Topic & Format",
            WorkflowPhase::Structure => "Define Structure",
            WorkflowPhase::Generating => "Generate",
        }
    }

    /// Get the phase index (0-based)
    pub fn index(&self) -> usize {
        match self {
            WorkflowPhase::Topic => 0,
            WorkflowPhase::Structure => 1,
            WorkflowPhase::Generating => 2,
        }
    }
}

impl Default for WorkflowPhase {
    fn default() -> Self {
        WorkflowPhase::Topic
    }
}
