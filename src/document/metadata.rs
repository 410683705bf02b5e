use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of source a document was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Pdf,
    Markdown,
    Json,
    Text,
    Webpage,
    Youtube,
    Podcast,
    Audio,
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DocumentType::Pdf => "pdf",
            DocumentType::Markdown => "markdown",
            DocumentType::Json => "json",
            DocumentType::Text => "text",
            DocumentType::Webpage => "webpage",
            DocumentType::Youtube => "youtube",
            DocumentType::Podcast => "podcast",
            DocumentType::Audio => "audio",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pdf" => Ok(DocumentType::Pdf),
            "markdown" | "md" => Ok(DocumentType::Markdown),
            "json" => Ok(DocumentType::Json),
            "text" | "txt" => Ok(DocumentType::Text),
            "webpage" | "web" => Ok(DocumentType::Webpage),
            "youtube" => Ok(DocumentType::Youtube),
            "podcast" => Ok(DocumentType::Podcast),
            "audio" => Ok(DocumentType::Audio),
            _ => Err(format!("Unknown document type: {s}")),
        }
    }
}

/// Where a document sits in the external extraction pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStage {
    #[default]
    Pending,
    Extracting,
    Processing,
    Complete,
    Failed,
}

/// Descriptive fields of a document, also used as its list-index entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    document_id: String,
    pub document_type: DocumentType,
    pub name: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_user: String,
    pub updated_user: String,
    /// Highest captured version number. Starts at 1.
    pub version: u32,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub processing_stage: ProcessingStage,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Metadata {
    /// Create metadata for a new document with a freshly generated id.
    #[must_use]
    pub fn new(document_type: DocumentType, name: impl Into<String>, user: impl Into<String>) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), document_type, name, user)
    }

    /// Create metadata with a caller-chosen id.
    #[must_use]
    pub fn with_id(
        document_id: impl Into<String>,
        document_type: DocumentType,
        name: impl Into<String>,
        user: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        let user = user.into();
        Self {
            document_id: document_id.into(),
            document_type,
            name: name.into(),
            summary: None,
            tags: Vec::new(),
            created_user: user.clone(),
            updated_user: user,
            version: 1,
            file_size: None,
            mime_type: None,
            source_url: None,
            processing_stage: ProcessingStage::default(),
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn document_id(&self) -> &str {
        &self.document_id
    }
}
