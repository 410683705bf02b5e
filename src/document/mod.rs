//! Document model: the persisted unit and its version and audit records.
//!
//! A [`Document`] is plain data. Its audit log and history are readable by
//! anyone but only the store appends to them.

mod audit;
mod content;
mod metadata;
mod version;

pub use audit::{AuditAction, AuditLogEntry};
pub use content::Content;
pub use metadata::{DocumentType, Metadata, ProcessingStage};
pub use version::{Changes, DocumentVersion, HistoryEntry};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata fields a recorded version may never overwrite.
pub const PROTECTED_METADATA_FIELDS: &[&str] = &[
    "document_id",
    "version",
    "created_user",
    "updated_user",
    "created_at",
    "updated_at",
];

/// A stored document: metadata, content, audit trail and version history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub metadata: Metadata,
    pub content: Content,
    #[serde(default)]
    audit_log: Vec<AuditLogEntry>,
    #[serde(default)]
    history: Vec<HistoryEntry>,
}

impl Document {
    #[must_use]
    pub fn new(metadata: Metadata, content: Content) -> Self {
        Self {
            metadata,
            content,
            audit_log: Vec::new(),
            history: Vec::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        self.metadata.document_id()
    }

    #[must_use]
    pub fn audit_log(&self) -> &[AuditLogEntry] {
        &self.audit_log
    }

    #[must_use]
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub(crate) fn record(&mut self, action: AuditAction, user: impl Into<String>) {
        self.audit_log.push(AuditLogEntry::now(action, user));
    }

    pub(crate) fn push_history(&mut self, entry: HistoryEntry) {
        self.history.push(entry);
    }

    /// Capture the revertible state of this document as a `changes` payload:
    /// `{"metadata": {...}, "content": {...}}` without the protected fields.
    pub fn snapshot(&self) -> serde_json::Result<Changes> {
        let mut metadata = match serde_json::to_value(&self.metadata)? {
            Value::Object(map) => map,
            _ => Changes::new(),
        };
        for field in PROTECTED_METADATA_FIELDS {
            metadata.remove(*field);
        }
        let content = serde_json::to_value(&self.content)?;
        let mut changes = Changes::new();
        changes.insert("metadata".to_string(), Value::Object(metadata));
        changes.insert("content".to_string(), content);
        Ok(changes)
    }
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod document_tests;
