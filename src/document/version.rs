use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form delta payload recorded with a version.
pub type Changes = Map<String, Value>;

/// An immutable, explicitly captured version record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentVersion {
    pub version: u32,
    pub timestamp: DateTime<Utc>,
    pub user: String,
    #[serde(default)]
    pub changes: Changes,
    #[serde(default)]
    pub commit_message: String,
}

impl DocumentVersion {
    #[must_use]
    pub fn new(
        version: u32,
        user: impl Into<String>,
        changes: Changes,
        commit_message: impl Into<String>,
    ) -> Self {
        Self {
            version,
            timestamp: Utc::now(),
            user: user.into(),
            changes,
            commit_message: commit_message.into(),
        }
    }

    /// Lightweight summary kept on the document itself.
    #[must_use]
    pub fn summary(&self) -> HistoryEntry {
        HistoryEntry {
            version: self.version,
            timestamp: self.timestamp,
            user: self.user.clone(),
            commit_message: self.commit_message.clone(),
        }
    }
}

/// Version-change summary attached to a document for quick inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub version: u32,
    pub timestamp: DateTime<Utc>,
    pub user: String,
    pub commit_message: String,
}
