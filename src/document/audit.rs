use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What happened to a document.
///
/// Serialized as a plain string: `created`, `accessed`, `updated`, `deleted`
/// or `reverted-from-N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum AuditAction {
    Created,
    Accessed,
    Updated,
    Deleted,
    RevertedFrom(u32),
}

const REVERTED_FROM_PREFIX: &str = "reverted-from-";

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditAction::Created => write!(f, "created"),
            AuditAction::Accessed => write!(f, "accessed"),
            AuditAction::Updated => write!(f, "updated"),
            AuditAction::Deleted => write!(f, "deleted"),
            AuditAction::RevertedFrom(n) => write!(f, "{REVERTED_FROM_PREFIX}{n}"),
        }
    }
}

impl std::str::FromStr for AuditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(AuditAction::Created),
            "accessed" => Ok(AuditAction::Accessed),
            "updated" => Ok(AuditAction::Updated),
            "deleted" => Ok(AuditAction::Deleted),
            other => other
                .strip_prefix(REVERTED_FROM_PREFIX)
                .and_then(|n| n.parse().ok())
                .map(AuditAction::RevertedFrom)
                .ok_or_else(|| format!("Unknown audit action: {s}")),
        }
    }
}

impl From<AuditAction> for String {
    fn from(action: AuditAction) -> Self {
        action.to_string()
    }
}

impl TryFrom<String> for AuditAction {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One append-only record of who did what to a document and when.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub action: AuditAction,
    pub user: String,
    pub timestamp: DateTime<Utc>,
}

impl AuditLogEntry {
    pub(crate) fn now(action: AuditAction, user: impl Into<String>) -> Self {
        Self {
            action,
            user: user.into(),
            timestamp: Utc::now(),
        }
    }
}
