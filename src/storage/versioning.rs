//! Backend-independent version capture and revert rules.
//!
//! Versions only move forward: a revert reapplies an old version's recorded
//! changes and stamps the result with a new number. Nothing in a ledger is
//! ever removed or renumbered.

use super::error::StorageError;
use crate::document::{
    AuditAction, Changes, Document, DocumentVersion, PROTECTED_METADATA_FIELDS,
};
use chrono::Utc;
use serde_json::{json, Map, Value};

pub const REVERTED_ACTION: &str = "reverted";

/// Highest version number captured in a ledger.
#[must_use]
pub fn latest_version(ledger: &[DocumentVersion]) -> Option<u32> {
    ledger.iter().map(|v| v.version).max()
}

/// The number the next captured version gets.
pub fn next_version(ledger: &[DocumentVersion], live_version: u32) -> Result<u32, StorageError> {
    latest_version(ledger)
        .unwrap_or(0)
        .max(live_version)
        .checked_add(1)
        .ok_or_else(|| StorageError::backend("Version counter overflow"))
}

/// Append a version, keeping the ledger strictly increasing.
pub fn append_version(
    ledger: &mut Vec<DocumentVersion>,
    version: DocumentVersion,
) -> Result<(), StorageError> {
    if version.version == 0 {
        return Err(StorageError::invalid("Version numbers start at 1"));
    }
    if let Some(latest) = latest_version(ledger) {
        if version.version <= latest {
            return Err(StorageError::invalid(format!(
                "Version {} is not greater than the latest captured version {latest}",
                version.version
            )));
        }
    }
    ledger.push(version);
    Ok(())
}

/// Sort a ledger read from storage into ascending version order.
pub fn sort_ledger(ledger: &mut [DocumentVersion]) {
    ledger.sort_by_key(|v| v.version);
}

/// Find the version whose recorded changes a revert to `version` restores.
///
/// A revert record only names the version it came from, so reverting to it
/// follows that link back to the version that holds the actual state.
fn resolve_target<'a>(
    ledger: &'a [DocumentVersion],
    document_id: &str,
    version: u32,
) -> Result<&'a DocumentVersion, StorageError> {
    let find = move |n: u32| ledger.iter().find(|v| v.version == n);
    let mut target = find(version).ok_or_else(|| StorageError::VersionNotFound {
        document_id: document_id.to_string(),
        version,
    })?;
    for _ in 0..ledger.len() {
        let from = target
            .changes
            .get("from_version")
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok());
        let is_revert = target.changes.get("action").and_then(Value::as_str)
            == Some(REVERTED_ACTION);
        match (is_revert, from.and_then(find)) {
            (true, Some(origin)) => target = origin,
            _ => break,
        }
    }
    Ok(target)
}

fn merge_fields(target: &mut Map<String, Value>, fields: &Map<String, Value>, protected: &[&str]) {
    for (key, value) in fields {
        if protected.contains(&key.as_str()) {
            continue;
        }
        target.insert(key.clone(), value.clone());
    }
}

/// Overlay recorded `changes` onto a document.
///
/// `metadata` and `content` objects are merged field by field. Any other key
/// that names a metadata or content field is applied to that field. Unknown
/// keys are descriptive and ignored. The document is untouched on error.
pub fn apply_changes(document: &mut Document, changes: &Changes) -> Result<(), StorageError> {
    let mut metadata = as_object(serde_json::to_value(&document.metadata)?);
    let mut content = as_object(serde_json::to_value(&document.content)?);

    for (key, value) in changes {
        match (key.as_str(), value) {
            ("metadata", Value::Object(fields)) => {
                merge_fields(&mut metadata, fields, PROTECTED_METADATA_FIELDS);
            }
            ("content", Value::Object(fields)) => merge_fields(&mut content, fields, &[]),
            (field, _) if PROTECTED_METADATA_FIELDS.contains(&field) => {}
            (field, _) if metadata.contains_key(field) => {
                metadata.insert(key.clone(), value.clone());
            }
            (field, _) if content.contains_key(field) => {
                content.insert(key.clone(), value.clone());
            }
            _ => {}
        }
    }

    let metadata = serde_json::from_value(Value::Object(metadata))?;
    let content = serde_json::from_value(Value::Object(content))?;
    document.metadata = metadata;
    document.content = content;
    Ok(())
}

fn as_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Revert `document` to `version` in memory and return the new version
/// record to append to the ledger.
///
/// The caller persists both. The document gets number `max + 1`, a
/// `reverted-from-N` audit entry and a history summary.
pub fn apply_revert(
    document: &mut Document,
    ledger: &[DocumentVersion],
    version: u32,
    user: &str,
) -> Result<DocumentVersion, StorageError> {
    let target = resolve_target(ledger, document.id(), version)?;
    let new_version = next_version(ledger, document.metadata.version)?;
    apply_changes(document, &target.changes)?;

    document.metadata.version = new_version;
    document.metadata.updated_user = user.to_string();
    document.metadata.updated_at = Utc::now();

    let mut changes = Changes::new();
    changes.insert("action".to_string(), json!(REVERTED_ACTION));
    changes.insert("from_version".to_string(), json!(version));
    let record = DocumentVersion::new(
        new_version,
        user,
        changes,
        format!("Reverted to version {version}"),
    );

    document.record(AuditAction::RevertedFrom(version), user);
    document.push_history(record.summary());
    Ok(record)
}

#[cfg(test)]
#[path = "versioning_tests.rs"]
mod versioning_tests;
