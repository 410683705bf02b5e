//! Audit entries the store appends on its own behalf.
use super::SYSTEM_USER;
use crate::document::{AuditAction, Document};
use chrono::Utc;

/// Copy of `document` as it should be persisted by `save`.
///
/// The copy carries a `created` entry when the document did not exist yet,
/// otherwise an `updated` entry and a fresh `updated_at`. Backends hand the
/// copy back to the caller only after the write succeeded.
pub(crate) fn stage_save(document: &Document, existed: bool) -> Document {
    let mut staged = document.clone();
    if existed {
        staged.metadata.updated_at = Utc::now();
        let user = staged.metadata.updated_user.clone();
        staged.record(AuditAction::Updated, user);
    } else {
        let user = staged.metadata.created_user.clone();
        staged.record(AuditAction::Created, user);
    }
    staged
}

/// Mark a freshly read copy as accessed.
pub(crate) fn record_access(document: &mut Document) {
    document.record(AuditAction::Accessed, SYSTEM_USER);
}
