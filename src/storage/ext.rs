use super::contract::DocumentStore;
use super::error::StorageError;
use super::versioning::next_version;
use crate::document::{Changes, Document, DocumentVersion};
use async_trait::async_trait;
use chrono::Utc;

/// Save-then-capture workflows built on the storage contract.
///
/// Implemented for every [`DocumentStore`], including `dyn DocumentStore`.
#[async_trait]
pub trait DocumentStoreExt: DocumentStore {
    /// Save a new document and capture its current state as the first
    /// version, so it can be reverted to later.
    async fn create_document(
        &self,
        document: &mut Document,
        commit_message: &str,
    ) -> Result<DocumentVersion, StorageError> {
        let version = DocumentVersion::new(
            document.metadata.version,
            document.metadata.created_user.clone(),
            document.snapshot()?,
            commit_message,
        );
        document.push_history(version.summary());
        self.save(document).await?;
        self.save_version(document.id(), version.clone()).await?;
        Ok(version)
    }

    /// Persist caller edits under the next version number and record the
    /// caller-described `changes`.
    async fn commit_update(
        &self,
        document: &mut Document,
        user: &str,
        changes: Changes,
        commit_message: &str,
    ) -> Result<DocumentVersion, StorageError> {
        let ledger = self.get_versions(document.id()).await?;
        let number = next_version(&ledger, document.metadata.version)?;
        document.metadata.version = number;
        document.metadata.updated_user = user.to_string();
        document.metadata.updated_at = Utc::now();

        let version = DocumentVersion::new(number, user, changes, commit_message);
        document.push_history(version.summary());
        self.save(document).await?;
        self.save_version(document.id(), version.clone()).await?;
        Ok(version)
    }
}

impl<T: DocumentStore + ?Sized> DocumentStoreExt for T {}
