use super::error::StorageError;
use super::health::HealthReport;
use super::query::ListQuery;
use super::StorageKind;
use crate::document::{Document, DocumentVersion, Metadata};
use async_trait::async_trait;

/// The storage contract shared by every backend.
///
/// Unknown ids are not errors for `load`, `delete`, `exists`, `get_versions`
/// and the file operations. Writes to the same document id are not
/// serialized: if two updates race, the last write observed by the backend
/// wins.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// The substrate this store runs on.
    fn kind(&self) -> StorageKind;

    /// Upsert a whole document by id.
    ///
    /// Appends a `created` audit entry on first save and `updated` afterwards
    /// to `document` before persisting it.
    async fn save(&self, document: &mut Document) -> Result<(), StorageError>;

    /// Fetch a document, or `None` when the id is unknown.
    ///
    /// The returned copy carries an `accessed` audit entry. The key-value
    /// backend also refreshes the document's expiry window.
    async fn load(&self, document_id: &str) -> Result<Option<Document>, StorageError>;

    /// Remove a document with its metadata index entry and version ledger.
    ///
    /// Returns `false` when nothing existed. Attachments are left alone.
    async fn delete(&self, document_id: &str) -> Result<bool, StorageError>;

    async fn exists(&self, document_id: &str) -> Result<bool, StorageError>;

    /// List metadata in the backend's deterministic order without reading
    /// document content.
    async fn list_documents(&self, query: &ListQuery) -> Result<Vec<Metadata>, StorageError>;

    /// Append a version to the document's ledger.
    ///
    /// Fails with `DocumentNotFound` when the parent is absent and with
    /// `InvalidInput` when the number does not increase the ledger.
    async fn save_version(
        &self,
        document_id: &str,
        version: DocumentVersion,
    ) -> Result<(), StorageError>;

    /// All captured versions in ascending order; empty for unknown ids.
    async fn get_versions(&self, document_id: &str) -> Result<Vec<DocumentVersion>, StorageError>;

    /// Reapply a captured version as a new forward version.
    async fn revert_to_version(
        &self,
        document_id: &str,
        version: u32,
        user: &str,
    ) -> Result<Document, StorageError>;

    async fn save_file(
        &self,
        document_id: &str,
        extension: &str,
        data: &[u8],
    ) -> Result<(), StorageError>;

    async fn get_file(
        &self,
        document_id: &str,
        extension: &str,
    ) -> Result<Option<Vec<u8>>, StorageError>;

    async fn delete_file(&self, document_id: &str, extension: &str) -> Result<bool, StorageError>;

    /// Backend diagnostics. Failures are reported in the status, not raised.
    async fn health_check(&self) -> HealthReport;

    /// Release the backend handle. Later operations fail.
    async fn close(&self) -> Result<(), StorageError>;
}
