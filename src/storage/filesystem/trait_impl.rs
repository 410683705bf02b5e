use super::io::{file_exists, read_bytes, remove_if_exists, write_json};
use super::FileSystemStore;
use crate::document::{Document, DocumentVersion, Metadata};
use crate::metrics::OperationTimer;
use crate::storage::audit::{record_access, stage_save};
use crate::storage::error::StorageError;
use crate::storage::health::HealthReport;
use crate::storage::query::ListQuery;
use crate::storage::validate::{normalize_extension, validate_document, validate_document_id};
use crate::storage::versioning::{append_version, apply_revert};
use crate::storage::{DocumentStore, StorageKind};
use crate::utils::atomic_write;
use async_trait::async_trait;
use std::sync::atomic::Ordering;
use tokio::fs;
use tracing::{debug, info};

#[async_trait]
impl DocumentStore for FileSystemStore {
    fn kind(&self) -> StorageKind {
        StorageKind::Filesystem
    }

    async fn save(&self, document: &mut Document) -> Result<(), StorageError> {
        let _timer = OperationTimer::new("fs.save");
        self.ensure_open()?;
        validate_document(document)?;
        let existed = file_exists(&self.layout.document_path(document.id())).await?;
        let staged = stage_save(document, existed);
        self.write_document(&staged, None).await?;
        *document = staged;
        info!(
            document_id = %document.id(),
            version = document.metadata.version,
            created = !existed,
            "Saved document"
        );
        Ok(())
    }

    async fn load(&self, document_id: &str) -> Result<Option<Document>, StorageError> {
        let _timer = OperationTimer::new("fs.load");
        self.ensure_open()?;
        validate_document_id(document_id)?;
        let Some(mut document) = self.read_document(document_id).await? else {
            debug!(document_id, "Document not found");
            return Ok(None);
        };
        record_access(&mut document);
        Ok(Some(document))
    }

    async fn delete(&self, document_id: &str) -> Result<bool, StorageError> {
        let _timer = OperationTimer::new("fs.delete");
        self.ensure_open()?;
        validate_document_id(document_id)?;
        let existed = file_exists(&self.layout.document_path(document_id)).await?;
        remove_if_exists(&self.layout.metadata_path(document_id)).await?;
        remove_if_exists(&self.layout.versions_path(document_id)).await?;
        remove_if_exists(&self.layout.document_path(document_id)).await?;
        if existed {
            info!(document_id, "Deleted document");
        }
        Ok(existed)
    }

    async fn exists(&self, document_id: &str) -> Result<bool, StorageError> {
        self.ensure_open()?;
        validate_document_id(document_id)?;
        file_exists(&self.layout.document_path(document_id)).await
    }

    async fn list_documents(&self, query: &ListQuery) -> Result<Vec<Metadata>, StorageError> {
        let _timer = OperationTimer::new("fs.list_documents");
        self.ensure_open()?;
        let index = self.read_index().await?;
        Ok(query.apply(index))
    }

    async fn save_version(
        &self,
        document_id: &str,
        version: DocumentVersion,
    ) -> Result<(), StorageError> {
        let _timer = OperationTimer::new("fs.save_version");
        self.ensure_open()?;
        validate_document_id(document_id)?;
        if !file_exists(&self.layout.document_path(document_id)).await? {
            return Err(StorageError::not_found(document_id));
        }
        let number = version.version;
        let mut ledger = self.read_ledger(document_id).await?;
        append_version(&mut ledger, version)?;
        write_json(&self.layout.versions_path(document_id), &ledger).await?;
        info!(document_id, version = number, "Captured document version");
        Ok(())
    }

    async fn get_versions(&self, document_id: &str) -> Result<Vec<DocumentVersion>, StorageError> {
        let _timer = OperationTimer::new("fs.get_versions");
        self.ensure_open()?;
        validate_document_id(document_id)?;
        self.read_ledger(document_id).await
    }

    async fn revert_to_version(
        &self,
        document_id: &str,
        version: u32,
        user: &str,
    ) -> Result<Document, StorageError> {
        let _timer = OperationTimer::new("fs.revert_to_version");
        self.ensure_open()?;
        validate_document_id(document_id)?;
        let mut document = self
            .read_document(document_id)
            .await?
            .ok_or_else(|| StorageError::not_found(document_id))?;
        let mut ledger = self.read_ledger(document_id).await?;
        let record = apply_revert(&mut document, &ledger, version, user)?;
        let new_version = record.version;
        append_version(&mut ledger, record)?;
        self.write_document(&document, Some(&ledger)).await?;
        info!(
            document_id,
            from_version = version,
            new_version,
            user,
            "Reverted document"
        );
        Ok(document)
    }

    async fn save_file(
        &self,
        document_id: &str,
        extension: &str,
        data: &[u8],
    ) -> Result<(), StorageError> {
        let _timer = OperationTimer::new("fs.save_file");
        self.ensure_open()?;
        validate_document_id(document_id)?;
        let extension = normalize_extension(extension)?;
        fs::create_dir_all(self.layout.files_dir()).await?;
        atomic_write(&self.layout.file_path(document_id, &extension), data).await?;
        debug!(document_id, %extension, size = data.len(), "Stored attachment");
        Ok(())
    }

    async fn get_file(
        &self,
        document_id: &str,
        extension: &str,
    ) -> Result<Option<Vec<u8>>, StorageError> {
        let _timer = OperationTimer::new("fs.get_file");
        self.ensure_open()?;
        validate_document_id(document_id)?;
        let extension = normalize_extension(extension)?;
        read_bytes(&self.layout.file_path(document_id, &extension)).await
    }

    async fn delete_file(&self, document_id: &str, extension: &str) -> Result<bool, StorageError> {
        let _timer = OperationTimer::new("fs.delete_file");
        self.ensure_open()?;
        validate_document_id(document_id)?;
        let extension = normalize_extension(extension)?;
        remove_if_exists(&self.layout.file_path(document_id, &extension)).await
    }

    async fn health_check(&self) -> HealthReport {
        super::health::check(self).await
    }

    async fn close(&self) -> Result<(), StorageError> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            info!(root = %self.layout.root().display(), "Closed filesystem document store");
        }
        Ok(())
    }
}
