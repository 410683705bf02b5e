use super::client::KvBatch;
use super::KeyValueStore;
use crate::document::{Document, DocumentVersion, Metadata};
use crate::metrics::OperationTimer;
use crate::storage::audit::{record_access, stage_save};
use crate::storage::error::StorageError;
use crate::storage::health::{HealthReport, HealthStatus};
use crate::storage::query::ListQuery;
use crate::storage::validate::{normalize_extension, validate_document, validate_document_id};
use crate::storage::versioning::{append_version, apply_revert};
use crate::storage::{DocumentStore, StorageKind};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tracing::{debug, info, warn};

#[async_trait]
impl DocumentStore for KeyValueStore {
    fn kind(&self) -> StorageKind {
        StorageKind::KeyValue
    }

    async fn save(&self, document: &mut Document) -> Result<(), StorageError> {
        let _timer = OperationTimer::new("kv.save");
        validate_document(document)?;
        let existed = self.document_exists(document.id()).await?;
        let staged = stage_save(document, existed);
        let batch = self.write_document(KvBatch::new(), &staged)?;
        let batch = batch.expire(self.keys.versions(staged.id()), self.config.ttl);
        self.exec(batch).await?;
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
        let _timer = OperationTimer::new("kv.load");
        validate_document_id(document_id)?;
        let Some(mut document) = self.read_document(document_id).await? else {
            debug!(document_id, "Document not found");
            return Ok(None);
        };
        self.exec(self.refresh(KvBatch::new(), document_id)).await?;
        record_access(&mut document);
        Ok(Some(document))
    }

    async fn delete(&self, document_id: &str) -> Result<bool, StorageError> {
        let _timer = OperationTimer::new("kv.delete");
        validate_document_id(document_id)?;
        let existed = self.document_exists(document_id).await?;
        let batch = self
            .keys
            .document_keys(document_id)
            .into_iter()
            .fold(KvBatch::new(), KvBatch::delete);
        self.exec(batch).await?;
        if existed {
            info!(document_id, "Deleted document");
        }
        Ok(existed)
    }

    async fn exists(&self, document_id: &str) -> Result<bool, StorageError> {
        validate_document_id(document_id)?;
        self.document_exists(document_id).await
    }

    async fn list_documents(&self, query: &ListQuery) -> Result<Vec<Metadata>, StorageError> {
        let _timer = OperationTimer::new("kv.list_documents");
        let prefix = self.keys.metadata_scan_prefix();
        let keys = self.call(self.client.scan_prefix(&prefix)).await?;
        let values = self.call(self.client.get_many(&keys)).await?;

        let mut index = Vec::with_capacity(values.len());
        for (key, raw) in keys.iter().zip(values) {
            // Expired between the scan and the read.
            let Some(raw) = raw else { continue };
            match serde_json::from_str::<Metadata>(&raw) {
                Ok(metadata) => index.push(metadata),
                Err(e) => warn!(%key, "Skipping unreadable metadata entry: {e}"),
            }
        }
        Ok(query.apply(index))
    }

    async fn save_version(
        &self,
        document_id: &str,
        version: DocumentVersion,
    ) -> Result<(), StorageError> {
        let _timer = OperationTimer::new("kv.save_version");
        validate_document_id(document_id)?;
        if !self.document_exists(document_id).await? {
            return Err(StorageError::not_found(document_id));
        }
        let number = version.version;
        let mut ledger = self.read_ledger(document_id).await?;
        append_version(&mut ledger, version)?;
        let batch = self.refresh(KvBatch::new(), document_id);
        let batch = self.write_ledger(batch, document_id, &ledger)?;
        self.exec(batch).await?;
        info!(document_id, version = number, "Captured document version");
        Ok(())
    }

    async fn get_versions(&self, document_id: &str) -> Result<Vec<DocumentVersion>, StorageError> {
        let _timer = OperationTimer::new("kv.get_versions");
        validate_document_id(document_id)?;
        let ledger = self.read_ledger(document_id).await?;
        if !ledger.is_empty() {
            self.exec(self.refresh(KvBatch::new(), document_id)).await?;
        }
        Ok(ledger)
    }

    async fn revert_to_version(
        &self,
        document_id: &str,
        version: u32,
        user: &str,
    ) -> Result<Document, StorageError> {
        let _timer = OperationTimer::new("kv.revert_to_version");
        validate_document_id(document_id)?;
        let mut document = self
            .read_document(document_id)
            .await?
            .ok_or_else(|| StorageError::not_found(document_id))?;
        let mut ledger = self.read_ledger(document_id).await?;
        let record = apply_revert(&mut document, &ledger, version, user)?;
        let new_version = record.version;
        append_version(&mut ledger, record)?;

        let batch = self.write_document(KvBatch::new(), &document)?;
        let batch = self.write_ledger(batch, document_id, &ledger)?;
        self.exec(batch).await?;
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
        let _timer = OperationTimer::new("kv.save_file");
        validate_document_id(document_id)?;
        let extension = normalize_extension(extension)?;
        if data.len() > self.config.max_file_size {
            warn!(
                document_id,
                size = data.len(),
                limit = self.config.max_file_size,
                "Rejected oversized attachment"
            );
            return Err(StorageError::LimitExceeded {
                what: format!("attachment {document_id}{extension}"),
                size: data.len(),
                limit: self.config.max_file_size,
            });
        }
        let encoded = STANDARD.encode(data);
        let batch = KvBatch::new().set(
            self.keys.file(document_id, &extension),
            encoded,
            self.config.ttl,
        );
        self.exec(batch).await?;
        debug!(document_id, %extension, size = data.len(), "Stored attachment");
        Ok(())
    }

    async fn get_file(
        &self,
        document_id: &str,
        extension: &str,
    ) -> Result<Option<Vec<u8>>, StorageError> {
        let _timer = OperationTimer::new("kv.get_file");
        validate_document_id(document_id)?;
        let extension = normalize_extension(extension)?;
        let key = self.keys.file(document_id, &extension);
        let Some(encoded) = self.call(self.client.get(&key)).await? else {
            return Ok(None);
        };
        let data = STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| StorageError::backend(format!("corrupt attachment {key}: {e}")))?;
        self.exec(KvBatch::new().expire(key, self.config.ttl)).await?;
        Ok(Some(data))
    }

    async fn delete_file(&self, document_id: &str, extension: &str) -> Result<bool, StorageError> {
        let _timer = OperationTimer::new("kv.delete_file");
        validate_document_id(document_id)?;
        let extension = normalize_extension(extension)?;
        let key = self.keys.file(document_id, &extension);
        let existed = self.call(self.client.exists(&key)).await?;
        self.exec(KvBatch::new().delete(key)).await?;
        Ok(existed)
    }

    async fn health_check(&self) -> HealthReport {
        let mut report = HealthReport::new(HealthStatus::Healthy, StorageKind::KeyValue)
            .with_detail("prefix", self.keys.prefix())
            .with_detail("ttl_secs", self.config.ttl.as_secs());

        if let Err(e) = self.call(self.client.ping()).await {
            warn!("Key-value health ping failed: {e}");
            report.downgrade(HealthStatus::Unhealthy);
            return report
                .with_detail("connected", false)
                .with_detail("error", e.to_string());
        }
        report = report.with_detail("connected", true);

        match self.call(self.client.info()).await {
            Ok(info) => {
                report = report
                    .with_detail("used_memory_bytes", info.used_memory_bytes)
                    .with_detail("key_count", info.key_count);
                if let Some(max) = info.max_memory_bytes {
                    report = report.with_detail("max_memory_bytes", max);
                    if near_capacity(info.used_memory_bytes, max) {
                        report.downgrade(HealthStatus::Degraded);
                    }
                }
            }
            Err(e) => {
                warn!("Key-value info query failed: {e}");
                report.downgrade(HealthStatus::Degraded);
            }
        }
        report
    }

    async fn close(&self) -> Result<(), StorageError> {
        self.call(self.client.close()).await?;
        info!(prefix = %self.keys.prefix(), "Closed key-value document store");
        Ok(())
    }
}

/// At or above 90% of the memory ceiling.
fn near_capacity(used: u64, max: u64) -> bool {
    used.saturating_mul(10) >= max.saturating_mul(9)
}
