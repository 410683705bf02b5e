//! Key-value backend: one namespaced key each for the document body, its
//! version ledger and its list-index entry, plus one key per attachment.
//!
//! Every key carries the configured TTL, and reads refresh it. Writes that
//! touch more than one key go through a single atomic [`KvBatch`].

mod client;
mod keys;
mod memory;
mod redis;
mod trait_impl;

pub use self::redis::RedisKv;
pub use client::{KvBatch, KvClient, KvError, KvInfo, KvOp};
pub use keys::KeySchema;
pub use memory::MemoryKv;

use super::error::StorageError;
use super::versioning::sort_ledger;
use crate::config::KeyValueConfig;
use crate::document::{Document, DocumentVersion};
use std::future::Future;
use std::sync::Arc;
use tracing::{info, warn};

/// `url` scheme that selects the in-process [`MemoryKv`].
pub const MEMORY_URL: &str = "memory://";

/// Open the substrate named by `config.url`: [`MEMORY_URL`] for an
/// in-process [`MemoryKv`] capped at `config.max_memory_bytes`, anything
/// else is a Redis URL.
pub async fn connect_client(config: &KeyValueConfig) -> Result<Arc<dyn KvClient>, StorageError> {
    if config.url.starts_with(MEMORY_URL) {
        return Ok(Arc::new(MemoryKv::with_max_memory(config.max_memory_bytes)));
    }
    match tokio::time::timeout(config.timeout, RedisKv::connect(&config.url)).await {
        Ok(Ok(client)) => Ok(Arc::new(client)),
        Ok(Err(e)) => Err(StorageError::Connection(format!(
            "key-value substrate unreachable: {e}"
        ))),
        Err(_) => {
            warn!(timeout = ?config.timeout, "Timed out connecting to key-value substrate");
            Err(StorageError::Timeout(config.timeout))
        }
    }
}

/// Document store on top of a [`KvClient`].
pub struct KeyValueStore {
    client: Arc<dyn KvClient>,
    config: KeyValueConfig,
    keys: KeySchema,
}

impl std::fmt::Debug for KeyValueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyValueStore")
            .field("prefix", &self.keys.prefix())
            .field("ttl", &self.config.ttl)
            .field("timeout", &self.config.timeout)
            .finish_non_exhaustive()
    }
}

impl KeyValueStore {
    /// Wrap `client` and verify it answers within the configured timeout.
    pub async fn connect(
        client: Arc<dyn KvClient>,
        config: KeyValueConfig,
    ) -> Result<Self, StorageError> {
        let store = Self {
            keys: KeySchema::new(config.prefix.clone()),
            client,
            config,
        };
        match store.call(store.client.ping()).await {
            Ok(()) => {}
            Err(StorageError::Timeout(after)) => return Err(StorageError::Timeout(after)),
            Err(e) => {
                return Err(StorageError::Connection(format!(
                    "key-value substrate unreachable: {e}"
                )))
            }
        }
        info!(prefix = %store.keys.prefix(), "Connected key-value document store");
        Ok(store)
    }

    #[must_use]
    pub fn keys(&self) -> &KeySchema {
        &self.keys
    }

    #[must_use]
    pub fn config(&self) -> &KeyValueConfig {
        &self.config
    }

    /// Run one substrate call under the configured timeout.
    async fn call<T, F>(&self, fut: F) -> Result<T, StorageError>
    where
        F: Future<Output = Result<T, KvError>> + Send,
    {
        match tokio::time::timeout(self.config.timeout, fut).await {
            Ok(result) => result.map_err(StorageError::from),
            Err(_) => {
                warn!(timeout = ?self.config.timeout, "Key-value call timed out");
                Err(StorageError::Timeout(self.config.timeout))
            }
        }
    }

    async fn read_document(&self, document_id: &str) -> Result<Option<Document>, StorageError> {
        let raw = self
            .call(self.client.get(&self.keys.document(document_id)))
            .await?;
        raw.map(|raw| serde_json::from_str(&raw))
            .transpose()
            .map_err(StorageError::from)
    }

    async fn read_ledger(&self, document_id: &str) -> Result<Vec<DocumentVersion>, StorageError> {
        let raw = self
            .call(self.client.get(&self.keys.versions(document_id)))
            .await?;
        let mut ledger: Vec<DocumentVersion> = match raw {
            Some(raw) => serde_json::from_str(&raw)?,
            None => Vec::new(),
        };
        sort_ledger(&mut ledger);
        Ok(ledger)
    }

    async fn document_exists(&self, document_id: &str) -> Result<bool, StorageError> {
        self.call(self.client.exists(&self.keys.document(document_id)))
            .await
    }

    /// Append writes of the body and its list-index entry to `batch`.
    fn write_document(&self, batch: KvBatch, document: &Document) -> Result<KvBatch, StorageError> {
        let body = serde_json::to_string(document)?;
        let metadata = serde_json::to_string(&document.metadata)?;
        Ok(batch
            .set(self.keys.document(document.id()), body, self.config.ttl)
            .set(self.keys.metadata(document.id()), metadata, self.config.ttl))
    }

    fn write_ledger(
        &self,
        batch: KvBatch,
        document_id: &str,
        ledger: &[DocumentVersion],
    ) -> Result<KvBatch, StorageError> {
        let raw = serde_json::to_string(ledger)?;
        Ok(batch.set(self.keys.versions(document_id), raw, self.config.ttl))
    }

    /// Reset the TTL of every key belonging to `document_id`.
    fn refresh(&self, batch: KvBatch, document_id: &str) -> KvBatch {
        self.keys
            .document_keys(document_id)
            .into_iter()
            .fold(batch, |batch, key| batch.expire(key, self.config.ttl))
    }

    async fn exec(&self, batch: KvBatch) -> Result<(), StorageError> {
        self.call(self.client.exec(batch)).await
    }
}
