//! Substrate seam for the key-value backend.
//!
//! A [`KvClient`] is a thin async connection to a key-value service with
//! per-key expiry and an atomic multi-key batch. [`MemoryKv`](super::MemoryKv)
//! is the in-process implementation.

use crate::storage::error::StorageError;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KvError {
    #[error("connection closed")]
    Closed,
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("command failed: {0}")]
    Command(String),
}

impl From<KvError> for StorageError {
    fn from(err: KvError) -> Self {
        match err {
            KvError::Closed => StorageError::Connection("key-value connection closed".to_string()),
            KvError::Connection(msg) => StorageError::Connection(msg),
            KvError::Command(msg) => StorageError::Backend(msg),
        }
    }
}

/// One write inside a [`KvBatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KvOp {
    Set {
        key: String,
        value: String,
        ttl: Option<Duration>,
    },
    /// Reset the expiry of an existing key. No-op for missing keys.
    Expire { key: String, ttl: Duration },
    Delete { key: String },
}

/// Writes applied all-or-nothing by [`KvClient::exec`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KvBatch {
    ops: Vec<KvOp>,
}

impl KvBatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>, ttl: Duration) -> Self {
        self.ops.push(KvOp::Set {
            key: key.into(),
            value: value.into(),
            ttl: Some(ttl),
        });
        self
    }

    #[must_use]
    pub fn expire(mut self, key: impl Into<String>, ttl: Duration) -> Self {
        self.ops.push(KvOp::Expire {
            key: key.into(),
            ttl,
        });
        self
    }

    #[must_use]
    pub fn delete(mut self, key: impl Into<String>) -> Self {
        self.ops.push(KvOp::Delete { key: key.into() });
        self
    }

    #[must_use]
    pub fn ops(&self) -> &[KvOp] {
        &self.ops
    }

    #[must_use]
    pub fn into_ops(self) -> Vec<KvOp> {
        self.ops
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Server-side statistics reported to health checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KvInfo {
    pub used_memory_bytes: u64,
    pub max_memory_bytes: Option<u64>,
    pub key_count: u64,
}

#[async_trait]
pub trait KvClient: Send + Sync {
    async fn ping(&self) -> Result<(), KvError>;

    async fn get(&self, key: &str) -> Result<Option<String>, KvError>;

    /// Values for `keys`, position for position.
    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>, KvError>;

    async fn exists(&self, key: &str) -> Result<bool, KvError>;

    /// Remaining time to live; `None` for missing keys and keys without
    /// expiry.
    async fn ttl(&self, key: &str) -> Result<Option<Duration>, KvError>;

    /// Live keys starting with `prefix`, in the substrate's scan order.
    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, KvError>;

    /// Apply every op in `batch` atomically.
    async fn exec(&self, batch: KvBatch) -> Result<(), KvError>;

    async fn info(&self) -> Result<KvInfo, KvError>;

    /// Release the connection. Every later call returns [`KvError::Closed`].
    async fn close(&self) -> Result<(), KvError>;
}
