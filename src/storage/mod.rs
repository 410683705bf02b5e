//! Backend-agnostic versioned document storage.
//!
//! [`DocumentStore`] is the contract every backend implements identically.
//! [`open_store`] builds the configured backend and hands back an explicit
//! [`StoreHandle`] for callers to share.

mod audit;
mod contract;
mod error;
mod ext;
mod factory;
pub mod filesystem;
mod health;
pub mod kv;
mod query;
mod validate;
pub mod versioning;

pub use contract::DocumentStore;
pub use error::{ErrorKind, StorageError};
pub use ext::DocumentStoreExt;
pub use factory::{open_store, StoreHandle};
pub use filesystem::FileSystemStore;
pub use health::{HealthReport, HealthStatus};
pub use kv::{KeyValueStore, KvClient, MemoryKv, RedisKv};
pub use query::{ListQuery, DEFAULT_LIST_LIMIT};
pub use validate::{normalize_extension, validate_document, validate_document_id, MAX_ID_LEN};

use serde::{Deserialize, Serialize};

/// Actor recorded on audit entries the store writes on its own behalf.
pub const SYSTEM_USER: &str = "system";

/// Which physical substrate a store runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    #[default]
    Filesystem,
    KeyValue,
}

impl std::fmt::Display for StorageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageKind::Filesystem => write!(f, "filesystem"),
            StorageKind::KeyValue => write!(f, "key_value"),
        }
    }
}

impl std::str::FromStr for StorageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "filesystem" | "fs" | "file" => Ok(StorageKind::Filesystem),
            "key_value" | "key-value" | "kv" => Ok(StorageKind::KeyValue),
            _ => Err(format!("Unknown storage backend: {s}")),
        }
    }
}
