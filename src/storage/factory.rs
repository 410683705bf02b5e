use super::contract::DocumentStore;
use super::error::StorageError;
use super::filesystem::FileSystemStore;
use super::kv::{connect_client, KeyValueStore};
use super::StorageKind;
use crate::config::StoreConfig;
use std::sync::Arc;
use tracing::info;

/// Shared handle to an open store. Clone it into every consumer.
pub type StoreHandle = Arc<dyn DocumentStore>;

/// Open the backend selected by `config`.
///
/// The key-value substrate comes from `config.key_value.url`; use
/// [`KeyValueStore::connect`] directly to plug in another [`KvClient`](super::KvClient).
pub async fn open_store(config: &StoreConfig) -> Result<StoreHandle, StorageError> {
    info!(backend = %config.backend, "Opening document store");
    match config.backend {
        StorageKind::Filesystem => {
            let store = FileSystemStore::open(config.filesystem.clone()).await?;
            Ok(Arc::new(store))
        }
        StorageKind::KeyValue => {
            let client = connect_client(&config.key_value).await?;
            let store = KeyValueStore::connect(client, config.key_value.clone()).await?;
            Ok(Arc::new(store))
        }
    }
}
