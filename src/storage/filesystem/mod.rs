//! Filesystem backend: one JSON file per document, a separate metadata
//! index file per document for listing, and one version ledger per document.
//!
//! Each file is replaced atomically. Concurrent writers to the same id are
//! not serialized; the last rename wins.

mod health;
mod io;
mod layout;
mod trait_impl;

pub use layout::Layout;

use self::io::{encode_json, read_json, write_all_or_restore};
use super::error::StorageError;
use super::versioning::sort_ledger;
use crate::config::FilesystemConfig;
use crate::document::{Document, DocumentVersion, Metadata};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::fs;
use tracing::{info, warn};

/// Document store rooted at a directory.
#[derive(Debug)]
pub struct FileSystemStore {
    layout: Layout,
    config: FilesystemConfig,
    closed: AtomicBool,
}

impl FileSystemStore {
    /// Open (and create if needed) a store at `config.root`.
    pub async fn open(config: FilesystemConfig) -> Result<Self, StorageError> {
        let layout = Layout::new(&config.root);
        for dir in layout.eager_dirs() {
            fs::create_dir_all(&dir).await?;
        }
        info!(root = %layout.root().display(), "Opened filesystem document store");
        Ok(Self {
            layout,
            config,
            closed: AtomicBool::new(false),
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        self.layout.root()
    }

    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    fn ensure_open(&self) -> Result<(), StorageError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StorageError::Connection(
                "filesystem store is closed".to_string(),
            ));
        }
        Ok(())
    }

    async fn read_document(&self, document_id: &str) -> Result<Option<Document>, StorageError> {
        read_json(&self.layout.document_path(document_id)).await
    }

    async fn read_ledger(&self, document_id: &str) -> Result<Vec<DocumentVersion>, StorageError> {
        let mut ledger: Vec<DocumentVersion> = read_json(&self.layout.versions_path(document_id))
            .await?
            .unwrap_or_default();
        sort_ledger(&mut ledger);
        Ok(ledger)
    }

    /// Body first, then the index entry, so a listed document always has a
    /// readable body. When `ledger` is given it is written last. A failure at
    /// any step restores the files already written.
    async fn write_document(
        &self,
        document: &Document,
        ledger: Option<&[DocumentVersion]>,
    ) -> Result<(), StorageError> {
        let id = document.id();
        let mut files = vec![
            (self.layout.document_path(id), encode_json(document)?),
            (self.layout.metadata_path(id), encode_json(&document.metadata)?),
        ];
        if let Some(ledger) = ledger {
            files.push((self.layout.versions_path(id), encode_json(&ledger)?));
        }
        write_all_or_restore(files).await
    }

    /// All metadata index entries in insertion order (`created_at`, then id).
    async fn read_index(&self) -> Result<Vec<Metadata>, StorageError> {
        let mut entries = fs::read_dir(self.layout.metadata_dir()).await?;
        let mut index = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();
            if !Layout::is_metadata_file(&file_name) {
                continue;
            }
            match read_json::<Metadata>(&entry.path()).await {
                Ok(Some(metadata)) => index.push(metadata),
                Ok(None) => {}
                Err(e) => warn!(file = %file_name, "Skipping unreadable metadata entry: {e}"),
            }
        }
        index.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.document_id().cmp(b.document_id()))
        });
        Ok(index)
    }
}
