use crate::storage::error::StorageError;
use crate::utils::atomic_write;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::warn;

/// Read and parse a JSON file. Returns `None` if the file doesn't exist.
pub async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StorageError> {
    let content = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_slice(&content)?))
}

/// Serialize to pretty JSON and replace the file atomically.
pub async fn write_json<T: Serialize + Sync>(path: &Path, value: &T) -> Result<(), StorageError> {
    let content = encode_json(value)?;
    atomic_write(path, &content).await?;
    Ok(())
}

/// Serialize to the exact bytes [`write_json`] would write.
pub fn encode_json<T: Serialize>(value: &T) -> Result<Vec<u8>, StorageError> {
    Ok(serde_json::to_vec_pretty(value)?)
}

/// Prior contents of files touched by a multi-file write.
#[derive(Debug, Default)]
struct FileBackup {
    saved: Vec<(PathBuf, Option<Vec<u8>>)>,
}

impl FileBackup {
    async fn capture(&mut self, path: &Path) -> Result<(), StorageError> {
        let previous = read_bytes(path).await?;
        self.saved.push((path.to_path_buf(), previous));
        Ok(())
    }

    /// Put every captured file back, newest first. Failures are logged; the
    /// caller is already returning the original error.
    async fn restore(self) {
        for (path, previous) in self.saved.into_iter().rev() {
            let result = match previous {
                Some(bytes) => atomic_write(&path, &bytes).await.map_err(StorageError::from),
                None => remove_if_exists(&path).await.map(drop),
            };
            if let Err(e) = result {
                warn!(path = %path.display(), "Failed to roll back partial write: {e}");
            }
        }
    }
}

/// Replace each file in order. If any step fails, files already replaced
/// get their previous contents back (or are removed if they were new) and
/// the first error is returned.
pub async fn write_all_or_restore(files: Vec<(PathBuf, Vec<u8>)>) -> Result<(), StorageError> {
    let mut backup = FileBackup::default();
    for (path, bytes) in files {
        let written = match backup.capture(&path).await {
            Ok(()) => atomic_write(&path, &bytes).await.map_err(StorageError::from),
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            backup.restore().await;
            return Err(e);
        }
    }
    Ok(())
}

/// Read raw bytes. Returns `None` if the file doesn't exist.
pub async fn read_bytes(path: &Path) -> Result<Option<Vec<u8>>, StorageError> {
    match fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Remove a file. Returns `false` if it was already gone.
pub async fn remove_if_exists(path: &Path) -> Result<bool, StorageError> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

pub async fn file_exists(path: &Path) -> Result<bool, StorageError> {
    Ok(fs::try_exists(path).await?)
}
