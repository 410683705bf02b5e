//! Atomic file writes.
//!
//! A document body, its metadata index entry and its version ledger are
//! each replaced whole, so readers never observe a half-written file.

use std::io;
use std::path::Path;
use tempfile::NamedTempFile;

/// Write `content` to `path` through a temp file in the same directory
/// followed by a rename.
///
/// The temp file is removed automatically if any step fails.
///
/// # Errors
///
/// Returns an `io::Error` if the path has no parent, the temp file cannot be
/// created or written, or the rename fails.
pub async fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Path has no parent directory"))?
        .to_path_buf();
    let target_path = path.to_path_buf();
    let content_owned = content.to_vec();

    tokio::task::spawn_blocking(move || -> io::Result<()> {
        use std::io::Write;

        let mut temp_file = NamedTempFile::new_in(&parent)?;
        temp_file.write_all(&content_owned)?;
        temp_file.flush()?;
        temp_file.persist(&target_path)?;
        Ok(())
    })
    .await
    .map_err(io::Error::other)?
}
