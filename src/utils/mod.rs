mod atomic;

pub use atomic::atomic_write;

use std::path::PathBuf;

/// The name of the per-user docstore folder
pub const DOCSTORE_FOLDER: &str = ".docstore";

/// Get the per-user docstore folder (`~/.docstore`), falling back to the
/// working directory when no home directory is known
#[must_use]
pub fn docstore_home() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DOCSTORE_FOLDER)
}
