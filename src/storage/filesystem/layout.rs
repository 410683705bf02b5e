use std::path::{Path, PathBuf};

pub const DOCUMENTS_DIR: &str = "documents";
pub const METADATA_DIR: &str = "metadata";
pub const VERSIONS_DIR: &str = "versions";
pub const FILES_DIR: &str = "files";
const METADATA_SUFFIX: &str = "_metadata.json";

/// On-disk layout under a store root:
///
/// ```text
/// documents/<id>.json
/// metadata/<id>_metadata.json
/// versions/<id>.json
/// files/<id><ext>
/// ```
#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn documents_dir(&self) -> PathBuf {
        self.root.join(DOCUMENTS_DIR)
    }

    #[must_use]
    pub fn metadata_dir(&self) -> PathBuf {
        self.root.join(METADATA_DIR)
    }

    #[must_use]
    pub fn versions_dir(&self) -> PathBuf {
        self.root.join(VERSIONS_DIR)
    }

    #[must_use]
    pub fn files_dir(&self) -> PathBuf {
        self.root.join(FILES_DIR)
    }

    /// Directories created when the store opens. `files/` is created on the
    /// first attachment write.
    #[must_use]
    pub fn eager_dirs(&self) -> [PathBuf; 3] {
        [self.documents_dir(), self.versions_dir(), self.metadata_dir()]
    }

    #[must_use]
    pub fn document_path(&self, document_id: &str) -> PathBuf {
        self.documents_dir().join(format!("{document_id}.json"))
    }

    #[must_use]
    pub fn metadata_path(&self, document_id: &str) -> PathBuf {
        self.metadata_dir()
            .join(format!("{document_id}{METADATA_SUFFIX}"))
    }

    #[must_use]
    pub fn versions_path(&self, document_id: &str) -> PathBuf {
        self.versions_dir().join(format!("{document_id}.json"))
    }

    /// `extension` is already normalized and carries its leading dot.
    #[must_use]
    pub fn file_path(&self, document_id: &str, extension: &str) -> PathBuf {
        self.files_dir().join(format!("{document_id}{extension}"))
    }

    /// Whether a file name in `metadata/` is an index entry.
    #[must_use]
    pub fn is_metadata_file(file_name: &str) -> bool {
        file_name.ends_with(METADATA_SUFFIX)
    }
}
