//! Error taxonomy returned across the storage boundary.
use std::time::Duration;
use thiserror::Error;

/// Every failure a [`DocumentStore`](super::DocumentStore) can report.
///
/// Absent documents on `load`, `delete` and the file operations are values,
/// not errors. Use [`StorageError::kind`] to branch on the four categories.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Document not found: {0}")]
    DocumentNotFound(String),
    #[error("Version {version} not found for document {document_id}")]
    VersionNotFound { document_id: String, version: u32 },
    #[error("Storage connection error: {0}")]
    Connection(String),
    #[error("Storage operation timed out after {0:?}")]
    Timeout(Duration),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("{what} is {size} bytes, exceeds the limit of {limit} bytes")]
    LimitExceeded { what: String, size: usize, limit: usize },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Storage error: {0}")]
    Backend(String),
}

/// Coarse error categories callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    DocumentNotFound,
    VersionNotFound,
    Connection,
    Storage,
}

impl StorageError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            StorageError::DocumentNotFound(_) => ErrorKind::DocumentNotFound,
            StorageError::VersionNotFound { .. } => ErrorKind::VersionNotFound,
            StorageError::Connection(_) | StorageError::Timeout(_) => ErrorKind::Connection,
            StorageError::InvalidInput(_)
            | StorageError::LimitExceeded { .. }
            | StorageError::Io(_)
            | StorageError::Json(_)
            | StorageError::Backend(_) => ErrorKind::Storage,
        }
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        StorageError::Backend(msg.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        StorageError::InvalidInput(msg.into())
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        StorageError::DocumentNotFound(id.into())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
