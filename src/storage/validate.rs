//! Input checks shared by both backends so ids behave the same everywhere.
use super::error::StorageError;
use crate::document::Document;

/// Longest accepted id, in bytes. The filesystem backend appends up to 17
/// bytes (`.` plus a 16-byte extension) and file names are capped at 255.
pub const MAX_ID_LEN: usize = 200;
const MAX_EXTENSION_LEN: usize = 16;

/// Reject ids that could escape a directory or break key namespacing.
pub fn validate_document_id(document_id: &str) -> Result<(), StorageError> {
    if document_id.is_empty() {
        return Err(StorageError::invalid("Document id cannot be empty"));
    }
    if document_id.len() > MAX_ID_LEN {
        return Err(StorageError::invalid(format!(
            "Document id too long (max {MAX_ID_LEN} bytes)"
        )));
    }
    if document_id.contains("..") || document_id.contains('/') || document_id.contains('\\') {
        return Err(StorageError::invalid(
            "Document id cannot contain path separators or '..'",
        ));
    }
    if document_id.starts_with('.') {
        return Err(StorageError::invalid("Document id cannot start with '.'"));
    }
    if document_id.chars().any(char::is_control) {
        return Err(StorageError::invalid(
            "Document id cannot contain control characters",
        ));
    }
    Ok(())
}

/// Check a document before any backend writes it.
///
/// Non-finite embedding values serialize to JSON `null` and could never be
/// read back, so they are refused here.
pub fn validate_document(document: &Document) -> Result<(), StorageError> {
    validate_document_id(document.id())?;
    if let Some(position) = document
        .content
        .embeddings
        .as_deref()
        .and_then(|values| values.iter().position(|v| !v.is_finite()))
    {
        return Err(StorageError::invalid(format!(
            "Embedding value at index {position} is not a finite number"
        )));
    }
    Ok(())
}

/// Normalize `pdf`, `.PDF` and `.pdf` to `.pdf`.
pub fn normalize_extension(extension: &str) -> Result<String, StorageError> {
    let bare = extension.strip_prefix('.').unwrap_or(extension);
    if bare.is_empty() {
        return Err(StorageError::invalid("File extension cannot be empty"));
    }
    if bare.len() > MAX_EXTENSION_LEN {
        return Err(StorageError::invalid(format!(
            "File extension too long (max {MAX_EXTENSION_LEN} characters)"
        )));
    }
    if !bare
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(StorageError::invalid(format!(
            "Invalid file extension: {extension}"
        )));
    }
    Ok(format!(".{}", bare.to_ascii_lowercase()))
}
