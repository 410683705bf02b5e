/// Key naming under a namespace prefix.
///
/// ```text
/// <prefix>doc:<id>          document body
/// <prefix>versions:<id>     version ledger
/// <prefix>meta:<id>         list-index entry (metadata only)
/// <prefix>file:<id><ext>    base64 attachment
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySchema {
    prefix: String,
}

impl KeySchema {
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    #[must_use]
    pub fn document(&self, document_id: &str) -> String {
        format!("{}doc:{document_id}", self.prefix)
    }

    #[must_use]
    pub fn versions(&self, document_id: &str) -> String {
        format!("{}versions:{document_id}", self.prefix)
    }

    #[must_use]
    pub fn metadata(&self, document_id: &str) -> String {
        format!("{}meta:{document_id}", self.prefix)
    }

    #[must_use]
    pub fn file(&self, document_id: &str, extension: &str) -> String {
        format!("{}file:{document_id}{extension}", self.prefix)
    }

    /// Prefix shared by every list-index entry.
    #[must_use]
    pub fn metadata_scan_prefix(&self) -> String {
        format!("{}meta:", self.prefix)
    }

    /// The three keys that make up one document.
    #[must_use]
    pub fn document_keys(&self, document_id: &str) -> [String; 3] {
        [
            self.document(document_id),
            self.metadata(document_id),
            self.versions(document_id),
        ]
    }
}
