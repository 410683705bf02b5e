use crate::document::{DocumentType, Metadata};

pub const DEFAULT_LIST_LIMIT: usize = 100;

/// Conjunctive filters and offset pagination for `list_documents`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// Matches `created_user`.
    pub user_id: Option<String>,
    pub document_type: Option<DocumentType>,
    pub limit: usize,
    pub offset: usize,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            user_id: None,
            document_type: None,
            limit: DEFAULT_LIST_LIMIT,
            offset: 0,
        }
    }
}

impl ListQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    #[must_use]
    pub fn document_type(mut self, document_type: DocumentType) -> Self {
        self.document_type = Some(document_type);
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    #[must_use]
    pub fn matches(&self, metadata: &Metadata) -> bool {
        if let Some(ref user) = self.user_id {
            if metadata.created_user != *user {
                return false;
            }
        }
        if let Some(document_type) = self.document_type {
            if metadata.document_type != document_type {
                return false;
            }
        }
        true
    }

    /// Filter an already ordered sequence and cut the requested page.
    pub fn apply<I>(&self, ordered: I) -> Vec<Metadata>
    where
        I: IntoIterator<Item = Metadata>,
    {
        ordered
            .into_iter()
            .filter(|m| self.matches(m))
            .skip(self.offset)
            .take(self.limit)
            .collect()
    }
}
