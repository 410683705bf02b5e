use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The body of a document and everything derived from it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    /// Rendered representation, usually markdown.
    #[serde(default)]
    pub formatted_content: String,
    #[serde(default)]
    pub raw_text: String,
    /// Open-ended payload for derived outputs. Keys keep insertion order.
    #[serde(default)]
    pub structured_data: Map<String, Value>,
    #[serde(default)]
    pub embeddings: Option<Vec<f32>>,
    /// Extracted entities, written by an external extraction tool.
    #[serde(default)]
    pub entities: Option<Value>,
    #[serde(default)]
    pub relationships: Option<Value>,
}

impl Content {
    #[must_use]
    pub fn new(formatted_content: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self {
            formatted_content: formatted_content.into(),
            raw_text: raw_text.into(),
            ..Self::default()
        }
    }
}
