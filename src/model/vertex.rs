//! Vertex in the document graph.

use serde::{Deserialize, Serialize};

use super::document::{self, Document, DocumentId};
use super::value::{NULL, Value};

/// A vertex document: its `_id` and the full document body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub id: DocumentId,
    pub data: Document,
}

impl Vertex {
    /// Wrap a stored document. Documents without a well-formed `_id` are rejected.
    pub fn from_document(data: Document) -> Option<Self> {
        let id = data.get(document::ID)?.as_str().and_then(DocumentId::parse)?;
        Some(Self { id, data })
    }

    pub fn collection(&self) -> &str {
        self.id.collection()
    }

    /// Attribute by name, `Null` when absent.
    pub fn get(&self, name: &str) -> &Value {
        self.data.get(name).unwrap_or(&NULL)
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.data.clone())
    }
}
