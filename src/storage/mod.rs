//! # Datasource Trait
//!
//! The contract between the graph engine and whatever holds the documents.
//! The engine only ever asks four questions:
//!
//! - does this collection exist, and is it a document or an edge collection?
//! - what is the document with this `_id` (or nothing)?
//! - which edges of this collection touch this vertex in this direction?
//! - which indexes does this collection carry?
//!
//! ## Implementations
//!
//! | Datasource | Module | Description |
//! |------------|--------|-------------|
//! | `MemoryStore` | `memory` | In-memory for testing/embedding |

pub mod memory;

use serde::{Deserialize, Serialize};

use crate::graph::GraphDefinition;
use crate::index::{IndexInfo, IndexType};
use crate::model::{Direction, Document, DocumentId, Edge};
use crate::{Error, Result};

pub use memory::MemoryStore;

// ============================================================================
// Collection descriptors
// ============================================================================

/// Kind of collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    Document,
    Edge,
}

/// A resolved collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub name: String,
    pub kind: CollectionKind,
}

impl CollectionInfo {
    pub fn is_edge(&self) -> bool {
        self.kind == CollectionKind::Edge
    }
}

/// Lazy sequence of edges returned by [`Datasource::edges`].
pub type EdgeIter<'a> = Box<dyn Iterator<Item = Edge> + 'a>;

// ============================================================================
// Datasource Trait
// ============================================================================

/// Read access to documents, edges and indexes.
///
/// Lookups by id return `None` for missing documents instead of failing, so
/// path reconstruction can drop branches that point at deleted vertices.
/// Unknown collections are errors.
pub trait Datasource: Send + Sync {
    /// Look up a collection by name.
    fn collection(&self, name: &str) -> Option<CollectionInfo>;

    /// Look up a collection by name, failing when it does not exist.
    fn resolve_collection(&self, name: &str) -> Result<CollectionInfo> {
        self.collection(name)
            .ok_or_else(|| Error::NotFound(format!("collection '{name}'")))
    }

    /// Resolve an edge collection. Document collections are a type error.
    fn resolve_edge_collection(&self, name: &str) -> Result<CollectionInfo> {
        let info = self.resolve_collection(name)?;
        if !info.is_edge() {
            return Err(Error::TypeError {
                expected: "edge collection".into(),
                got: format!("document collection '{name}'"),
            });
        }
        Ok(info)
    }

    /// Fetch a document by id. Missing documents are `None`.
    fn document(&self, id: &DocumentId) -> Option<Document>;

    /// All documents of a collection, in a stable order.
    fn documents(&self, collection: &str) -> Result<Vec<Document>>;

    /// Edges of `collection` connected to `vertex` in `direction`.
    ///
    /// With [`Direction::Any`] a self-loop is yielded once. The sequence is
    /// finite and a fresh one is produced per call.
    fn edges<'a>(
        &'a self,
        collection: &str,
        vertex: &DocumentId,
        direction: Direction,
    ) -> Result<EdgeIter<'a>>;

    /// Indexes registered on a collection.
    fn indexes(&self, collection: &str) -> Result<Vec<IndexInfo>>;

    /// First index of `kind` whose leading field is `field`.
    fn find_index(&self, collection: &str, kind: IndexType, field: &str) -> Result<IndexInfo> {
        self.indexes(collection)?
            .into_iter()
            .find(|idx| idx.covers(kind, field))
            .ok_or_else(|| {
                Error::NotFound(format!("{kind:?} index on '{collection}.{field}'"))
            })
    }

    /// Named graph definition, if the datasource stores graphs.
    fn graph(&self, _name: &str) -> Option<GraphDefinition> {
        None
    }
}
