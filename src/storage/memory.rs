//! In-memory datasource.
//!
//! This is the reference implementation of `Datasource`.
//! It uses hash maps protected by `RwLock`.
//!
//! ## Limitations
//!
//! - **No transactions**: writes are applied immediately.
//! - **Indexes are descriptors only**: `ensure_index()` records the index so
//!   that `find_index()` can locate it. Lookups always scan.
//!
//! Documents keep insertion order, so traversals over a `MemoryStore` are
//! deterministic.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use hashbrown::HashMap;
use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::graph::GraphDefinition;
use crate::index::{IndexInfo, IndexType};
use crate::model::document::{FROM, ID, KEY, TO};
use crate::model::{Direction, Document, DocumentId, Edge, Value};
use crate::{Error, Result};
use super::{CollectionInfo, CollectionKind, Datasource, EdgeIter};

// ============================================================================
// MemoryStore
// ============================================================================

/// In-memory document and edge storage.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    collections: RwLock<HashMap<String, CollectionData>>,
    graphs: RwLock<HashMap<String, GraphDefinition>>,
    next_key: AtomicU64,
    next_index_id: AtomicU64,
}

struct CollectionData {
    info: CollectionInfo,
    /// key → document
    documents: IndexMap<String, Document>,
    /// `_from` vertex → edge keys
    outbound: HashMap<DocumentId, Vec<String>>,
    /// `_to` vertex → edge keys
    inbound: HashMap<DocumentId, Vec<String>>,
    indexes: Vec<IndexInfo>,
}

impl CollectionData {
    fn edge(&self, key: &str) -> Option<Edge> {
        self.documents.get(key).cloned().and_then(Edge::from_document)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Schema
    // ========================================================================

    /// Create a collection. Fails if the name is taken.
    pub fn create_collection(&self, name: &str, kind: CollectionKind) -> Result<CollectionInfo> {
        if name.is_empty() || name.contains('/') {
            return Err(Error::InvalidArgument(format!("invalid collection name '{name}'")));
        }
        let mut collections = self.inner.collections.write();
        if collections.contains_key(name) {
            return Err(Error::InvalidArgument(format!("duplicate collection '{name}'")));
        }

        let info = CollectionInfo { name: name.to_owned(), kind };
        let mut indexes = vec![self.index_info(name, IndexType::Primary, &[KEY])];
        if kind == CollectionKind::Edge {
            indexes.push(self.index_info(name, IndexType::Edge, &[FROM, TO]));
        }
        collections.insert(
            name.to_owned(),
            CollectionData {
                info: info.clone(),
                documents: IndexMap::new(),
                outbound: HashMap::new(),
                inbound: HashMap::new(),
                indexes,
            },
        );
        tracing::debug!(collection = name, ?kind, "collection created");
        Ok(info)
    }

    /// Register an index on a collection, or return the matching one.
    pub fn ensure_index(&self, collection: &str, kind: IndexType, fields: &[&str]) -> Result<IndexInfo> {
        if fields.is_empty() {
            return Err(Error::InvalidArgument("index needs at least one field".into()));
        }
        let mut collections = self.inner.collections.write();
        let data = collections
            .get_mut(collection)
            .ok_or_else(|| Error::NotFound(format!("collection '{collection}'")))?;

        if let Some(existing) = data
            .indexes
            .iter()
            .find(|idx| idx.kind == kind && idx.fields.iter().map(String::as_str).eq(fields.iter().copied()))
        {
            return Ok(existing.clone());
        }
        let info = self.index_info(collection, kind, fields);
        data.indexes.push(info.clone());
        Ok(info)
    }

    /// Register a named graph. All collections it names must exist with the
    /// right kind.
    pub fn create_graph(&self, definition: GraphDefinition) -> Result<()> {
        definition.validate(self)?;
        let mut graphs = self.inner.graphs.write();
        if graphs.contains_key(&definition.name) {
            return Err(Error::InvalidArgument(format!("duplicate graph '{}'", definition.name)));
        }
        graphs.insert(definition.name.clone(), definition);
        Ok(())
    }

    fn index_info(&self, collection: &str, kind: IndexType, fields: &[&str]) -> IndexInfo {
        let n = self.inner.next_index_id.fetch_add(1, Ordering::Relaxed);
        IndexInfo {
            id: format!("{collection}/{n}"),
            kind,
            fields: fields.iter().map(|f| (*f).to_owned()).collect(),
        }
    }

    // ========================================================================
    // Documents
    // ========================================================================

    /// Insert a document and return its id.
    ///
    /// `_key` is taken from the document or generated; `_id` is always set.
    /// Edge documents must carry `_from` and `_to` handles. The referenced
    /// vertices are not required to exist.
    pub fn insert(&self, collection: &str, document: impl Into<Value>) -> Result<DocumentId> {
        let Value::Object(mut doc) = document.into() else {
            return Err(Error::TypeError { expected: "object".into(), got: "non-object document".into() });
        };
        let mut collections = self.inner.collections.write();
        let data = collections
            .get_mut(collection)
            .ok_or_else(|| Error::NotFound(format!("collection '{collection}'")))?;

        let key = match doc.get(KEY) {
            Some(Value::String(k)) if !k.is_empty() && !k.contains('/') => k.clone(),
            Some(Value::Number(n)) if n.fract() == 0.0 => format!("{n}"),
            None | Some(Value::Null) => {
                self.inner.next_key.fetch_add(1, Ordering::Relaxed).to_string()
            }
            Some(other) => {
                return Err(Error::InvalidArgument(format!("invalid document key {other}")));
            }
        };
        if data.documents.contains_key(&key) {
            return Err(Error::InvalidArgument(format!("duplicate key '{collection}/{key}'")));
        }
        let id = DocumentId::new(collection, &key);
        doc.insert(KEY.into(), Value::String(key.clone()));
        doc.insert(ID.into(), Value::String(id.to_string()));

        let doc: Document = doc.into_iter().map(|(k, v)| (k, v.fix())).collect();

        if data.info.kind == CollectionKind::Edge {
            let handle = |name: &str| {
                doc.get(name)
                    .and_then(Value::as_str)
                    .and_then(DocumentId::parse)
                    .ok_or_else(|| Error::InvalidArgument(format!("edge '{id}' needs a valid {name}")))
            };
            let from = handle(FROM)?;
            let to = handle(TO)?;
            data.outbound.entry(from).or_default().push(key.clone());
            data.inbound.entry(to).or_default().push(key.clone());
        }
        data.documents.insert(key, doc);
        Ok(id)
    }

    /// Remove a document. Edges pointing at a removed vertex are left in place.
    pub fn remove(&self, id: &DocumentId) -> Result<Option<Document>> {
        let mut collections = self.inner.collections.write();
        let data = collections
            .get_mut(id.collection())
            .ok_or_else(|| Error::NotFound(format!("collection '{}'", id.collection())))?;

        let Some(doc) = data.documents.shift_remove(id.key()) else {
            return Ok(None);
        };
        if data.info.kind == CollectionKind::Edge {
            let key = id.key();
            for (name, adjacency) in [(FROM, &mut data.outbound), (TO, &mut data.inbound)] {
                let end = doc.get(name).and_then(Value::as_str).and_then(DocumentId::parse);
                if let Some(keys) = end.and_then(|end| adjacency.get_mut(&end)) {
                    keys.retain(|k| k != key);
                }
            }
        }
        Ok(Some(doc))
    }

    /// Number of documents in a collection.
    pub fn count(&self, collection: &str) -> Result<usize> {
        self.inner
            .collections
            .read()
            .get(collection)
            .map(|data| data.documents.len())
            .ok_or_else(|| Error::NotFound(format!("collection '{collection}'")))
    }
}

// ============================================================================
// Datasource impl
// ============================================================================

impl Datasource for MemoryStore {
    fn collection(&self, name: &str) -> Option<CollectionInfo> {
        self.inner.collections.read().get(name).map(|data| data.info.clone())
    }

    fn document(&self, id: &DocumentId) -> Option<Document> {
        self.inner
            .collections
            .read()
            .get(id.collection())?
            .documents
            .get(id.key())
            .cloned()
    }

    fn documents(&self, collection: &str) -> Result<Vec<Document>> {
        self.inner
            .collections
            .read()
            .get(collection)
            .map(|data| data.documents.values().cloned().collect())
            .ok_or_else(|| Error::NotFound(format!("collection '{collection}'")))
    }

    fn edges<'a>(
        &'a self,
        collection: &str,
        vertex: &DocumentId,
        direction: Direction,
    ) -> Result<EdgeIter<'a>> {
        let collections = self.inner.collections.read();
        let data = collections
            .get(collection)
            .ok_or_else(|| Error::NotFound(format!("collection '{collection}'")))?;
        if data.info.kind != CollectionKind::Edge {
            return Err(Error::TypeError {
                expected: "edge collection".into(),
                got: format!("document collection '{collection}'"),
            });
        }

        let keys = |adjacency: &HashMap<DocumentId, Vec<String>>| {
            adjacency.get(vertex).cloned().unwrap_or_default()
        };
        let found = match direction {
            Direction::Outbound => keys(&data.outbound),
            Direction::Inbound => keys(&data.inbound),
            Direction::Any => {
                let mut found = keys(&data.outbound);
                // self-loops are already in the outbound list
                for key in keys(&data.inbound) {
                    if !found.contains(&key) {
                        found.push(key);
                    }
                }
                found
            }
        };

        let edges: Vec<Edge> = found.iter().filter_map(|key| data.edge(key)).collect();
        Ok(Box::new(edges.into_iter()))
    }

    fn indexes(&self, collection: &str) -> Result<Vec<IndexInfo>> {
        self.inner
            .collections
            .read()
            .get(collection)
            .map(|data| data.indexes.clone())
            .ok_or_else(|| Error::NotFound(format!("collection '{collection}'")))
    }

    fn graph(&self, name: &str) -> Option<GraphDefinition> {
        self.inner.graphs.read().get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> MemoryStore {
        let store = MemoryStore::new();
        store.create_collection("v", CollectionKind::Document).unwrap();
        store.create_collection("e", CollectionKind::Edge).unwrap();
        for key in ["a", "b"] {
            store.insert("v", json!({"_key": key})).unwrap();
        }
        store.insert("e", json!({"_key": "ab", "_from": "v/a", "_to": "v/b"})).unwrap();
        store.insert("e", json!({"_key": "aa", "_from": "v/a", "_to": "v/a"})).unwrap();
        store
    }

    fn keys(iter: EdgeIter<'_>) -> Vec<String> {
        iter.map(|e| e.id.key().to_owned()).collect()
    }

    #[test]
    fn test_insert_assigns_ids() {
        let store = store();
        let id = store.insert("v", json!({"name": "x"})).unwrap();
        let doc = store.document(&id).unwrap();
        assert_eq!(doc.get("_id"), Some(&Value::from(id.as_str())));
        assert!(matches!(store.insert("v", json!({"_key": "a"})), Err(Error::InvalidArgument(_))));
        assert!(matches!(store.insert("nope", json!({})), Err(Error::NotFound(_))));
        assert!(matches!(store.insert("e", json!({"_from": "v/a"})), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_edges_by_direction() {
        let store = store();
        let a = DocumentId::new("v", "a");
        let b = DocumentId::new("v", "b");
        assert_eq!(keys(store.edges("e", &a, Direction::Outbound).unwrap()), vec!["ab", "aa"]);
        assert_eq!(keys(store.edges("e", &a, Direction::Inbound).unwrap()), vec!["aa"]);
        assert_eq!(keys(store.edges("e", &a, Direction::Any).unwrap()), vec!["ab", "aa"]);
        assert_eq!(keys(store.edges("e", &b, Direction::Any).unwrap()), vec!["ab"]);
        assert!(matches!(store.edges("v", &a, Direction::Any), Err(Error::TypeError { .. })));
    }

    #[test]
    fn test_remove_edge_updates_adjacency() {
        let store = store();
        let a = DocumentId::new("v", "a");
        store.remove(&DocumentId::new("e", "ab")).unwrap();
        assert_eq!(keys(store.edges("e", &a, Direction::Outbound).unwrap()), vec!["aa"]);
        assert!(store.remove(&DocumentId::new("e", "ab")).unwrap().is_none());
    }

    #[test]
    fn test_indexes() {
        let store = store();
        let geo = store.ensure_index("v", IndexType::Geo, &["loc"]).unwrap();
        assert_eq!(store.ensure_index("v", IndexType::Geo, &["loc"]).unwrap(), geo);
        assert_eq!(store.find_index("v", IndexType::Geo, "loc").unwrap(), geo);
        assert!(store.find_index("v", IndexType::Fulltext, "loc").is_err());
        assert_eq!(store.indexes("e").unwrap()[1].kind, IndexType::Edge);
    }
}
