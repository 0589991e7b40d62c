//! Traversal source over a datasource and a fixed set of edge collections.

use crate::model::{Direction, DocumentId, Edge, Vertex};
use crate::storage::Datasource;
use crate::traversal::TraversalSource;
use crate::Result;

/// Reads vertices from any collection and edges from `collections` only.
#[derive(Debug)]
pub struct EdgeSource<'a, D: ?Sized> {
    datasource: &'a D,
    collections: Vec<String>,
}

impl<'a, D: Datasource + ?Sized> EdgeSource<'a, D> {
    /// Every name must be an existing edge collection.
    pub fn new(datasource: &'a D, collections: impl IntoIterator<Item = impl Into<String>>) -> Result<Self> {
        let collections: Vec<String> = collections.into_iter().map(Into::into).collect();
        for name in &collections {
            datasource.resolve_edge_collection(name)?;
        }
        Ok(Self { datasource, collections })
    }

    pub fn collections(&self) -> &[String] {
        &self.collections
    }

    pub fn datasource(&self) -> &'a D {
        self.datasource
    }
}

impl<D: Datasource + ?Sized> TraversalSource for EdgeSource<'_, D> {
    fn vertex(&self, id: &DocumentId) -> Option<Vertex> {
        self.datasource.document(id).and_then(Vertex::from_document)
    }

    fn edges(&self, vertex: &Vertex, direction: Direction) -> Result<Vec<Edge>> {
        let mut edges = Vec::new();
        for name in &self.collections {
            edges.extend(self.datasource.edges(name, &vertex.id, direction)?);
        }
        Ok(edges)
    }
}
