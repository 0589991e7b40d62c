//! Paths: sequences of alternating vertices and edges.

use std::iter;

use super::{DocumentId, Edge, Value, Vertex};

/// A path in the graph: vertex -[edge]- vertex -[edge]- vertex ...
///
/// Never empty: a path starts at one vertex and grows through [`Path::append`].
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    start: Vertex,
    /// Each edge with the vertex it leads to.
    steps: Vec<(Edge, Vertex)>,
}

impl Path {
    pub fn single(vertex: Vertex) -> Self {
        Self { start: vertex, steps: Vec::new() }
    }

    /// Number of edges.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn start(&self) -> &Vertex {
        &self.start
    }

    pub fn end(&self) -> &Vertex {
        self.steps.last().map_or(&self.start, |(_, vertex)| vertex)
    }

    /// Vertices in walking order, starting with [`Path::start`].
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        iter::once(&self.start).chain(self.steps.iter().map(|(_, vertex)| vertex))
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.steps.iter().map(|(edge, _)| edge)
    }

    pub fn into_edges(self) -> impl Iterator<Item = Edge> {
        self.steps.into_iter().map(|(edge, _)| edge)
    }

    /// Extend path with an edge and the vertex it leads to.
    pub fn append(&mut self, edge: Edge, vertex: Vertex) {
        self.steps.push((edge, vertex));
    }

    /// Undo the last `append`. The start vertex is never removed.
    pub fn pop(&mut self) -> Option<(Edge, Vertex)> {
        self.steps.pop()
    }

    pub fn contains_vertex(&self, id: &DocumentId) -> bool {
        self.vertices().any(|v| v.id == *id)
    }

    pub fn contains_edge(&self, id: &DocumentId) -> bool {
        self.edges().any(|e| e.id == *id)
    }

    /// `{"vertices": [...], "edges": [...]}`
    pub fn to_value(&self) -> Value {
        let mut out = super::value::Object::new();
        out.insert("vertices".into(), Value::Array(self.vertices().map(Vertex::to_value).collect()));
        out.insert("edges".into(), Value::Array(self.edges().map(Edge::to_value).collect()));
        Value::Object(out)
    }
}
