//! # docgraph: Document Graph Query Runtime
//!
//! The runtime core behind the graph functions of a document database: a
//! total order over dynamically-typed values, and traversal, shortest path
//! and centrality algorithms over documents connected by edge documents.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: [`Datasource`] is the contract between the algorithms and storage
//! 2. **Plain values**: [`Value`], [`Vertex`], [`Edge`], [`Path`] cross all boundaries
//! 3. **Comparison never fails**: every pair of values is ordered, mismatches degrade to defaults
//! 4. **Options in, validated config out**: caller JSON options become an immutable run configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docgraph::{CollectionKind, Direction, Engine, TraversalOptions};
//! use serde_json::json;
//!
//! # fn example() -> docgraph::Result<()> {
//! let engine = Engine::open_memory();
//! let store = engine.datasource();
//! store.create_collection("people", CollectionKind::Document)?;
//! store.create_collection("knows", CollectionKind::Edge)?;
//! store.insert("people", json!({"_key": "ada"}))?;
//! store.insert("people", json!({"_key": "alan"}))?;
//! store.insert("knows", json!({"_from": "people/ada", "_to": "people/alan"}))?;
//!
//! let options = TraversalOptions::from_json(json!({"maxDepth": 2, "paths": true}))?;
//! for item in engine.traversal("people", "knows", "ada", Direction::Outbound, &options)? {
//!     println!("{item}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Datasources
//!
//! | Datasource | Module | Description |
//! |------------|--------|-------------|
//! | `MemoryStore` | `storage::memory` | In-memory store for testing/embedding |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod compare;
pub mod storage;
pub mod index;
pub mod graph;
pub mod traversal;
pub mod shortest_path;
pub mod centrality;

// ============================================================================
// Re-exports: Model
// ============================================================================

pub use model::{
    Direction, Document, DocumentId, Edge, Object, Path, TypeWeight, Value, Vertex,
};

// ============================================================================
// Re-exports: Storage & graphs
// ============================================================================

pub use storage::{CollectionInfo, CollectionKind, Datasource, MemoryStore};
pub use index::{IndexInfo, IndexType};
pub use graph::{
    CollectionRestriction, CommonNeighbors, EdgeDefinition, EdgeNeighbor, GraphDefinition,
    GraphPath, NeighborOptions, PathsOptions, VertexOptions,
};

// ============================================================================
// Re-exports: Algorithms
// ============================================================================

pub use compare::{Comparator, Quantifier, RelationalOp};
pub use traversal::{Neighbor, TraversalConfig, TraversalOptions, Traverser};
pub use shortest_path::{Algorithm, ShortestPathOptions, ShortestPathResult};
pub use centrality::{CentralityOptions, Metrics};

use crate::graph::{select_vertices, EdgeSource, Restrictions};
use crate::traversal::{PathVisitor, TreeVisitor};

// ============================================================================
// Top-level Engine handle
// ============================================================================

/// The primary entry point. An `Engine` wraps a datasource and exposes the
/// graph functions of the query language.
///
/// Collections, graphs and start documents named by the caller must exist.
/// Vertex examples that select nothing, or malformed filter examples, give
/// an empty result instead of an error.
pub struct Engine<D: Datasource> {
    datasource: D,
}

impl<D: Datasource> Engine<D> {
    /// Create an Engine over the given datasource.
    pub fn with_datasource(datasource: D) -> Self {
        Self { datasource }
    }

    /// Access the underlying datasource.
    pub fn datasource(&self) -> &D {
        &self.datasource
    }

    fn graph(&self, name: &str) -> Result<GraphDefinition> {
        graph::resolve_graph(&self.datasource, name)
    }

    /// `handle` is a full `_id` or a key of `collection`.
    fn document_id(&self, collection: &str, handle: &str) -> Result<DocumentId> {
        self.datasource.resolve_collection(collection)?;
        DocumentId::resolve(collection, handle)
            .ok_or_else(|| Error::InvalidArgument(format!("invalid document handle '{handle}'")))
    }

    fn start_vertex(&self, collection: &str, handle: &str) -> Result<Vertex> {
        let id = self.document_id(collection, handle)?;
        self.datasource
            .document(&id)
            .and_then(Vertex::from_document)
            .ok_or_else(|| Error::NotFound(format!("document '{id}'")))
    }

    // ========================================================================
    // Traversal
    // ========================================================================

    /// Walk from `start` over one edge collection. Items are `{vertex}`, or
    /// `{vertex, path}` with the `paths` option.
    #[tracing::instrument(level = "debug", skip(self, options))]
    pub fn traversal(
        &self,
        vertex_collection: &str,
        edge_collection: &str,
        start: &str,
        direction: Direction,
        options: &TraversalOptions,
    ) -> Result<Vec<Value>> {
        let start = self.start_vertex(vertex_collection, start)?;
        let source = EdgeSource::new(&self.datasource, [edge_collection])?;
        let traverser = Traverser::new(options.to_config(direction))?;
        if !options.examples_valid() {
            return Ok(Vec::new());
        }
        traverser.traverse(&source, &mut PathVisitor { track_paths: options.paths }, start, None)
    }

    /// [`traversal`](Self::traversal) from every vertex matching
    /// `start_example`, one result list per start vertex.
    #[tracing::instrument(level = "debug", skip(self, start_example, options))]
    pub fn graph_traversal(
        &self,
        graph: &str,
        start_example: &Value,
        direction: Direction,
        options: &TraversalOptions,
    ) -> Result<Vec<Vec<Value>>> {
        let graph = self.graph(graph)?;
        let collections = graph.collections(direction, &Restrictions::default());
        let source = EdgeSource::new(&self.datasource, collections.edges.iter().cloned())?;
        let traverser = Traverser::new(options.to_config(direction))?;
        if !options.examples_valid() {
            return Ok(Vec::new());
        }
        let mut visitor = PathVisitor { track_paths: options.paths };
        select_vertices(&self.datasource, &collections.start, start_example)?
            .into_iter()
            .map(|start| traverser.traverse(&source, &mut visitor, start, None))
            .collect()
    }

    /// The vertices reachable from `start` as one nested document, children
    /// stored under `connect`. `None` when the start vertex is filtered out.
    pub fn traversal_tree(
        &self,
        vertex_collection: &str,
        edge_collection: &str,
        start: &str,
        direction: Direction,
        connect: &str,
        options: &TraversalOptions,
    ) -> Result<Option<Value>> {
        let mut visitor = TreeVisitor::new(connect)?;
        let start = self.start_vertex(vertex_collection, start)?;
        let source = EdgeSource::new(&self.datasource, [edge_collection])?;
        let traverser = Traverser::new(options.to_config(direction))?;
        if !options.examples_valid() {
            return Ok(None);
        }
        Ok(traverser.traverse(&source, &mut visitor, start, None)?.into_iter().next())
    }

    // ========================================================================
    // Shortest paths
    // ========================================================================

    /// Shortest path from `start` to `end` over one edge collection.
    pub fn shortest_path(
        &self,
        vertex_collection: &str,
        edge_collection: &str,
        start: &str,
        end: &str,
        options: &ShortestPathOptions,
    ) -> Result<Option<ShortestPathResult>> {
        let start = self.start_vertex(vertex_collection, start)?;
        let end = self.document_id(vertex_collection, end)?;
        shortest_path::shortest_path(&self.datasource, edge_collection, start, &end, options)
    }

    pub fn graph_shortest_path(
        &self,
        graph: &str,
        start_example: &Value,
        end_example: &Value,
        options: &ShortestPathOptions,
    ) -> Result<Vec<ShortestPathResult>> {
        let graph = self.graph(graph)?;
        shortest_path::graph_shortest_path(&self.datasource, &graph, start_example, end_example, options)
    }

    /// Like [`graph_shortest_path`](Self::graph_shortest_path), distances only.
    pub fn graph_distance_to(
        &self,
        graph: &str,
        start_example: &Value,
        end_example: &Value,
        options: &ShortestPathOptions,
    ) -> Result<Vec<ShortestPathResult>> {
        let graph = self.graph(graph)?;
        shortest_path::graph_distance_to(&self.datasource, &graph, start_example, end_example, options)
    }

    pub fn all_pairs_shortest_path(
        &self,
        from: &[Vertex],
        to: &[Vertex],
        edges: &[Edge],
        options: &ShortestPathOptions,
    ) -> Vec<ShortestPathResult> {
        shortest_path::all_pairs_shortest_path(&self.datasource, from, to, edges, options)
    }

    // ========================================================================
    // Neighborhood
    // ========================================================================

    /// Edges of `edge_collection` touching `vertex`, a full `_id`.
    pub fn edges(
        &self,
        edge_collection: &str,
        vertex: &str,
        direction: Direction,
        examples: Option<&Value>,
    ) -> Result<Vec<Edge>> {
        let vertex = DocumentId::parse(vertex)
            .ok_or_else(|| Error::InvalidArgument(format!("invalid document handle '{vertex}'")))?;
        graph::neighbors::edges(&self.datasource, edge_collection, &vertex, direction, examples)
    }

    /// Direct neighbors of `vertex` with the connecting edges.
    pub fn neighbors(
        &self,
        vertex_collection: &str,
        edge_collection: &str,
        vertex: &str,
        direction: Direction,
        examples: Option<&Value>,
    ) -> Result<Vec<EdgeNeighbor>> {
        let vertex = self.document_id(vertex_collection, vertex)?;
        graph::neighbors::neighbors(&self.datasource, edge_collection, &vertex, direction, examples)
    }

    pub fn graph_neighbors(
        &self,
        graph: &str,
        vertex_example: &Value,
        options: &NeighborOptions,
    ) -> Result<Vec<Neighbor>> {
        let graph = self.graph(graph)?;
        graph::graph_neighbors(&self.datasource, &graph, vertex_example, options)
    }

    pub fn graph_edges(
        &self,
        graph: &str,
        vertex_example: &Value,
        options: &NeighborOptions,
    ) -> Result<Vec<Edge>> {
        let graph = self.graph(graph)?;
        graph::graph_edges(&self.datasource, &graph, vertex_example, options)
    }

    pub fn graph_vertices(
        &self,
        graph: &str,
        vertex_example: &Value,
        options: &VertexOptions,
    ) -> Result<Vec<Vertex>> {
        let graph = self.graph(graph)?;
        graph::graph_vertices(&self.datasource, &graph, vertex_example, options)
    }

    pub fn graph_common_neighbors(
        &self,
        graph: &str,
        first: (&Value, &NeighborOptions),
        second: (&Value, &NeighborOptions),
    ) -> Result<CommonNeighbors> {
        let graph = self.graph(graph)?;
        graph::graph_common_neighbors(&self.datasource, &graph, first, second)
    }

    pub fn graph_paths(&self, graph: &str, options: &PathsOptions) -> Result<Vec<GraphPath>> {
        let graph = self.graph(graph)?;
        graph::graph_paths(&self.datasource, &graph, options)
    }

    // ========================================================================
    // Centrality
    // ========================================================================

    pub fn absolute_eccentricity(
        &self,
        graph: &str,
        vertex_example: &Value,
        options: &CentralityOptions,
    ) -> Result<Metrics> {
        centrality::absolute_eccentricity(&self.datasource, &self.graph(graph)?, vertex_example, options)
    }

    pub fn eccentricity(&self, graph: &str, options: &CentralityOptions) -> Result<Metrics> {
        centrality::eccentricity(&self.datasource, &self.graph(graph)?, options)
    }

    pub fn absolute_closeness(
        &self,
        graph: &str,
        vertex_example: &Value,
        options: &CentralityOptions,
    ) -> Result<Metrics> {
        centrality::absolute_closeness(&self.datasource, &self.graph(graph)?, vertex_example, options)
    }

    pub fn closeness(&self, graph: &str, options: &CentralityOptions) -> Result<Metrics> {
        centrality::closeness(&self.datasource, &self.graph(graph)?, options)
    }

    pub fn absolute_betweenness(&self, graph: &str, options: &CentralityOptions) -> Result<Metrics> {
        centrality::absolute_betweenness(&self.datasource, &self.graph(graph)?, options)
    }

    pub fn betweenness(&self, graph: &str, options: &CentralityOptions) -> Result<Metrics> {
        centrality::betweenness(&self.datasource, &self.graph(graph)?, options)
    }

    pub fn radius(&self, graph: &str, options: &CentralityOptions) -> Result<Option<f64>> {
        centrality::radius(&self.datasource, &self.graph(graph)?, options)
    }

    pub fn diameter(&self, graph: &str, options: &CentralityOptions) -> Result<f64> {
        centrality::diameter(&self.datasource, &self.graph(graph)?, options)
    }
}

/// In-memory engine for testing and embedding.
impl Engine<MemoryStore> {
    pub fn open_memory() -> Self {
        Self::with_datasource(MemoryStore::new())
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Too many iterations: traversal exceeded {limit} visited vertices")]
    TooManyIterations { limit: usize },

    #[error("Type error: expected {expected}, got {got}")]
    TypeError { expected: String, got: String },

    #[error("Invalid options: {0}")]
    Options(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
