//! Edges and neighbors of vertices, for plain collections and named graphs.

use hashbrown::HashSet;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::compare;
use crate::model::{document, Direction, DocumentId, Edge, Object, Value, Vertex};
use crate::storage::Datasource;
use crate::traversal::{Neighbor, NeighborVisitor, TraversalOptions, Traverser};
use crate::Result;
use super::{select_vertices, CollectionRestriction, EdgeSource, GraphDefinition, Restrictions};

// ============================================================================
// Direct neighbors
// ============================================================================

/// An edge and the vertex at its far end.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeNeighbor {
    pub edge: Edge,
    pub vertex: Vertex,
}

impl EdgeNeighbor {
    /// `{"edge": ..., "vertex": ...}`
    pub fn to_value(&self) -> Value {
        let mut out = Object::new();
        out.insert("edge".into(), self.edge.to_value());
        out.insert("vertex".into(), self.vertex.to_value());
        Value::Object(out)
    }
}

/// Edges of `edge_collection` touching `vertex`, filtered by `examples`.
pub fn edges<D: Datasource + ?Sized>(
    datasource: &D,
    edge_collection: &str,
    vertex: &DocumentId,
    direction: Direction,
    examples: Option<&Value>,
) -> Result<Vec<Edge>> {
    datasource.resolve_edge_collection(edge_collection)?;
    let all: Vec<Edge> = datasource.edges(edge_collection, vertex, direction)?.collect();
    Ok(compare::filter_by_example(all, examples, Edge::to_value))
}

/// Vertices one edge away from `vertex`, each with the edge leading there.
///
/// Edges looping back to `vertex` and edges pointing at missing documents
/// are skipped.
pub fn neighbors<D: Datasource + ?Sized>(
    datasource: &D,
    edge_collection: &str,
    vertex: &DocumentId,
    direction: Direction,
    examples: Option<&Value>,
) -> Result<Vec<EdgeNeighbor>> {
    let found = edges(datasource, edge_collection, vertex, direction, examples)?
        .into_iter()
        .filter_map(|edge| {
            let target = match direction {
                Direction::Inbound => &edge.from,
                Direction::Outbound => &edge.to,
                Direction::Any => edge.other_end(vertex)?,
            };
            if target == vertex {
                return None;
            }
            let Some(neighbor) = datasource.document(target).and_then(Vertex::from_document) else {
                tracing::debug!(edge = %edge.id, vertex = %target, "dangling reference, neighbor dropped");
                return None;
            };
            Some(EdgeNeighbor { edge, vertex: neighbor })
        })
        .collect();
    Ok(found)
}

// ============================================================================
// Graph neighbors
// ============================================================================

/// Options of [`graph_neighbors`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NeighborOptions {
    pub direction: Direction,
    /// Only edges matching these examples are followed.
    pub edge_examples: Option<Value>,
    /// Only neighbors matching these examples are reported. A string is an `_id`.
    pub neighbor_examples: Option<Value>,
    pub edge_collection_restriction: Option<CollectionRestriction>,
    /// Only neighbors in these collections are reported; paths may pass others.
    pub vertex_collection_restriction: Option<CollectionRestriction>,
    pub start_vertex_collection_restriction: Option<CollectionRestriction>,
    pub min_depth: usize,
    pub max_depth: usize,
}

impl Default for NeighborOptions {
    fn default() -> Self {
        Self {
            direction: Direction::Any,
            edge_examples: None,
            neighbor_examples: None,
            edge_collection_restriction: None,
            vertex_collection_restriction: None,
            start_vertex_collection_restriction: None,
            min_depth: 1,
            max_depth: 1,
        }
    }
}

impl NeighborOptions {
    fn traversal_options(&self) -> TraversalOptions {
        TraversalOptions {
            paths: true,
            min_depth: self.min_depth,
            max_depth: Some(self.max_depth),
            follow_edges: self.edge_examples.clone().map(compare::as_example_list),
            edge_collection_restriction: self.edge_collection_restriction.clone(),
            filter_vertex_collections: self.vertex_collection_restriction.clone(),
            ..TraversalOptions::default()
        }
    }
}

/// Every vertex within `min_depth..=max_depth` of a vertex selected by
/// `vertex_example`.
#[tracing::instrument(level = "debug", skip_all, fields(graph = %graph.name, direction = %options.direction))]
pub fn graph_neighbors<D: Datasource + ?Sized>(
    datasource: &D,
    graph: &GraphDefinition,
    vertex_example: &Value,
    options: &NeighborOptions,
) -> Result<Vec<Neighbor>> {
    let restrictions = Restrictions {
        edges: options.edge_collection_restriction.clone(),
        start_vertices: options.start_vertex_collection_restriction.clone(),
        ..Restrictions::default()
    };
    let collections = graph.collections(options.direction, &restrictions);
    let starts = select_vertices(datasource, &collections.start, vertex_example)?;

    let traversal = options.traversal_options();
    if !traversal.examples_valid() {
        return Ok(Vec::new());
    }
    let traverser = Traverser::new(traversal.to_config(options.direction))?;
    let source = EdgeSource::new(datasource, graph.edge_collections())?;

    let mut found = Vec::new();
    for start in starts {
        found.extend(traverser.traverse(&source, &mut NeighborVisitor, start, None)?);
    }

    let neighbor_examples = options.neighbor_examples.as_ref().map(|examples| match examples {
        Value::String(id) => {
            let mut example = Object::new();
            example.insert(document::ID.into(), Value::String(id.clone()));
            Value::Object(example)
        }
        other => other.clone(),
    });
    Ok(compare::filter_by_example(found, neighbor_examples.as_ref(), |n| n.vertex.to_value()))
}

/// Distinct edges on the paths to the neighbors of the selected vertices.
pub fn graph_edges<D: Datasource + ?Sized>(
    datasource: &D,
    graph: &GraphDefinition,
    vertex_example: &Value,
    options: &NeighborOptions,
) -> Result<Vec<Edge>> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for neighbor in graph_neighbors(datasource, graph, vertex_example, options)? {
        for edge in neighbor.path.into_edges() {
            if seen.insert(edge.id.clone()) {
                out.push(edge);
            }
        }
    }
    Ok(out)
}

/// Options of [`graph_vertices`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VertexOptions {
    pub direction: Direction,
    pub vertex_collection_restriction: Option<CollectionRestriction>,
}

impl Default for VertexOptions {
    fn default() -> Self {
        Self { direction: Direction::Any, vertex_collection_restriction: None }
    }
}

/// Vertices of the graph selected by `vertex_example`.
///
/// For `any`, a collection restriction also admits orphan collections.
pub fn graph_vertices<D: Datasource + ?Sized>(
    datasource: &D,
    graph: &GraphDefinition,
    vertex_example: &Value,
    options: &VertexOptions,
) -> Result<Vec<Vertex>> {
    let mut restrictions = Restrictions::default();
    if let Some(restriction) = &options.vertex_collection_restriction {
        match options.direction {
            Direction::Inbound => restrictions.end_vertices = Some(restriction.clone()),
            Direction::Outbound => restrictions.start_vertices = Some(restriction.clone()),
            Direction::Any => {
                restrictions.start_vertices = Some(restriction.clone());
                restrictions.end_vertices = Some(restriction.clone());
                restrictions.orphans = Some(restriction.clone());
                restrictions.include_orphans = true;
            }
        }
    }
    let collections = graph.collections(options.direction, &restrictions);
    select_vertices(datasource, &collections.start, vertex_example)
}

// ============================================================================
// Common neighbors
// ============================================================================

/// Neighbors shared by pairs of distinct start vertices:
/// `first start -> second start -> common neighbors`.
pub type CommonNeighbors = IndexMap<DocumentId, IndexMap<DocumentId, Vec<Vertex>>>;

/// Vertices that are neighbors of a vertex selected by `first` and of a
/// different vertex selected by `second`.
pub fn graph_common_neighbors<D: Datasource + ?Sized>(
    datasource: &D,
    graph: &GraphDefinition,
    first: (&Value, &NeighborOptions),
    second: (&Value, &NeighborOptions),
) -> Result<CommonNeighbors> {
    let left = starts_by_neighbor(graph_neighbors(datasource, graph, first.0, first.1)?);
    let right = starts_by_neighbor(graph_neighbors(datasource, graph, second.0, second.1)?);

    let mut out = CommonNeighbors::new();
    for (id, (vertex, left_starts)) in &left {
        let Some((_, right_starts)) = right.get(id) else {
            continue;
        };
        for s1 in left_starts {
            for s2 in right_starts.iter().filter(|s2| *s2 != s1) {
                out.entry(s1.clone())
                    .or_default()
                    .entry(s2.clone())
                    .or_default()
                    .push(vertex.clone());
            }
        }
    }
    Ok(out)
}

/// Neighbor vertex -> the distinct start vertices that reached it.
fn starts_by_neighbor(found: Vec<Neighbor>) -> IndexMap<DocumentId, (Vertex, Vec<DocumentId>)> {
    let mut grouped: IndexMap<DocumentId, (Vertex, Vec<DocumentId>)> = IndexMap::new();
    for neighbor in found {
        let (_, starts) = grouped
            .entry(neighbor.vertex.id.clone())
            .or_insert_with(|| (neighbor.vertex.clone(), Vec::new()));
        if !starts.contains(&neighbor.start_vertex) {
            starts.push(neighbor.start_vertex);
        }
    }
    grouped
}
