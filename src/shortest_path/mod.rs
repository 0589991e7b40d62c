//! # Shortest Paths
//!
//! Two algorithms over the same edge-length rule:
//!
//! | Algorithm | Module | Use |
//! |-----------|--------|-----|
//! | Dijkstra | `dijkstra` | few sources, explicit targets |
//! | Floyd–Warshall | `floyd_warshall` | every pair of a vertex set |
//!
//! ## Edge length
//!
//! | `weight` | Edge value | Length |
//! |----------|------------|--------|
//! | unset | any | `1` |
//! | set | number | that number |
//! | set | missing or not a number | `defaultWeight`, else `+Infinity` |
//!
//! Edges with an infinite or negative length are never part of a path.

pub mod dijkstra;
pub mod floyd_warshall;

pub use dijkstra::{Dijkstra, Targets};
pub use floyd_warshall::{FloydWarshall, PathTable};

use serde::{Deserialize, Serialize};

use crate::graph::{
    is_example_set, select_vertices, CollectionRestriction, EdgeSource, GraphDefinition,
    Restrictions,
};
use crate::model::{Direction, DocumentId, Edge, Object, Path, Value, Vertex};
use crate::storage::Datasource;
use crate::traversal::EdgeDistance;
use crate::Result;

// ============================================================================
// Edge length
// ============================================================================

/// Edge length read from an edge attribute.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeWeight {
    field: Option<String>,
    default_weight: Option<f64>,
}

impl EdgeWeight {
    /// An empty field name counts as no field.
    pub fn new(field: Option<String>, default_weight: Option<f64>) -> Self {
        Self { field: field.filter(|f| !f.is_empty()), default_weight }
    }

    /// Every edge has length `1`.
    pub fn unit() -> Self {
        Self::default()
    }
}

impl EdgeDistance for EdgeWeight {
    fn distance(&self, edge: &Edge) -> f64 {
        let Some(field) = &self.field else {
            return 1.0;
        };
        edge.get(field)
            .as_f64()
            .or(self.default_weight)
            .unwrap_or(f64::INFINITY)
    }
}

/// Whether `weight` can be part of a path.
pub(crate) fn usable(weight: f64) -> bool {
    weight.is_finite() && weight >= 0.0
}

// ============================================================================
// Options
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Algorithm {
    #[serde(rename = "dijkstra", alias = "Dijkstra")]
    Dijkstra,
    #[serde(rename = "Floyd-Warshall", alias = "floyd-warshall")]
    FloydWarshall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShortestPathOptions {
    pub direction: Direction,
    /// Edge attribute holding the edge length.
    pub weight: Option<String>,
    pub default_weight: Option<f64>,
    /// Only edges matching these examples are used.
    pub edge_examples: Option<Value>,
    pub edge_collection_restriction: Option<CollectionRestriction>,
    pub start_vertex_collection_restriction: Option<CollectionRestriction>,
    pub end_vertex_collection_restriction: Option<CollectionRestriction>,
    /// Chosen from the vertex examples when unset.
    pub algorithm: Option<Algorithm>,
    /// Report distances only.
    pub no_paths: bool,
    /// Keep only the overall closest result.
    pub stop_at_first_match: bool,
    /// Cap on equal-length paths recorded per vertex pair by Floyd–Warshall.
    pub max_paths_per_pair: Option<usize>,
    /// Vertex budget of each Dijkstra run.
    pub max_iterations: Option<usize>,
}

impl Default for ShortestPathOptions {
    fn default() -> Self {
        Self {
            direction: Direction::Any,
            weight: None,
            default_weight: None,
            edge_examples: None,
            edge_collection_restriction: None,
            start_vertex_collection_restriction: None,
            end_vertex_collection_restriction: None,
            algorithm: None,
            no_paths: false,
            stop_at_first_match: false,
            max_paths_per_pair: None,
            max_iterations: None,
        }
    }
}

impl ShortestPathOptions {
    pub fn from_json(options: serde_json::Value) -> Result<Self> {
        if options.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(options)?)
    }

    pub fn edge_weight(&self) -> EdgeWeight {
        EdgeWeight::new(self.weight.clone(), self.default_weight)
    }

    pub(crate) fn restrictions(&self) -> Restrictions {
        Restrictions {
            edges: self.edge_collection_restriction.clone(),
            start_vertices: self.start_vertex_collection_restriction.clone(),
            end_vertices: self.end_vertex_collection_restriction.clone(),
            ..Restrictions::default()
        }
    }
}

// ============================================================================
// Results
// ============================================================================

/// Shortest connection from `start_vertex` to `vertex`.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortestPathResult {
    pub start_vertex: DocumentId,
    pub vertex: Vertex,
    pub distance: f64,
    /// `None` when paths were not requested.
    pub path: Option<Path>,
}

impl ShortestPathResult {
    /// `{"startVertex", "vertex", "distance", "path", "paths"}`
    pub fn to_value(&self) -> Value {
        let mut out = Object::new();
        out.insert("startVertex".into(), Value::from(self.start_vertex.as_str()));
        out.insert("vertex".into(), self.vertex.to_value());
        out.insert("distance".into(), Value::from(self.distance));
        let path = self.path.as_ref().map(Path::to_value);
        out.insert("paths".into(), path.clone().map_or(Value::Null, |p| Value::Array(vec![p])));
        out.insert("path".into(), Value::from(path));
        Value::Object(out)
    }

    /// Vertex ids along the path.
    pub fn vertex_ids(&self) -> Vec<&DocumentId> {
        self.path
            .iter()
            .flat_map(|p| p.vertices().map(|v| &v.id))
            .collect()
    }
}

/// The first result with the smallest distance, if any.
pub fn closest(results: Vec<ShortestPathResult>) -> Option<ShortestPathResult> {
    results
        .into_iter()
        .reduce(|best, next| if next.distance < best.distance { next } else { best })
}

// ============================================================================
// Entry points
// ============================================================================

/// Shortest path between two vertices over one edge collection.
pub fn shortest_path<D: Datasource + ?Sized>(
    datasource: &D,
    edge_collection: &str,
    start: Vertex,
    end: &DocumentId,
    options: &ShortestPathOptions,
) -> Result<Option<ShortestPathResult>> {
    let source = EdgeSource::new(datasource, [edge_collection])?;
    let Some(dijkstra) = Dijkstra::from_options(options)? else {
        return Ok(None);
    };
    let mut found = dijkstra.run(&source, start, Targets::One(end))?;
    Ok(found.pop())
}

/// Shortest paths between the vertices selected by two examples.
///
/// Floyd–Warshall runs when neither example narrows the selection,
/// Dijkstra otherwise; `algorithm` overrides the choice.
#[tracing::instrument(level = "debug", skip_all, fields(graph = %graph.name, direction = %options.direction))]
pub fn graph_shortest_path<D: Datasource + ?Sized>(
    datasource: &D,
    graph: &GraphDefinition,
    start_example: &Value,
    end_example: &Value,
    options: &ShortestPathOptions,
) -> Result<Vec<ShortestPathResult>> {
    let collections = graph.collections(options.direction, &options.restrictions());
    let starts = select_vertices(datasource, &collections.start, start_example)?;
    let targets = select_vertices(datasource, &collections.end, end_example)?;

    let algorithm = options.algorithm.unwrap_or(
        if is_example_set(start_example) || is_example_set(end_example) {
            Algorithm::Dijkstra
        } else {
            Algorithm::FloydWarshall
        },
    );
    tracing::debug!(?algorithm, starts = starts.len(), targets = targets.len(), "shortest paths");

    let results = match algorithm {
        Algorithm::FloydWarshall => {
            let edges = load_edges(datasource, &collections.edges, options)?;
            FloydWarshall::from_options(options).run(datasource, &starts, &targets, &edges)
        }
        Algorithm::Dijkstra => {
            let Some(dijkstra) = Dijkstra::from_options(options)? else {
                return Ok(Vec::new());
            };
            let source = EdgeSource::new(datasource, collections.edges.iter().cloned())?;
            dijkstra.run_all(&source, starts, &targets)?
        }
    };

    if options.stop_at_first_match {
        return Ok(closest(results).into_iter().collect());
    }
    Ok(results)
}

/// Every edge of `collections` that matches the edge examples of `options`.
pub(crate) fn load_edges<D: Datasource + ?Sized>(
    datasource: &D,
    collections: &[String],
    options: &ShortestPathOptions,
) -> Result<Vec<Edge>> {
    let mut edges = Vec::new();
    for name in collections {
        datasource.resolve_edge_collection(name)?;
        edges.extend(datasource.documents(name)?.into_iter().filter_map(Edge::from_document));
    }
    Ok(crate::compare::filter_by_example(edges, options.edge_examples.as_ref(), Edge::to_value))
}

/// [`graph_shortest_path`] without path reconstruction.
pub fn graph_distance_to<D: Datasource + ?Sized>(
    datasource: &D,
    graph: &GraphDefinition,
    start_example: &Value,
    end_example: &Value,
    options: &ShortestPathOptions,
) -> Result<Vec<ShortestPathResult>> {
    let options = ShortestPathOptions { no_paths: true, ..options.clone() };
    graph_shortest_path(datasource, graph, start_example, end_example, &options)
}

/// Shortest paths from every vertex of `from` to every vertex of `to`.
pub fn all_pairs_shortest_path<D: Datasource + ?Sized>(
    datasource: &D,
    from: &[Vertex],
    to: &[Vertex],
    edges: &[Edge],
    options: &ShortestPathOptions,
) -> Vec<ShortestPathResult> {
    FloydWarshall::from_options(options).run(datasource, from, to, edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn edge(members: serde_json::Value) -> Edge {
        let Value::Object(doc) = Value::from(members) else { unreachable!() };
        Edge::from_document(doc).unwrap()
    }

    #[test]
    fn test_edge_weight_rule() {
        let weighted = edge(json!({"_id": "e/1", "_from": "v/a", "_to": "v/b", "w": 4}));
        let bare = edge(json!({"_id": "e/2", "_from": "v/a", "_to": "v/b", "w": "x"}));

        assert_eq!(EdgeWeight::unit().distance(&weighted), 1.0);
        assert_eq!(EdgeWeight::new(Some("w".into()), None).distance(&weighted), 4.0);
        assert_eq!(EdgeWeight::new(Some("w".into()), Some(7.0)).distance(&bare), 7.0);
        assert_eq!(EdgeWeight::new(Some("w".into()), None).distance(&bare), f64::INFINITY);
        assert_eq!(EdgeWeight::new(Some(String::new()), None).distance(&bare), 1.0);
    }

    #[test]
    fn test_options_parse() {
        let options = ShortestPathOptions::from_json(json!({
            "direction": "outbound",
            "weight": "distance",
            "defaultWeight": 2,
            "algorithm": "Floyd-Warshall",
            "edgeCollectionRestriction": ["roads"],
        }))
        .unwrap();
        assert_eq!(options.direction, Direction::Outbound);
        assert_eq!(options.algorithm, Some(Algorithm::FloydWarshall));
        assert_eq!(options.edge_weight(), EdgeWeight::new(Some("distance".into()), Some(2.0)));
        assert_eq!(ShortestPathOptions::from_json(serde_json::Value::Null).unwrap().direction, Direction::Any);
    }

    #[test]
    fn test_closest_keeps_first_tie() {
        let vertex = |key: &str| {
            let Value::Object(doc) = Value::from(json!({"_id": format!("v/{key}")})) else { unreachable!() };
            Vertex::from_document(doc).unwrap()
        };
        let result = |key: &str, distance: f64| ShortestPathResult {
            start_vertex: DocumentId::new("v", "s"),
            vertex: vertex(key),
            distance,
            path: None,
        };
        let best = closest(vec![result("a", 3.0), result("b", 1.0), result("c", 1.0)]).unwrap();
        assert_eq!(best.vertex.id.key(), "b");
        assert!(closest(Vec::new()).is_none());
        assert_eq!(result("a", 3.0).to_value().get("paths"), &Value::Null);
    }
}
