//! Enumeration of every path up to a length bound.

use serde::{Deserialize, Serialize};

use crate::model::{Direction, Edge, Object, Path, Value, Vertex};
use crate::storage::Datasource;
use crate::traversal::{
    visitor_fn, Control, TraversalConfig, Traverser, UniquenessLevel, Visit,
};
use crate::Result;
use super::{EdgeSource, GraphDefinition, Restrictions};

/// Options of [`paths`] and [`graph_paths`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PathsOptions {
    pub direction: Direction,
    /// Allow a path to revisit a vertex. Length stays bounded by `max_length`.
    pub follow_cycles: bool,
    pub min_length: usize,
    pub max_length: usize,
}

impl Default for PathsOptions {
    fn default() -> Self {
        Self { direction: Direction::Outbound, follow_cycles: false, min_length: 0, max_length: 10 }
    }
}

/// One enumerated path with its end points.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphPath {
    pub path: Path,
}

impl GraphPath {
    pub fn source(&self) -> &Vertex {
        self.path.start()
    }

    pub fn destination(&self) -> &Vertex {
        self.path.end()
    }

    /// `{"vertices": [...], "edges": [...], "source": ..., "destination": ...}`
    pub fn to_value(&self) -> Value {
        let mut out = match self.path.to_value() {
            Value::Object(members) => members,
            _ => Object::new(),
        };
        out.insert("source".into(), self.source().to_value());
        out.insert("destination".into(), self.destination().to_value());
        Value::Object(out)
    }
}

/// Every path starting at one of `starts` over `edge_collections`.
///
/// Paths shorter than `min_length` edges are not reported. Self-loops are
/// never followed.
#[tracing::instrument(level = "debug", skip(datasource, starts), fields(starts = starts.len()))]
pub fn paths<D: Datasource + ?Sized>(
    datasource: &D,
    starts: Vec<Vertex>,
    edge_collections: &[String],
    options: &PathsOptions,
) -> Result<Vec<GraphPath>> {
    let uniqueness = if options.follow_cycles {
        UniquenessLevel::None
    } else {
        UniquenessLevel::Path
    };
    let config = TraversalConfig::new(options.direction)
        .min_depth(options.min_length)
        .max_depth(Some(options.max_length))
        .uniqueness(uniqueness, uniqueness)
        .expand_filter(|config: &TraversalConfig, vertex: &Vertex, edge: &Edge, _: &Path| {
            edge.target(&vertex.id, config.direction) != Some(&vertex.id)
        });
    let traverser = Traverser::new(config)?;
    let source = EdgeSource::new(datasource, edge_collections.iter().cloned())?;

    let mut collect = visitor_fn(|visit: &Visit<'_>, out: &mut Vec<GraphPath>| {
        out.push(GraphPath { path: visit.path.clone() });
        Control::Continue
    });
    let mut found = Vec::new();
    for start in starts {
        found.extend(traverser.traverse(&source, &mut collect, start, None)?);
    }
    Ok(found)
}

/// [`paths`] from every vertex of the graph's start collections for the
/// direction: `from` collections for outbound, `to` for inbound, both for any.
pub fn graph_paths<D: Datasource + ?Sized>(
    datasource: &D,
    graph: &GraphDefinition,
    options: &PathsOptions,
) -> Result<Vec<GraphPath>> {
    let collections = graph.collections(options.direction, &Restrictions::default());
    let mut starts = Vec::new();
    for name in &collections.start {
        starts.extend(datasource.documents(name)?.into_iter().filter_map(Vertex::from_document));
    }
    paths(datasource, starts, &collections.edges, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EdgeDefinition;
    use crate::storage::{CollectionKind, MemoryStore};
    use crate::Error;
    use serde_json::json;

    /// a -> b -> c -> a, plus a self-loop on b
    fn store() -> (MemoryStore, GraphDefinition) {
        let store = MemoryStore::new();
        store.create_collection("v", CollectionKind::Document).unwrap();
        store.create_collection("e", CollectionKind::Edge).unwrap();
        for key in ["a", "b", "c"] {
            store.insert("v", json!({"_key": key})).unwrap();
        }
        for (from, to) in [("a", "b"), ("b", "c"), ("c", "a"), ("b", "b")] {
            store.insert("e", json!({"_from": format!("v/{from}"), "_to": format!("v/{to}")})).unwrap();
        }
        let graph = GraphDefinition::new("cycle", vec![EdgeDefinition::new("e", ["v"], ["v"])]);
        (store, graph)
    }

    fn ends(found: &[GraphPath]) -> Vec<(String, String)> {
        found
            .iter()
            .map(|p| (p.source().id.key().to_owned(), p.destination().id.key().to_owned()))
            .collect()
    }

    #[test]
    fn test_paths_without_cycles() {
        let (s, g) = store();
        let found = graph_paths(&s, &g, &PathsOptions { min_length: 1, ..PathsOptions::default() }).unwrap();
        // each vertex reaches the other two, the self-loop is ignored
        assert_eq!(found.len(), 6);
        assert!(found.iter().all(|p| p.path.len() <= 2));
        let ends = ends(&found);
        assert_eq!(ends[0], ("a".to_owned(), "b".to_owned()));
        assert_eq!(ends[1], ("a".to_owned(), "c".to_owned()));
    }

    #[test]
    fn test_zero_length_paths_included_by_default() {
        let (s, g) = store();
        let found = graph_paths(&s, &g, &PathsOptions::default()).unwrap();
        assert_eq!(found.iter().filter(|p| p.path.is_empty()).count(), 3);
        let value = found[0].to_value();
        assert_eq!(value.get("source").get("_key"), &Value::from("a"));
        assert_eq!(value.get("edges"), &Value::Array(Vec::new()));
    }

    #[test]
    fn test_follow_cycles_bounded_by_max_length() {
        let (s, g) = store();
        let options = PathsOptions { follow_cycles: true, min_length: 4, max_length: 4, ..PathsOptions::default() };
        let found = graph_paths(&s, &g, &options).unwrap();
        assert_eq!(found.len(), 3);
        assert_eq!(found[0].destination().id.key(), "b");
    }

    #[test]
    fn test_inconsistent_lengths_rejected() {
        let (s, g) = store();
        let options = PathsOptions { min_length: 3, max_length: 1, ..PathsOptions::default() };
        assert!(matches!(graph_paths(&s, &g, &options), Err(Error::InvalidArgument(_))));
    }
}
