//! # Named Graphs
//!
//! A named graph is a set of edge definitions (`edge collection`, `from`
//! vertex collections, `to` vertex collections) plus orphan vertex
//! collections. Graph functions resolve a graph name into concrete
//! collections for a direction, then select start/end vertices by example.

pub mod neighbors;
pub mod paths;
pub mod selector;
pub mod source;

pub use neighbors::{
    graph_common_neighbors, graph_edges, graph_neighbors, graph_vertices, CommonNeighbors,
    EdgeNeighbor, NeighborOptions, VertexOptions,
};
pub use paths::{graph_paths, paths, GraphPath, PathsOptions};
pub use selector::{is_example_set, select_vertices};
pub use source::EdgeSource;

use serde::{Deserialize, Serialize};

use crate::model::Direction;
use crate::storage::Datasource;
use crate::{Error, Result};

// ============================================================================
// Definitions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeDefinition {
    pub collection: String,
    pub from: Vec<String>,
    pub to: Vec<String>,
}

impl EdgeDefinition {
    pub fn new(
        collection: impl Into<String>,
        from: impl IntoIterator<Item = impl Into<String>>,
        to: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            collection: collection.into(),
            from: from.into_iter().map(Into::into).collect(),
            to: to.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphDefinition {
    pub name: String,
    pub edge_definitions: Vec<EdgeDefinition>,
    #[serde(default)]
    pub orphan_collections: Vec<String>,
}

impl GraphDefinition {
    pub fn new(name: impl Into<String>, edge_definitions: Vec<EdgeDefinition>) -> Self {
        Self { name: name.into(), edge_definitions, orphan_collections: Vec::new() }
    }

    pub fn with_orphans(mut self, orphans: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.orphan_collections = orphans.into_iter().map(Into::into).collect();
        self
    }

    /// Every vertex collection, orphans included, without duplicates.
    pub fn vertex_collections(&self) -> Vec<String> {
        let all = self
            .edge_definitions
            .iter()
            .flat_map(|def| def.from.iter().chain(&def.to))
            .chain(&self.orphan_collections);
        dedup(all.cloned())
    }

    pub fn edge_collections(&self) -> Vec<String> {
        dedup(self.edge_definitions.iter().map(|def| def.collection.clone()))
    }

    /// Check that every named collection exists with the right kind.
    pub fn validate<D: Datasource + ?Sized>(&self, datasource: &D) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::InvalidArgument("graph name must not be empty".into()));
        }
        for name in self.edge_collections() {
            datasource.resolve_edge_collection(&name)?;
        }
        for name in self.vertex_collections() {
            if datasource.resolve_collection(&name)?.is_edge() {
                return Err(Error::TypeError {
                    expected: "document collection".into(),
                    got: format!("edge collection '{name}'"),
                });
            }
        }
        Ok(())
    }

    /// Collections a graph function works on for `direction`.
    ///
    /// Start collections are the `from` side for outbound, the `to` side for
    /// inbound, and both for any. End collections mirror that.
    pub fn collections(&self, direction: Direction, restrictions: &Restrictions) -> GraphCollections {
        let mut out = GraphCollections::default();
        for def in &self.edge_definitions {
            let both: Vec<String> = def.from.iter().chain(&def.to).cloned().collect();
            let (start, end) = match direction {
                Direction::Outbound => (&def.from, &def.to),
                Direction::Inbound => (&def.to, &def.from),
                Direction::Any => (&both, &both),
            };
            out.edges.extend(restrict(std::slice::from_ref(&def.collection), &restrictions.edges));
            out.start.extend(restrict(start, &restrictions.start_vertices));
            out.end.extend(restrict(end, &restrictions.end_vertices));
        }
        if restrictions.include_orphans {
            out.start.extend(restrict(&self.orphan_collections, &restrictions.orphans));
        }
        out.edges = dedup(out.edges);
        out.start = dedup(out.start);
        out.end = dedup(out.end);
        out
    }
}

/// Look up a named graph.
pub fn resolve_graph<D: Datasource + ?Sized>(datasource: &D, name: &str) -> Result<GraphDefinition> {
    datasource
        .graph(name)
        .ok_or_else(|| Error::NotFound(format!("graph '{name}'")))
}

// ============================================================================
// Collection restrictions
// ============================================================================

/// One collection name or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CollectionRestriction {
    One(String),
    Many(Vec<String>),
}

impl CollectionRestriction {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            CollectionRestriction::One(name) => vec![name],
            CollectionRestriction::Many(names) => names,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        match self {
            CollectionRestriction::One(one) => one == name,
            CollectionRestriction::Many(names) => names.iter().any(|n| n == name),
        }
    }
}

/// Narrowing applied when resolving graph collections.
#[derive(Debug, Clone, Default)]
pub struct Restrictions {
    pub edges: Option<CollectionRestriction>,
    pub start_vertices: Option<CollectionRestriction>,
    pub end_vertices: Option<CollectionRestriction>,
    pub orphans: Option<CollectionRestriction>,
    pub include_orphans: bool,
}

/// Concrete collections resolved from a graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphCollections {
    pub start: Vec<String>,
    pub end: Vec<String>,
    pub edges: Vec<String>,
}

/// Keep the members of `list` named by `restriction`, in restriction order.
fn restrict(list: &[String], restriction: &Option<CollectionRestriction>) -> Vec<String> {
    match restriction {
        None => list.to_vec(),
        Some(r) => r
            .clone()
            .into_vec()
            .into_iter()
            .filter(|name| list.contains(name))
            .collect(),
    }
}

fn dedup(names: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in names {
        if !out.contains(&name) {
            out.push(name);
        }
    }
    out
}
