//! Caller-facing traversal options.
//!
//! Deserialized from the same JSON option objects the query functions
//! accept, e.g. `{"maxDepth": 3, "uniqueness": {"vertices": "global"}}`.

use serde::{Deserialize, Serialize};

use crate::graph::CollectionRestriction;
use crate::model::{Direction, Value};
use crate::shortest_path::EdgeWeight;
use crate::Result;
use super::{
    EdgeExampleFilter, ExampleVertexFilter, FilterOutcome, ItemOrder, Order, Strategy,
    TraversalConfig, Uniqueness, DEFAULT_MAX_DEPTH,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TraversalOptions {
    /// Report the path along with each vertex.
    pub paths: bool,
    pub min_depth: usize,
    /// Defaults to [`DEFAULT_MAX_DEPTH`].
    pub max_depth: Option<usize>,
    pub max_iterations: Option<usize>,
    pub uniqueness: Uniqueness,
    pub strategy: Strategy,
    pub order: Order,
    pub item_order: ItemOrder,
    /// Edge examples; only matching edges are followed.
    pub follow_edges: Option<Value>,
    pub edge_collection_restriction: Option<CollectionRestriction>,
    /// Vertex examples; non-matching vertices get `vertex_filter_method`.
    pub filter_vertices: Option<Value>,
    pub vertex_filter_method: Option<Vec<String>>,
    pub filter_vertex_collections: Option<CollectionRestriction>,
    /// Edge attribute holding the edge length.
    pub weight: Option<String>,
    pub default_weight: Option<f64>,
    #[serde(rename = "_sort")]
    pub sort: bool,
}

impl TraversalOptions {
    /// Parse options from a JSON object. `null` yields the defaults.
    pub fn from_json(options: serde_json::Value) -> Result<Self> {
        if options.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(options)?)
    }

    /// `followEdges` and `filterVertices` must be non-empty lists of
    /// objects. Violations are logged and make the whole call yield nothing.
    pub fn examples_valid(&self) -> bool {
        [("followEdges", &self.follow_edges), ("filterVertices", &self.filter_vertices)]
            .into_iter()
            .all(|(name, examples)| match examples {
                None => true,
                Some(Value::Array(items))
                    if !items.is_empty() && items.iter().all(Value::is_object) =>
                {
                    true
                }
                Some(other) => {
                    tracing::warn!(option = name, got = other.type_name(), "expected a non-empty list of example objects");
                    false
                }
            })
    }

    /// Edge length function implied by `weight` and `defaultWeight`.
    pub fn edge_weight(&self) -> EdgeWeight {
        EdgeWeight::new(self.weight.clone(), self.default_weight)
    }

    /// Build the run configuration for `direction`.
    pub fn to_config(&self, direction: Direction) -> TraversalConfig {
        let mut config = TraversalConfig::new(direction)
            .min_depth(self.min_depth)
            .max_depth(Some(self.max_depth.unwrap_or(DEFAULT_MAX_DEPTH)))
            .max_iterations(self.max_iterations)
            .strategy(self.strategy)
            .order(self.order)
            .item_order(self.item_order)
            .sort_edges(self.sort)
            .distance(self.edge_weight());
        config.uniqueness = self.uniqueness;

        if self.follow_edges.is_some() || self.edge_collection_restriction.is_some() {
            config = config.expand_filter(EdgeExampleFilter::new(
                self.follow_edges.clone(),
                self.edge_collection_restriction.clone().map(CollectionRestriction::into_vec),
            ));
        }
        if self.filter_vertices.is_some() || self.filter_vertex_collections.is_some() {
            let method = match &self.vertex_filter_method {
                Some(methods) => FilterOutcome::from_methods(methods.iter().map(String::as_str)),
                None => FilterOutcome::EXCLUDE_AND_PRUNE,
            };
            config = config.vertex_filter(ExampleVertexFilter::new(
                self.filter_vertices.clone(),
                method,
                self.filter_vertex_collections.clone().map(CollectionRestriction::into_vec),
            ));
        }
        config
    }
}
