//! Immutable per-run traversal configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{Direction, Edge};
use crate::{Error, Result};
use super::filter::{ExpandFilter, VertexFilter};

/// Depth bound applied when callers do not supply one.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Revisit policy for vertices or edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UniquenessLevel {
    /// Revisit freely.
    #[default]
    None,
    /// Never twice on the same path.
    Path,
    /// Never twice in the whole run.
    Global,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Uniqueness {
    pub vertices: UniquenessLevel,
    pub edges: UniquenessLevel,
}

impl Default for Uniqueness {
    fn default() -> Self {
        Self { vertices: UniquenessLevel::None, edges: UniquenessLevel::Path }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[default]
    DepthFirst,
    BreadthFirst,
    /// Settle vertices in order of increasing path distance.
    Dijkstra,
}

/// When a vertex is reported relative to its descendants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    #[default]
    PreOrder,
    PostOrder,
}

/// Order in which the edges of one vertex are expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemOrder {
    #[default]
    Forward,
    Backward,
}

/// Length of an edge for the `Dijkstra` strategy.
pub trait EdgeDistance {
    fn distance(&self, edge: &Edge) -> f64;
}

impl<F> EdgeDistance for F
where
    F: Fn(&Edge) -> f64,
{
    fn distance(&self, edge: &Edge) -> f64 {
        self(edge)
    }
}

/// Configuration for one traversal run.
///
/// Built once from caller options, validated by
/// [`Traverser::new`](super::Traverser::new), then consumed by a single run.
pub struct TraversalConfig {
    pub direction: Direction,
    pub min_depth: usize,
    /// `None` is unbounded.
    pub max_depth: Option<usize>,
    /// Visited-vertex budget. Exceeding it fails the run.
    pub max_iterations: Option<usize>,
    pub uniqueness: Uniqueness,
    pub strategy: Strategy,
    pub order: Order,
    pub item_order: ItemOrder,
    /// Expand edges sorted by `_key` before `item_order` applies.
    pub sort_edges: bool,
    pub(crate) vertex_filters: Vec<Box<dyn VertexFilter>>,
    pub(crate) expand_filters: Vec<Box<dyn ExpandFilter>>,
    pub(crate) distance: Option<Box<dyn EdgeDistance>>,
}

impl TraversalConfig {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            min_depth: 0,
            max_depth: Some(DEFAULT_MAX_DEPTH),
            max_iterations: None,
            uniqueness: Uniqueness::default(),
            strategy: Strategy::default(),
            order: Order::default(),
            item_order: ItemOrder::default(),
            sort_edges: false,
            vertex_filters: Vec::new(),
            expand_filters: Vec::new(),
            distance: None,
        }
    }

    pub fn min_depth(mut self, depth: usize) -> Self {
        self.min_depth = depth;
        self
    }

    pub fn max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn max_iterations(mut self, limit: Option<usize>) -> Self {
        self.max_iterations = limit;
        self
    }

    pub fn uniqueness(mut self, vertices: UniquenessLevel, edges: UniquenessLevel) -> Self {
        self.uniqueness = Uniqueness { vertices, edges };
        self
    }

    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    pub fn item_order(mut self, item_order: ItemOrder) -> Self {
        self.item_order = item_order;
        self
    }

    pub fn sort_edges(mut self, sort: bool) -> Self {
        self.sort_edges = sort;
        self
    }

    /// Add a vertex filter. Outcomes of all filters are combined.
    pub fn vertex_filter(mut self, filter: impl VertexFilter + 'static) -> Self {
        self.vertex_filters.push(Box::new(filter));
        self
    }

    /// Add an expand filter. An edge is followed only if every filter admits it.
    pub fn expand_filter(mut self, filter: impl ExpandFilter + 'static) -> Self {
        self.expand_filters.push(Box::new(filter));
        self
    }

    pub fn distance(mut self, distance: impl EdgeDistance + 'static) -> Self {
        self.distance = Some(Box::new(distance));
        self
    }

    /// Length of `edge`. Unit length without a distance function.
    pub fn edge_distance(&self, edge: &Edge) -> f64 {
        self.distance.as_ref().map_or(1.0, |d| d.distance(edge))
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if let Some(max) = self.max_depth {
            if self.min_depth > max {
                return Err(Error::InvalidArgument(format!(
                    "minDepth {} exceeds maxDepth {max}",
                    self.min_depth
                )));
            }
        }
        if self.strategy == Strategy::Dijkstra && self.order == Order::PostOrder {
            return Err(Error::InvalidArgument(
                "postorder is not supported with the dijkstra strategy".into(),
            ));
        }
        if self.max_iterations == Some(0) {
            return Err(Error::InvalidArgument("maxIterations must be positive".into()));
        }
        Ok(())
    }
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self::new(Direction::Outbound)
    }
}

impl fmt::Debug for TraversalConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraversalConfig")
            .field("direction", &self.direction)
            .field("min_depth", &self.min_depth)
            .field("max_depth", &self.max_depth)
            .field("max_iterations", &self.max_iterations)
            .field("uniqueness", &self.uniqueness)
            .field("strategy", &self.strategy)
            .field("order", &self.order)
            .field("item_order", &self.item_order)
            .field("vertex_filters", &self.vertex_filters.len())
            .field("expand_filters", &self.expand_filters.len())
            .field("distance", &self.distance.is_some())
            .finish()
    }
}
