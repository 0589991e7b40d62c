//! # Traversal Engine
//!
//! A configurable walk over a [`TraversalSource`], starting at one vertex.
//!
//! ## Per visited vertex
//!
//! 1. The vertex filters decide `exclude` and `prune` independently.
//! 2. If not excluded and the depth is at least `min_depth`, the visitor runs
//!    (before the descendants for pre-order, after them for post-order).
//! 3. Unless pruned, and while the depth is below `max_depth`, the vertex's
//!    edges are expanded: item order, expand filters, then the uniqueness
//!    policy decide which neighbors are entered.
//!
//! ## Strategies
//!
//! | Strategy | Frontier | Post-order |
//! |----------|----------|------------|
//! | `DepthFirst` | explicit stack | after all descendants |
//! | `BreadthFirst` | FIFO queue | deepest level first |
//! | `Dijkstra` | min-heap on path distance | not supported |
//!
//! A neighbor whose document no longer exists is skipped; the rest of the run
//! continues. Exceeding `max_iterations` fails the run with
//! [`Error::TooManyIterations`].

pub mod config;
pub mod filter;
pub mod options;
pub mod visitor;

pub use config::{
    DEFAULT_MAX_DEPTH, EdgeDistance, ItemOrder, Order, Strategy, TraversalConfig, Uniqueness,
    UniquenessLevel,
};
pub use filter::{EdgeExampleFilter, ExampleVertexFilter, ExpandFilter, FilterOutcome, VertexFilter};
pub use options::TraversalOptions;
pub use visitor::{
    Control, CountingVisitor, DistanceVisitor, FnVisitor, Neighbor, NeighborVisitor, PathVisitor,
    TreeVisitor, Visit, Visitor, visitor_fn,
};

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, VecDeque};

use hashbrown::{HashMap, HashSet};

use crate::model::{Direction, DocumentId, Edge, Path, Vertex};
use crate::{Error, Result};

// ============================================================================
// Source
// ============================================================================

/// Where a traversal reads vertices and edges from.
pub trait TraversalSource {
    /// The vertex document, or `None` for a dangling reference.
    fn vertex(&self, id: &DocumentId) -> Option<Vertex>;

    /// Edges connected to `vertex` in `direction`.
    fn edges(&self, vertex: &Vertex, direction: Direction) -> Result<Vec<Edge>>;
}

// ============================================================================
// Traverser
// ============================================================================

/// A validated traversal configuration, ready to run.
#[derive(Debug)]
pub struct Traverser {
    config: TraversalConfig,
}

impl Traverser {
    pub fn new(config: TraversalConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TraversalConfig {
        &self.config
    }

    /// Walk from `start` and return everything the visitor collected.
    ///
    /// With the `Dijkstra` strategy the run ends once `end` is settled.
    #[tracing::instrument(
        level = "debug",
        skip(self, source, visitor, start, end),
        fields(start = %start.id, strategy = ?self.config.strategy, direction = %self.config.direction)
    )]
    pub fn traverse<S, V>(
        &self,
        source: &S,
        visitor: &mut V,
        start: Vertex,
        end: Option<&DocumentId>,
    ) -> Result<Vec<V::Item>>
    where
        S: TraversalSource + ?Sized,
        V: Visitor + ?Sized,
    {
        let mut run = Run {
            config: &self.config,
            source,
            visitor,
            end,
            result: Vec::new(),
            iterations: 0,
            visited_vertices: HashSet::new(),
            visited_edges: HashSet::new(),
            stopped: false,
        };
        run.visited_vertices.insert(start.id.clone());

        match self.config.strategy {
            Strategy::DepthFirst => run.depth_first(start)?,
            Strategy::BreadthFirst => run.breadth_first(start)?,
            Strategy::Dijkstra => run.dijkstra(start)?,
        }

        tracing::debug!(iterations = run.iterations, results = run.result.len(), "traversal finished");
        Ok(run.result)
    }
}

// ============================================================================
// Run state
// ============================================================================

struct Run<'a, S: ?Sized, V: Visitor + ?Sized> {
    config: &'a TraversalConfig,
    source: &'a S,
    visitor: &'a mut V,
    end: Option<&'a DocumentId>,
    result: Vec<V::Item>,
    iterations: usize,
    visited_vertices: HashSet<DocumentId>,
    visited_edges: HashSet<DocumentId>,
    stopped: bool,
}

/// Edges still to expand from one entered vertex.
struct Frame {
    edges: std::vec::IntoIter<Edge>,
    visit_after: bool,
}

impl<S, V> Run<'_, S, V>
where
    S: TraversalSource + ?Sized,
    V: Visitor + ?Sized,
{
    /// Count, filter, pre-visit and collect the edges to expand.
    fn enter(&mut self, path: &Path, distance: Option<f64>) -> Result<Frame> {
        self.iterations += 1;
        if let Some(limit) = self.config.max_iterations {
            if self.iterations > limit {
                return Err(Error::TooManyIterations { limit });
            }
        }

        let vertex = path.end();
        let depth = path.len();
        let mut outcome = FilterOutcome::INCLUDE;
        for filter in &self.config.vertex_filters {
            outcome |= filter.filter(self.config, vertex, path);
        }
        let report = !outcome.exclude && depth >= self.config.min_depth;

        let mut control = Control::Continue;
        if report && self.config.order == Order::PreOrder {
            control = self.visit(path, distance);
        }

        let expand = !self.stopped
            && !outcome.prune
            && control == Control::Continue
            && self.config.max_depth.is_none_or(|max| depth < max);
        let edges = if expand { self.expansion(path)? } else { Vec::new() };

        Ok(Frame {
            edges: edges.into_iter(),
            visit_after: report && self.config.order == Order::PostOrder,
        })
    }

    fn visit(&mut self, path: &Path, distance: Option<f64>) -> Control {
        let visit = Visit {
            config: self.config,
            vertex: path.end(),
            path,
            end: self.end,
            distance,
        };
        let control = self.visitor.visit(&visit, &mut self.result);
        if control == Control::Break {
            self.stopped = true;
        }
        control
    }

    /// Edges of the path's end vertex in expansion order, expand filters applied.
    fn expansion(&self, path: &Path) -> Result<Vec<Edge>> {
        let vertex = path.end();
        let mut edges = self.source.edges(vertex, self.config.direction)?;
        if self.config.sort_edges {
            edges.sort_by(|a, b| a.id.key().cmp(b.id.key()));
        }
        if self.config.item_order == ItemOrder::Backward {
            edges.reverse();
        }
        edges.retain(|edge| {
            self.config
                .expand_filters
                .iter()
                .all(|f| f.admit(self.config, vertex, edge, path))
        });
        Ok(edges)
    }

    /// Apply the uniqueness policy to `edge` and fetch the vertex it leads to.
    fn admit(&mut self, path: &Path, edge: &Edge) -> Option<Vertex> {
        let from = &path.end().id;
        let target = edge.target(from, self.config.direction)?;

        let uniqueness = self.config.uniqueness;
        let edge_seen = match uniqueness.edges {
            UniquenessLevel::None => false,
            UniquenessLevel::Path => path.contains_edge(&edge.id),
            UniquenessLevel::Global => self.visited_edges.contains(&edge.id),
        };
        let vertex_seen = match uniqueness.vertices {
            UniquenessLevel::None => false,
            UniquenessLevel::Path => path.contains_vertex(target),
            UniquenessLevel::Global => self.visited_vertices.contains(target),
        };
        if edge_seen || vertex_seen {
            return None;
        }

        let Some(vertex) = self.source.vertex(target) else {
            tracing::debug!(edge = %edge.id, vertex = %target, "dangling reference, branch dropped");
            return None;
        };
        if uniqueness.edges == UniquenessLevel::Global {
            self.visited_edges.insert(edge.id.clone());
        }
        if uniqueness.vertices == UniquenessLevel::Global {
            self.visited_vertices.insert(vertex.id.clone());
        }
        Some(vertex)
    }

    // ========================================================================
    // Depth-first
    // ========================================================================

    fn depth_first(&mut self, start: Vertex) -> Result<()> {
        let mut path = Path::single(start);
        let mut stack = vec![self.enter(&path, None)?];

        loop {
            if self.stopped {
                break;
            }
            let Some(frame) = stack.last_mut() else {
                break;
            };
            match frame.edges.next() {
                Some(edge) => {
                    let Some(vertex) = self.admit(&path, &edge) else {
                        continue;
                    };
                    path.append(edge, vertex);
                    let child = self.enter(&path, None)?;
                    stack.push(child);
                }
                None => {
                    let visit_after = frame.visit_after;
                    stack.pop();
                    if visit_after {
                        self.visit(&path, None);
                    }
                    path.pop();
                }
            }
        }
        Ok(())
    }

    // ========================================================================
    // Breadth-first
    // ========================================================================

    fn breadth_first(&mut self, start: Vertex) -> Result<()> {
        let mut queue = VecDeque::from([Path::single(start)]);
        let mut deferred: Vec<Path> = Vec::new();

        while let Some(path) = queue.pop_front() {
            if self.stopped {
                break;
            }
            let frame = self.enter(&path, None)?;
            for edge in frame.edges {
                if let Some(vertex) = self.admit(&path, &edge) {
                    let mut next = path.clone();
                    next.append(edge, vertex);
                    queue.push_back(next);
                }
            }
            if frame.visit_after {
                deferred.push(path);
            }
        }

        // post-order: deepest level first, queue order within a level
        deferred.sort_by_key(|path| Reverse(path.len()));
        for path in &deferred {
            if self.stopped {
                break;
            }
            self.visit(path, None);
        }
        Ok(())
    }

    // ========================================================================
    // Dijkstra
    // ========================================================================

    fn dijkstra(&mut self, start: Vertex) -> Result<()> {
        let mut heap = BinaryHeap::new();
        let mut best: HashMap<DocumentId, (f64, Path)> = HashMap::new();
        let mut settled: HashSet<DocumentId> = HashSet::new();
        let mut seq = 0u64;

        heap.push(Reverse(MinScored(0.0, seq, start.id.clone())));
        best.insert(start.id.clone(), (0.0, Path::single(start)));

        while let Some(Reverse(MinScored(distance, _, id))) = heap.pop() {
            if self.stopped {
                break;
            }
            if !settled.insert(id.clone()) {
                continue;
            }
            let Some((_, path)) = best.get(&id).cloned() else {
                continue;
            };

            let frame = self.enter(&path, Some(distance))?;
            if self.end == Some(&id) {
                break;
            }
            for edge in frame.edges {
                let Some(target) = edge.target(&id, self.config.direction).cloned() else {
                    continue;
                };
                if settled.contains(&target) {
                    continue;
                }
                let weight = self.config.edge_distance(&edge);
                if !weight.is_finite() || weight < 0.0 {
                    tracing::trace!(edge = %edge.id, weight, "edge not usable for distances");
                    continue;
                }
                let candidate = distance + weight;
                if best.get(&target).is_some_and(|(known, _)| *known <= candidate) {
                    continue;
                }
                let Some(vertex) = self.source.vertex(&target) else {
                    tracing::debug!(edge = %edge.id, vertex = %target, "dangling reference, branch dropped");
                    continue;
                };
                let mut next = path.clone();
                next.append(edge, vertex);
                best.insert(target.clone(), (candidate, next));
                seq += 1;
                heap.push(Reverse(MinScored(candidate, seq, target)));
            }
        }
        Ok(())
    }
}

/// Heap entry ordered by score, then insertion sequence.
#[derive(Debug, Clone)]
struct MinScored(f64, u64, DocumentId);

impl PartialEq for MinScored {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MinScored {}

impl PartialOrd for MinScored {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MinScored {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0).then_with(|| self.1.cmp(&other.1))
    }
}
