//! Visitors collect results from visited vertices.

use std::marker::PhantomData;

use crate::model::{DocumentId, Object, Path, Value, Vertex};
use crate::{Error, Result};
use super::TraversalConfig;

/// What the traversal does after a visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Control {
    #[default]
    Continue,
    /// Do not expand the visited vertex.
    Prune,
    /// Stop the whole run.
    Break,
}

/// Everything a visitor sees about one visited vertex.
#[derive(Debug)]
pub struct Visit<'a> {
    pub config: &'a TraversalConfig,
    pub vertex: &'a Vertex,
    /// Path from the start vertex to `vertex`.
    pub path: &'a Path,
    /// End vertex the caller asked for, if any.
    pub end: Option<&'a DocumentId>,
    /// Path distance, known for the `Dijkstra` strategy.
    pub distance: Option<f64>,
}

impl Visit<'_> {
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    pub fn start(&self) -> &Vertex {
        self.path.start()
    }

    /// `distance` when known, otherwise the sum of the path's edge lengths.
    pub fn path_distance(&self) -> f64 {
        self.distance.unwrap_or_else(|| {
            self.path.edges().map(|e| self.config.edge_distance(e)).sum()
        })
    }
}

pub trait Visitor {
    type Item;

    /// Push zero or more items for `visit` into `result`.
    fn visit(&mut self, visit: &Visit<'_>, result: &mut Vec<Self::Item>) -> Control;
}

// ============================================================================
// Closures
// ============================================================================

/// Adapts a closure into a [`Visitor`].
pub struct FnVisitor<F, T> {
    f: F,
    _item: PhantomData<fn() -> T>,
}

pub fn visitor_fn<F, T>(f: F) -> FnVisitor<F, T>
where
    F: FnMut(&Visit<'_>, &mut Vec<T>) -> Control,
{
    FnVisitor { f, _item: PhantomData }
}

impl<F, T> Visitor for FnVisitor<F, T>
where
    F: FnMut(&Visit<'_>, &mut Vec<T>) -> Control,
{
    type Item = T;

    fn visit(&mut self, visit: &Visit<'_>, result: &mut Vec<T>) -> Control {
        (self.f)(visit, result)
    }
}

// ============================================================================
// Built-in visitors
// ============================================================================

/// Reports `{vertex}` or `{vertex, path}` per visited vertex.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathVisitor {
    pub track_paths: bool,
}

impl Visitor for PathVisitor {
    type Item = Value;

    fn visit(&mut self, visit: &Visit<'_>, result: &mut Vec<Value>) -> Control {
        let mut item = Object::new();
        item.insert("vertex".into(), visit.vertex.to_value());
        if self.track_paths {
            item.insert("path".into(), visit.path.to_value());
        }
        result.push(Value::Object(item));
        Control::Continue
    }
}

/// A vertex reached from a start vertex, with the path that reached it.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub vertex: Vertex,
    pub path: Path,
    pub start_vertex: DocumentId,
}

impl Neighbor {
    /// `{"vertex": ..., "path": ..., "startVertex": ...}`
    pub fn to_value(&self) -> Value {
        let mut item = Object::new();
        item.insert("vertex".into(), self.vertex.to_value());
        item.insert("path".into(), self.path.to_value());
        item.insert("startVertex".into(), Value::from(self.start_vertex.as_str()));
        Value::Object(item)
    }
}

/// Reports a [`Neighbor`] per visited vertex.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeighborVisitor;

impl Visitor for NeighborVisitor {
    type Item = Neighbor;

    fn visit(&mut self, visit: &Visit<'_>, result: &mut Vec<Neighbor>) -> Control {
        result.push(Neighbor {
            vertex: visit.vertex.clone(),
            path: visit.path.clone(),
            start_vertex: visit.start().id.clone(),
        });
        Control::Continue
    }
}

/// Builds one nested tree of vertex documents. Each vertex's children are
/// stored under the connector attribute.
#[derive(Debug, Clone)]
pub struct TreeVisitor {
    connect: String,
}

impl TreeVisitor {
    pub fn new(connect: impl Into<String>) -> Result<Self> {
        let connect = connect.into();
        if connect.is_empty() {
            return Err(Error::InvalidArgument("tree connector attribute must not be empty".into()));
        }
        Ok(Self { connect })
    }
}

impl Visitor for TreeVisitor {
    type Item = Value;

    fn visit(&mut self, visit: &Visit<'_>, result: &mut Vec<Value>) -> Control {
        if result.is_empty() {
            result.push(Value::object());
        }
        let mut current = &mut result[0];
        for vertex in visit.path.vertices() {
            let Value::Object(node) = current else {
                break;
            };
            let children = node
                .entry(self.connect.clone())
                .or_insert_with(|| Value::Array(Vec::new()));
            if !children.is_array() {
                *children = Value::Array(Vec::new());
            }
            let Value::Array(children) = children else {
                break;
            };
            let position = children
                .iter()
                .position(|child| child.get("_id").as_str() == Some(vertex.id.as_str()));
            let position = position.unwrap_or_else(|| {
                children.push(vertex.to_value());
                children.len() - 1
            });
            current = &mut children[position];
        }
        Control::Continue
    }
}

/// Reports `{vertex, distance}` when the visit reaches the end vertex.
#[derive(Debug, Clone, Copy, Default)]
pub struct DistanceVisitor;

impl Visitor for DistanceVisitor {
    type Item = Value;

    fn visit(&mut self, visit: &Visit<'_>, result: &mut Vec<Value>) -> Control {
        if visit.end != Some(&visit.vertex.id) {
            return Control::Continue;
        }
        let mut item = Object::new();
        item.insert("vertex".into(), visit.vertex.to_value());
        item.insert("distance".into(), Value::from(visit.path_distance()));
        result.push(Value::Object(item));
        Control::Continue
    }
}

/// Counts visits without producing items.
#[derive(Debug, Clone, Copy, Default)]
pub struct CountingVisitor {
    pub count: usize,
}

impl Visitor for CountingVisitor {
    type Item = ();

    fn visit(&mut self, _visit: &Visit<'_>, _result: &mut Vec<()>) -> Control {
        self.count += 1;
        Control::Continue
    }
}
