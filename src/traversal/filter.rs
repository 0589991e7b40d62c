//! Vertex and expand filters.
//!
//! A vertex filter decides, per visited vertex, whether it is reported
//! (`exclude`) and whether its edges are followed (`prune`). The two flags
//! are independent. An expand filter decides per edge whether it is followed
//! at all.

use std::ops::{BitOr, BitOrAssign};

use crate::compare;
use crate::model::{Edge, Path, Value, Vertex};
use super::TraversalConfig;

// ============================================================================
// Outcome
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterOutcome {
    /// Do not report this vertex.
    pub exclude: bool,
    /// Do not expand this vertex.
    pub prune: bool,
}

impl FilterOutcome {
    pub const INCLUDE: Self = Self { exclude: false, prune: false };
    pub const EXCLUDE: Self = Self { exclude: true, prune: false };
    pub const PRUNE: Self = Self { exclude: false, prune: true };
    pub const EXCLUDE_AND_PRUNE: Self = Self { exclude: true, prune: true };

    /// Parse a `vertexFilterMethod` list such as `["prune", "exclude"]`.
    /// Unknown entries are ignored.
    pub fn from_methods<'a>(methods: impl IntoIterator<Item = &'a str>) -> Self {
        methods.into_iter().fold(Self::INCLUDE, |acc, m| match m {
            "exclude" => acc | Self::EXCLUDE,
            "prune" => acc | Self::PRUNE,
            _ => acc,
        })
    }
}

impl BitOr for FilterOutcome {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self { exclude: self.exclude || rhs.exclude, prune: self.prune || rhs.prune }
    }
}

impl BitOrAssign for FilterOutcome {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = *self | rhs;
    }
}

// ============================================================================
// Filter traits
// ============================================================================

pub trait VertexFilter {
    fn filter(&self, config: &TraversalConfig, vertex: &Vertex, path: &Path) -> FilterOutcome;
}

impl<F> VertexFilter for F
where
    F: Fn(&TraversalConfig, &Vertex, &Path) -> FilterOutcome,
{
    fn filter(&self, config: &TraversalConfig, vertex: &Vertex, path: &Path) -> FilterOutcome {
        self(config, vertex, path)
    }
}

/// Decides whether `edge`, leaving `vertex` at the end of `path`, is followed.
pub trait ExpandFilter {
    fn admit(&self, config: &TraversalConfig, vertex: &Vertex, edge: &Edge, path: &Path) -> bool;
}

impl<F> ExpandFilter for F
where
    F: Fn(&TraversalConfig, &Vertex, &Edge, &Path) -> bool,
{
    fn admit(&self, config: &TraversalConfig, vertex: &Vertex, edge: &Edge, path: &Path) -> bool {
        self(config, vertex, edge, path)
    }
}

// ============================================================================
// Built-in filters
// ============================================================================

/// Filters vertices by example documents and/or vertex collections.
#[derive(Debug, Clone)]
pub struct ExampleVertexFilter {
    examples: Option<Value>,
    /// Applied to vertices that do not match the examples.
    method: FilterOutcome,
    collections: Option<Vec<String>>,
}

impl ExampleVertexFilter {
    pub fn new(examples: Option<Value>, method: FilterOutcome, collections: Option<Vec<String>>) -> Self {
        Self { examples, method, collections }
    }

    fn outside_collections(&self, vertex: &Vertex) -> bool {
        self.collections
            .as_ref()
            .is_some_and(|names| !names.iter().any(|c| c == vertex.collection()))
    }
}

impl VertexFilter for ExampleVertexFilter {
    fn filter(&self, _config: &TraversalConfig, vertex: &Vertex, _path: &Path) -> FilterOutcome {
        if let Some(examples) = &self.examples {
            if !compare::matches(&vertex.to_value(), examples) {
                // a foreign collection is never reported, even when the
                // method only prunes
                if !self.method.exclude && self.outside_collections(vertex) {
                    return FilterOutcome { exclude: true, prune: self.method.prune };
                }
                return self.method;
            }
        }
        if self.outside_collections(vertex) {
            return FilterOutcome::EXCLUDE;
        }
        FilterOutcome::INCLUDE
    }
}

/// Follows only edges of the given collections and/or matching examples.
#[derive(Debug, Clone, Default)]
pub struct EdgeExampleFilter {
    examples: Option<Value>,
    collections: Option<Vec<String>>,
}

impl EdgeExampleFilter {
    pub fn new(examples: Option<Value>, collections: Option<Vec<String>>) -> Self {
        Self { examples, collections }
    }
}

impl ExpandFilter for EdgeExampleFilter {
    fn admit(&self, _config: &TraversalConfig, _vertex: &Vertex, edge: &Edge, _path: &Path) -> bool {
        if let Some(names) = &self.collections {
            if !names.iter().any(|c| c == edge.collection()) {
                return false;
            }
        }
        match &self.examples {
            Some(examples) => compare::matches(&edge.to_value(), examples),
            None => true,
        }
    }
}
