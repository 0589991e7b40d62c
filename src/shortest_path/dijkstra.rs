//! Dijkstra searches run on the traversal engine's priority strategy.

use hashbrown::{HashMap, HashSet};

use crate::compare;
use crate::model::{DocumentId, Vertex};
use crate::traversal::{
    Control, Order, Strategy, TraversalConfig, TraversalOptions, TraversalSource, Traverser, Visit,
    Visitor,
};
use crate::Result;
use super::{ShortestPathOptions, ShortestPathResult};

/// Vertices a search reports.
#[derive(Debug, Clone, Copy)]
pub enum Targets<'a> {
    /// Every reachable vertex.
    All,
    One(&'a DocumentId),
    Set(&'a HashSet<DocumentId>),
}

impl Targets<'_> {
    fn contains(&self, id: &DocumentId) -> bool {
        match self {
            Targets::All => true,
            Targets::One(target) => *target == id,
            Targets::Set(set) => set.contains(id),
        }
    }

    /// How many reports end the search, not counting `start` itself.
    fn budget(&self, start: &DocumentId) -> Option<usize> {
        match self {
            Targets::All => None,
            Targets::One(target) => Some(usize::from(*target != start)),
            Targets::Set(set) => Some(set.len() - usize::from(set.contains(start))),
        }
    }
}

/// Single-source shortest paths with a fixed configuration.
#[derive(Debug)]
pub struct Dijkstra {
    traverser: Traverser,
    no_paths: bool,
}

impl Dijkstra {
    /// Forces the priority strategy and pre-order visits onto `config`.
    pub fn new(mut config: TraversalConfig, no_paths: bool) -> Result<Self> {
        config.strategy = Strategy::Dijkstra;
        config.order = Order::PreOrder;
        Ok(Self { traverser: Traverser::new(config)?, no_paths })
    }

    /// `None` when the edge examples are unusable; that has been logged.
    pub fn from_options(options: &ShortestPathOptions) -> Result<Option<Self>> {
        let traversal = TraversalOptions {
            strategy: Strategy::Dijkstra,
            follow_edges: options.edge_examples.clone().map(compare::as_example_list),
            edge_collection_restriction: options.edge_collection_restriction.clone(),
            weight: options.weight.clone(),
            default_weight: options.default_weight,
            max_iterations: options.max_iterations,
            ..TraversalOptions::default()
        };
        if !traversal.examples_valid() {
            return Ok(None);
        }
        let config = traversal.to_config(options.direction).max_depth(None);
        Self::new(config, options.no_paths).map(Some)
    }

    /// Shortest paths from `start` to the targets it reaches, in settle order.
    pub fn run<S: TraversalSource + ?Sized>(
        &self,
        source: &S,
        start: Vertex,
        targets: Targets<'_>,
    ) -> Result<Vec<ShortestPathResult>> {
        let remaining = targets.budget(&start.id);
        if remaining == Some(0) {
            return Ok(Vec::new());
        }
        let end = match targets {
            Targets::One(target) => Some(target),
            _ => None,
        };
        let mut settle = Settle { targets, remaining, no_paths: self.no_paths };
        self.traverser.traverse(source, &mut settle, start, end)
    }

    /// [`run`](Self::run) once per start vertex against a shared target list.
    ///
    /// Results are ordered by start vertex, then by position in `targets`.
    pub fn run_all<S: TraversalSource + ?Sized>(
        &self,
        source: &S,
        starts: Vec<Vertex>,
        targets: &[Vertex],
    ) -> Result<Vec<ShortestPathResult>> {
        let wanted: HashSet<DocumentId> = targets.iter().map(|v| v.id.clone()).collect();
        let mut out = Vec::new();
        for start in starts {
            let mut found: HashMap<DocumentId, ShortestPathResult> = self
                .run(source, start, Targets::Set(&wanted))?
                .into_iter()
                .map(|r| (r.vertex.id.clone(), r))
                .collect();
            out.extend(targets.iter().filter_map(|t| found.remove(&t.id)));
        }
        Ok(out)
    }
}

/// Reports each target as it is settled.
struct Settle<'t> {
    targets: Targets<'t>,
    remaining: Option<usize>,
    no_paths: bool,
}

impl Visitor for Settle<'_> {
    type Item = ShortestPathResult;

    fn visit(&mut self, visit: &Visit<'_>, result: &mut Vec<ShortestPathResult>) -> Control {
        if visit.depth() == 0 || !self.targets.contains(&visit.vertex.id) {
            return Control::Continue;
        }
        result.push(ShortestPathResult {
            start_vertex: visit.start().id.clone(),
            vertex: visit.vertex.clone(),
            distance: visit.path_distance(),
            path: (!self.no_paths).then(|| visit.path.clone()),
        });
        match &mut self.remaining {
            Some(remaining) => {
                *remaining -= 1;
                if *remaining == 0 { Control::Break } else { Control::Continue }
            }
            None => Control::Continue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EdgeSource;
    use crate::model::Direction;
    use crate::storage::{CollectionKind, Datasource, MemoryStore};
    use serde_json::json;

    /// a -> b (1), b -> c (1), a -> c (5), c -> d (1)
    fn store() -> MemoryStore {
        let store = MemoryStore::new();
        store.create_collection("v", CollectionKind::Document).unwrap();
        store.create_collection("e", CollectionKind::Edge).unwrap();
        for key in ["a", "b", "c", "d", "lonely"] {
            store.insert("v", json!({"_key": key})).unwrap();
        }
        for (from, to, w) in [("a", "b", 1), ("b", "c", 1), ("a", "c", 5), ("c", "d", 1)] {
            store
                .insert("e", json!({"_from": format!("v/{from}"), "_to": format!("v/{to}"), "w": w}))
                .unwrap();
        }
        store
    }

    fn vertex(store: &MemoryStore, key: &str) -> Vertex {
        Vertex::from_document(store.document(&DocumentId::new("v", key)).unwrap()).unwrap()
    }

    fn weighted() -> ShortestPathOptions {
        ShortestPathOptions {
            direction: Direction::Outbound,
            weight: Some("w".into()),
            ..ShortestPathOptions::default()
        }
    }

    #[test]
    fn test_weighted_path() {
        let s = store();
        let source = EdgeSource::new(&s, ["e"]).unwrap();
        let dijkstra = Dijkstra::from_options(&weighted()).unwrap().unwrap();
        let target = DocumentId::new("v", "c");
        let found = dijkstra.run(&source, vertex(&s, "a"), Targets::One(&target)).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].distance, 2.0);
        let keys: Vec<&str> = found[0].vertex_ids().into_iter().map(|id| id.key()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_unreachable_and_self_targets() {
        let s = store();
        let source = EdgeSource::new(&s, ["e"]).unwrap();
        let dijkstra = Dijkstra::from_options(&weighted()).unwrap().unwrap();
        let lonely = DocumentId::new("v", "lonely");
        assert!(dijkstra.run(&source, vertex(&s, "a"), Targets::One(&lonely)).unwrap().is_empty());
        let a = DocumentId::new("v", "a");
        assert!(dijkstra.run(&source, vertex(&s, "a"), Targets::One(&a)).unwrap().is_empty());
    }

    #[test]
    fn test_run_all_orders_by_target_list() {
        let s = store();
        let source = EdgeSource::new(&s, ["e"]).unwrap();
        let options = ShortestPathOptions { no_paths: true, ..weighted() };
        let dijkstra = Dijkstra::from_options(&options).unwrap().unwrap();
        let targets = vec![vertex(&s, "d"), vertex(&s, "b")];
        let found = dijkstra
            .run_all(&source, vec![vertex(&s, "a"), vertex(&s, "c")], &targets)
            .unwrap();
        let pairs: Vec<(&str, &str, f64)> = found
            .iter()
            .map(|r| (r.start_vertex.key(), r.vertex.id.key(), r.distance))
            .collect();
        assert_eq!(pairs, vec![("a", "d", 3.0), ("a", "b", 1.0), ("c", "d", 1.0)]);
        assert!(found.iter().all(|r| r.path.is_none()));
    }

    #[test]
    fn test_unit_weights_count_hops() {
        let s = store();
        let source = EdgeSource::new(&s, ["e"]).unwrap();
        let options = ShortestPathOptions { direction: Direction::Outbound, ..ShortestPathOptions::default() };
        let dijkstra = Dijkstra::from_options(&options).unwrap().unwrap();
        let found = dijkstra.run(&source, vertex(&s, "a"), Targets::All).unwrap();
        let hops: Vec<(&str, f64)> = found.iter().map(|r| (r.vertex.id.key(), r.distance)).collect();
        assert_eq!(hops, vec![("b", 1.0), ("c", 1.0), ("d", 2.0)]);
    }

    #[test]
    fn test_invalid_edge_examples_yield_no_search() {
        let options = ShortestPathOptions { edge_examples: Some(json!([]).into()), ..weighted() };
        assert!(Dijkstra::from_options(&options).unwrap().is_none());
    }

    #[test]
    fn test_edge_examples_restrict_edges() {
        let s = store();
        let source = EdgeSource::new(&s, ["e"]).unwrap();
        let options = ShortestPathOptions { edge_examples: Some(json!({"w": 5}).into()), ..weighted() };
        let dijkstra = Dijkstra::from_options(&options).unwrap().unwrap();
        let target = DocumentId::new("v", "c");
        let found = dijkstra.run(&source, vertex(&s, "a"), Targets::One(&target)).unwrap();
        assert_eq!(found[0].distance, 5.0);
    }
}
