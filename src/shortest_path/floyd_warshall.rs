//! All-pairs shortest paths with every minimal path kept per pair.
//!
//! The table is seeded from the edges (parallel edges keep the shortest,
//! equally short ones are all kept), then relaxed over every intermediate
//! vertex `k`, every start `i` and every end `j`. A strictly shorter detour
//! replaces the recorded paths; an equally long one adds its paths.

use hashbrown::HashMap;
use indexmap::IndexSet;
use smallvec::{smallvec, SmallVec};

use crate::model::{Direction, DocumentId, Edge, Path, Vertex};
use crate::storage::Datasource;
use crate::traversal::EdgeDistance;
use super::{usable, EdgeWeight, ShortestPathOptions, ShortestPathResult};

/// Edge positions along one path.
type EdgePath = SmallVec<[u32; 8]>;

#[derive(Debug, Clone)]
struct Cell {
    distance: f64,
    paths: Vec<EdgePath>,
}

/// One recorded minimal path, oriented from its start vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct TablePath<'a> {
    pub vertices: Vec<&'a DocumentId>,
    pub edges: Vec<&'a Edge>,
}

/// Distances and minimal paths between every pair of known vertices.
#[derive(Debug, Clone)]
pub struct PathTable {
    direction: Direction,
    vertices: IndexSet<DocumentId>,
    edges: Vec<Edge>,
    cells: Vec<Option<Cell>>,
}

impl PathTable {
    fn cell(&self, from: &DocumentId, to: &DocumentId) -> Option<&Cell> {
        let n = self.vertices.len();
        let i = self.vertices.get_index_of(from)?;
        let j = self.vertices.get_index_of(to)?;
        self.cells[i * n + j].as_ref()
    }

    pub fn vertices(&self) -> impl Iterator<Item = &DocumentId> {
        self.vertices.iter()
    }

    /// `None` when `to` is unreachable from `from`, or the two are the same.
    pub fn distance(&self, from: &DocumentId, to: &DocumentId) -> Option<f64> {
        self.cell(from, to).map(|c| c.distance)
    }

    /// Every minimal path recorded from `from` to `to`, in discovery order.
    pub fn paths(&self, from: &DocumentId, to: &DocumentId) -> Vec<TablePath<'_>> {
        let (Some(cell), Some(start)) = (self.cell(from, to), self.vertices.get(from)) else {
            return Vec::new();
        };
        cell.paths.iter().filter_map(|path| self.walk(start, path)).collect()
    }

    fn walk<'a>(&'a self, start: &'a DocumentId, path: &EdgePath) -> Option<TablePath<'a>> {
        let mut vertices = vec![start];
        let mut edges = Vec::with_capacity(path.len());
        let mut current = start;
        for &position in path {
            let edge = self.edges.get(position as usize)?;
            current = edge.target(current, self.direction)?;
            vertices.push(current);
            edges.push(edge);
        }
        Some(TablePath { vertices, edges })
    }
}

/// All-pairs shortest path search.
#[derive(Debug, Clone)]
pub struct FloydWarshall {
    direction: Direction,
    weight: EdgeWeight,
    no_paths: bool,
    max_paths_per_pair: Option<usize>,
}

impl FloydWarshall {
    pub fn new(direction: Direction, weight: EdgeWeight) -> Self {
        Self { direction, weight, no_paths: false, max_paths_per_pair: None }
    }

    pub fn from_options(options: &ShortestPathOptions) -> Self {
        Self::new(options.direction, options.edge_weight())
            .no_paths(options.no_paths)
            .max_paths_per_pair(options.max_paths_per_pair)
    }

    /// Track distances only.
    pub fn no_paths(mut self, no_paths: bool) -> Self {
        self.no_paths = no_paths;
        self
    }

    /// Keep at most `cap` equally short paths per pair.
    pub fn max_paths_per_pair(mut self, cap: Option<usize>) -> Self {
        self.max_paths_per_pair = cap;
        self
    }

    /// Build the table over the end points of `edges` plus `vertices`.
    pub fn table<'v>(&self, edges: &[Edge], vertices: impl IntoIterator<Item = &'v DocumentId>) -> PathTable {
        let mut ids: IndexSet<DocumentId> = IndexSet::new();
        for edge in edges {
            ids.insert(edge.from.clone());
            ids.insert(edge.to.clone());
        }
        ids.extend(vertices.into_iter().cloned());

        let n = ids.len();
        let mut cells: Vec<Option<Cell>> = vec![None; n * n];

        for (position, edge) in edges.iter().enumerate() {
            if edge.from == edge.to {
                continue;
            }
            let weight = self.weight.distance(edge);
            if !usable(weight) {
                tracing::trace!(edge = %edge.id, weight, "edge not usable for distances");
                continue;
            }
            let (Some(f), Some(t)) = (ids.get_index_of(&edge.from), ids.get_index_of(&edge.to)) else {
                continue;
            };
            let pairs: SmallVec<[(usize, usize); 2]> = match self.direction {
                Direction::Outbound => smallvec![(f, t)],
                Direction::Inbound => smallvec![(t, f)],
                Direction::Any => smallvec![(f, t), (t, f)],
            };
            let single: EdgePath = smallvec![position as u32];
            for (i, j) in pairs {
                self.offer(&mut cells[i * n + j], weight, vec![single.clone()]);
            }
        }

        for k in 0..n {
            for i in 0..n {
                if i == k {
                    continue;
                }
                let Some(dik) = cells[i * n + k].as_ref().map(|c| c.distance) else {
                    continue;
                };
                for j in 0..n {
                    if j == i || j == k {
                        continue;
                    }
                    let Some(dkj) = cells[k * n + j].as_ref().map(|c| c.distance) else {
                        continue;
                    };
                    let candidate = dik + dkj;
                    if cells[i * n + j].as_ref().is_some_and(|c| candidate > c.distance) {
                        continue;
                    }
                    let joined = if self.no_paths {
                        Vec::new()
                    } else {
                        join(&cells[i * n + k], &cells[k * n + j])
                    };
                    self.offer(&mut cells[i * n + j], candidate, joined);
                }
            }
        }

        tracing::debug!(vertices = n, edges = edges.len(), "all-pairs table built");
        PathTable { direction: self.direction, vertices: ids, edges: edges.to_vec(), cells }
    }

    /// Record `paths` of length `distance` in `cell`.
    fn offer(&self, cell: &mut Option<Cell>, distance: f64, paths: Vec<EdgePath>) {
        let paths = if self.no_paths { Vec::new() } else { paths };
        match cell {
            Some(existing) if distance > existing.distance => {}
            Some(existing) if distance == existing.distance => {
                for path in paths {
                    if self.max_paths_per_pair.is_some_and(|cap| existing.paths.len() >= cap) {
                        break;
                    }
                    if !existing.paths.contains(&path) {
                        existing.paths.push(path);
                    }
                }
            }
            _ => {
                let mut paths = paths;
                if let Some(cap) = self.max_paths_per_pair {
                    paths.truncate(cap);
                }
                *cell = Some(Cell { distance, paths });
            }
        }
    }

    /// Shortest paths from each vertex of `from` to each other vertex of `to`.
    ///
    /// Each result carries the first recorded minimal path whose vertices
    /// all still exist. Pairs without such a path are dropped.
    #[tracing::instrument(level = "debug", skip_all, fields(from = from.len(), to = to.len(), direction = %self.direction))]
    pub fn run<D: Datasource + ?Sized>(
        &self,
        datasource: &D,
        from: &[Vertex],
        to: &[Vertex],
        edges: &[Edge],
    ) -> Vec<ShortestPathResult> {
        let table = self.table(edges, from.iter().map(|v| &v.id));
        let mut documents: HashMap<DocumentId, Option<Vertex>> = from
            .iter()
            .chain(to)
            .map(|v| (v.id.clone(), Some(v.clone())))
            .collect();

        let mut out = Vec::new();
        for start in from {
            for target in to {
                if start.id == target.id {
                    continue;
                }
                let Some(distance) = table.distance(&start.id, &target.id) else {
                    continue;
                };
                let path = if self.no_paths {
                    None
                } else {
                    let found = table
                        .paths(&start.id, &target.id)
                        .iter()
                        .find_map(|walk| resolve(datasource, &mut documents, walk));
                    if found.is_none() {
                        tracing::debug!(from = %start.id, to = %target.id, "no shortest path with existing vertices");
                        continue;
                    }
                    found
                };
                out.push(ShortestPathResult {
                    start_vertex: start.id.clone(),
                    vertex: target.clone(),
                    distance,
                    path,
                });
            }
        }
        out
    }
}

/// Every concatenation of a path from `left` with a path from `right`.
fn join(left: &Option<Cell>, right: &Option<Cell>) -> Vec<EdgePath> {
    let (Some(left), Some(right)) = (left, right) else {
        return Vec::new();
    };
    let mut joined = Vec::with_capacity(left.paths.len() * right.paths.len());
    for head in &left.paths {
        for tail in &right.paths {
            let mut path = head.clone();
            path.extend_from_slice(tail);
            joined.push(path);
        }
    }
    joined
}

/// Load the documents along `walk`. A missing vertex drops the path.
fn resolve<D: Datasource + ?Sized>(
    datasource: &D,
    documents: &mut HashMap<DocumentId, Option<Vertex>>,
    walk: &TablePath<'_>,
) -> Option<Path> {
    let mut fetch = |id: &DocumentId| -> Option<Vertex> {
        documents
            .entry(id.clone())
            .or_insert_with(|| datasource.document(id).and_then(Vertex::from_document))
            .clone()
    };
    let (first, rest) = walk.vertices.split_first()?;
    let mut path = Path::single(fetch(first)?);
    for (edge, id) in walk.edges.iter().zip(rest) {
        path.append((*edge).clone(), fetch(id)?);
    }
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Value;
    use serde_json::json;

    fn edge(key: &str, from: &str, to: &str, w: f64) -> Edge {
        let Value::Object(doc) = Value::from(json!({
            "_id": format!("e/{key}"), "_key": key,
            "_from": format!("v/{from}"), "_to": format!("v/{to}"), "w": w,
        })) else {
            unreachable!()
        };
        Edge::from_document(doc).unwrap()
    }

    fn id(key: &str) -> DocumentId {
        DocumentId::new("v", key)
    }

    fn keys<'a>(walk: &TablePath<'a>) -> Vec<&'a str> {
        walk.vertices.iter().map(|v| v.key()).collect()
    }

    fn triangle() -> Vec<Edge> {
        vec![edge("ab", "a", "b", 1.0), edge("bc", "b", "c", 1.0), edge("ac", "a", "c", 5.0)]
    }

    fn weighted(direction: Direction) -> FloydWarshall {
        FloydWarshall::new(direction, EdgeWeight::new(Some("w".into()), None))
    }

    #[test]
    fn test_triangle_outbound() {
        let table = weighted(Direction::Outbound).table(&triangle(), []);
        assert_eq!(table.distance(&id("a"), &id("c")), Some(2.0));
        assert_eq!(table.distance(&id("c"), &id("a")), None);
        assert_eq!(table.distance(&id("a"), &id("a")), None);
        let paths = table.paths(&id("a"), &id("c"));
        assert_eq!(paths.len(), 1);
        assert_eq!(keys(&paths[0]), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_inbound_reverses() {
        let table = weighted(Direction::Inbound).table(&triangle(), []);
        assert_eq!(table.distance(&id("c"), &id("a")), Some(2.0));
        assert_eq!(keys(&table.paths(&id("c"), &id("a"))[0]), vec!["c", "b", "a"]);
        assert_eq!(table.distance(&id("a"), &id("c")), None);
    }

    #[test]
    fn test_equal_paths_are_all_kept() {
        let square = vec![
            edge("ab", "a", "b", 1.0),
            edge("bd", "b", "d", 1.0),
            edge("ac", "a", "c", 1.0),
            edge("cd", "c", "d", 1.0),
        ];
        let table = weighted(Direction::Any).table(&square, []);
        let paths = table.paths(&id("a"), &id("d"));
        assert_eq!(paths.len(), 2);
        assert_eq!(keys(&paths[0]), vec!["a", "b", "d"]);
        assert_eq!(keys(&paths[1]), vec!["a", "c", "d"]);
        // oriented from the start even against edge direction
        assert_eq!(keys(&table.paths(&id("d"), &id("a"))[0]), vec!["d", "b", "a"]);

        let capped = weighted(Direction::Any).max_paths_per_pair(Some(1)).table(&square, []);
        assert_eq!(capped.paths(&id("a"), &id("d")).len(), 1);
    }

    #[test]
    fn test_parallel_edges_keep_minimum() {
        let edges = vec![edge("x", "a", "b", 4.0), edge("y", "a", "b", 2.0), edge("z", "b", "a", 3.0)];
        let table = weighted(Direction::Any).table(&edges, []);
        assert_eq!(table.distance(&id("a"), &id("b")), Some(2.0));
        assert_eq!(table.paths(&id("b"), &id("a"))[0].edges[0].id.key(), "y");
    }

    #[test]
    fn test_unusable_weights_and_no_paths() {
        let edges = vec![edge("ab", "a", "b", -1.0), edge("bc", "b", "c", 1.0)];
        let table = weighted(Direction::Outbound).no_paths(true).table(&edges, [&id("z")]);
        assert_eq!(table.distance(&id("a"), &id("b")), None);
        assert_eq!(table.distance(&id("b"), &id("c")), Some(1.0));
        assert!(table.paths(&id("b"), &id("c")).is_empty());
        assert_eq!(table.vertices().count(), 4);
    }
}
