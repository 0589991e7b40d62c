//! # Centrality Metrics
//!
//! Per-vertex scores folded from shortest-path distances.
//!
//! | Metric | Absolute | Normalized |
//! |--------|----------|------------|
//! | eccentricity | largest distance to a reached vertex | `1 / eccentricity`, scaled by the maximum |
//! | closeness | sum of distances to reached vertices | `1 / sum`, scaled by the maximum |
//! | betweenness | `1 / (L + 1)` per shortest path of `L` edges passing through | scaled by the maximum |
//!
//! `radius` is the smallest non-zero absolute eccentricity, `diameter` the
//! largest. Every selected start vertex has an entry; one that reaches nothing
//! scores `0`.
//!
//! Absolute eccentricity and closeness pick their algorithm like
//! [`graph_shortest_path`]. All other metrics run over the whole graph and
//! default to Floyd–Warshall. Betweenness always reads every minimal path
//! from the Floyd–Warshall table.

use hashbrown::HashMap;
use indexmap::IndexMap;

use crate::graph::{select_vertices, GraphDefinition};
use crate::model::{DocumentId, Value};
use crate::shortest_path::{
    graph_shortest_path, load_edges, Algorithm, FloydWarshall, ShortestPathOptions, ShortestPathResult,
};
use crate::storage::Datasource;
use crate::Result;

/// Centrality metrics accept the shortest path options.
pub type CentralityOptions = ShortestPathOptions;

/// Score per vertex, in selection order.
pub type Metrics = IndexMap<DocumentId, f64>;

fn distance_options(options: &CentralityOptions, default_algorithm: Option<Algorithm>) -> ShortestPathOptions {
    ShortestPathOptions {
        algorithm: options.algorithm.or(default_algorithm),
        no_paths: true,
        stop_at_first_match: false,
        ..options.clone()
    }
}

/// Run the shortest path search from every vertex selected by `example` and
/// fold each source's results into its score.
#[tracing::instrument(level = "debug", skip_all, fields(graph = %graph.name, direction = %options.direction))]
fn per_source<D, F>(
    datasource: &D,
    graph: &GraphDefinition,
    example: &Value,
    options: &ShortestPathOptions,
    mut fold: F,
) -> Result<Metrics>
where
    D: Datasource + ?Sized,
    F: FnMut(&[ShortestPathResult]) -> f64,
{
    let collections = graph.collections(options.direction, &options.restrictions());
    let mut grouped: IndexMap<DocumentId, Vec<ShortestPathResult>> =
        select_vertices(datasource, &collections.start, example)?
            .into_iter()
            .map(|v| (v.id, Vec::new()))
            .collect();
    for result in graph_shortest_path(datasource, graph, example, &Value::Null, options)? {
        grouped.entry(result.start_vertex.clone()).or_default().push(result);
    }
    Ok(grouped.into_iter().map(|(id, results)| (id, fold(&results))).collect())
}

/// Divide every score by the largest one. No-op when that is `0`.
fn normalize(metrics: &mut Metrics) {
    let max = metrics.values().copied().fold(0.0, f64::max);
    if max > 0.0 {
        metrics.values_mut().for_each(|score| *score /= max);
    }
}

fn reciprocal(x: f64) -> f64 {
    if x > 0.0 { 1.0 / x } else { 0.0 }
}

fn farthest(results: &[ShortestPathResult]) -> f64 {
    results.iter().map(|r| r.distance).fold(0.0, f64::max)
}

fn total(results: &[ShortestPathResult]) -> f64 {
    results.iter().map(|r| r.distance).sum()
}

// ============================================================================
// Eccentricity
// ============================================================================

pub fn absolute_eccentricity<D: Datasource + ?Sized>(
    datasource: &D,
    graph: &GraphDefinition,
    vertex_example: &Value,
    options: &CentralityOptions,
) -> Result<Metrics> {
    per_source(datasource, graph, vertex_example, &distance_options(options, None), farthest)
}

/// Smallest `1 / distance` over the vertices reached at a positive
/// distance, scaled by the maximum over all vertices.
pub fn eccentricity<D: Datasource + ?Sized>(
    datasource: &D,
    graph: &GraphDefinition,
    options: &CentralityOptions,
) -> Result<Metrics> {
    let options = distance_options(options, Some(Algorithm::FloydWarshall));
    let mut metrics = per_source(datasource, graph, &Value::Null, &options, |results| {
        results
            .iter()
            .filter(|r| r.distance > 0.0)
            .map(|r| 1.0 / r.distance)
            .reduce(f64::min)
            .unwrap_or(0.0)
    })?;
    normalize(&mut metrics);
    Ok(metrics)
}

// ============================================================================
// Closeness
// ============================================================================

pub fn absolute_closeness<D: Datasource + ?Sized>(
    datasource: &D,
    graph: &GraphDefinition,
    vertex_example: &Value,
    options: &CentralityOptions,
) -> Result<Metrics> {
    per_source(datasource, graph, vertex_example, &distance_options(options, None), total)
}

pub fn closeness<D: Datasource + ?Sized>(
    datasource: &D,
    graph: &GraphDefinition,
    options: &CentralityOptions,
) -> Result<Metrics> {
    let options = distance_options(options, Some(Algorithm::FloydWarshall));
    let mut metrics = per_source(datasource, graph, &Value::Null, &options, |results| reciprocal(total(results)))?;
    normalize(&mut metrics);
    Ok(metrics)
}

// ============================================================================
// Betweenness
// ============================================================================

/// Adds `1 / (L + 1)` to every interior vertex of every minimal path of `L`
/// edges. Paths through vertices that no longer exist are skipped.
#[tracing::instrument(level = "debug", skip_all, fields(graph = %graph.name, direction = %options.direction))]
pub fn absolute_betweenness<D: Datasource + ?Sized>(
    datasource: &D,
    graph: &GraphDefinition,
    options: &CentralityOptions,
) -> Result<Metrics> {
    let options = ShortestPathOptions { no_paths: false, stop_at_first_match: false, ..options.clone() };
    let collections = graph.collections(options.direction, &options.restrictions());
    let starts = select_vertices(datasource, &collections.start, &Value::Null)?;
    let targets = select_vertices(datasource, &collections.end, &Value::Null)?;
    let edges = load_edges(datasource, &collections.edges, &options)?;
    let table = FloydWarshall::from_options(&options).table(&edges, starts.iter().map(|v| &v.id));

    let mut metrics: Metrics = starts.iter().map(|v| (v.id.clone(), 0.0)).collect();
    let mut exists: HashMap<DocumentId, bool> = starts
        .iter()
        .chain(&targets)
        .map(|v| (v.id.clone(), true))
        .collect();
    let mut credited = 0usize;

    for start in &starts {
        for target in &targets {
            if start.id == target.id {
                continue;
            }
            for path in table.paths(&start.id, &target.id) {
                let length = path.edges.len();
                if length < 2 {
                    continue;
                }
                let interior = &path.vertices[1..length];
                let resolvable = interior.iter().all(|&id| {
                    *exists
                        .entry(id.clone())
                        .or_insert_with(|| datasource.document(id).is_some())
                });
                if !resolvable {
                    tracing::debug!(from = %start.id, to = %target.id, "shortest path through missing vertex");
                    continue;
                }
                let share = 1.0 / (length as f64 + 1.0);
                for &id in interior {
                    *metrics.entry(id.clone()).or_insert(0.0) += share;
                }
                credited += 1;
            }
        }
    }
    tracing::debug!(paths = credited, "betweenness folded");
    Ok(metrics)
}

pub fn betweenness<D: Datasource + ?Sized>(
    datasource: &D,
    graph: &GraphDefinition,
    options: &CentralityOptions,
) -> Result<Metrics> {
    let mut metrics = absolute_betweenness(datasource, graph, options)?;
    normalize(&mut metrics);
    Ok(metrics)
}

// ============================================================================
// Radius & diameter
// ============================================================================

/// `None` when no vertex reaches another.
pub fn radius<D: Datasource + ?Sized>(
    datasource: &D,
    graph: &GraphDefinition,
    options: &CentralityOptions,
) -> Result<Option<f64>> {
    let options = distance_options(options, Some(Algorithm::FloydWarshall));
    let metrics = absolute_eccentricity(datasource, graph, &Value::Null, &options)?;
    Ok(metrics.into_values().filter(|e| *e > 0.0).reduce(f64::min))
}

pub fn diameter<D: Datasource + ?Sized>(
    datasource: &D,
    graph: &GraphDefinition,
    options: &CentralityOptions,
) -> Result<f64> {
    let options = distance_options(options, Some(Algorithm::FloydWarshall));
    let metrics = absolute_eccentricity(datasource, graph, &Value::Null, &options)?;
    Ok(metrics.into_values().fold(0.0, f64::max))
}
