//! End-to-end integration tests for shortest paths and centrality.
//!
//! The main fixture is the weighted triangle `a -> b (1)`, `b -> c (1)`,
//! `a -> c (5)` in graph `triangle`, plus a unit-weight ring for comparing
//! Dijkstra against hop counts.

use docgraph::{
    Algorithm, CentralityOptions, CollectionKind, Datasource, Direction, DocumentId, Edge,
    EdgeDefinition, Engine, Error, GraphDefinition, MemoryStore, ShortestPathOptions,
    ShortestPathResult, TraversalOptions, Value, Vertex,
};
use pretty_assertions::assert_eq;
use serde_json::json;

// ============================================================================
// Fixtures
// ============================================================================

fn engine_with(edges: &[(&str, &str, f64)], vertices: &[&str]) -> Engine<MemoryStore> {
    let engine = Engine::open_memory();
    let store = engine.datasource();
    store.create_collection("v", CollectionKind::Document).unwrap();
    store.create_collection("e", CollectionKind::Edge).unwrap();
    for key in vertices {
        store.insert("v", json!({"_key": key})).unwrap();
    }
    for (from, to, w) in edges {
        store
            .insert("e", json!({"_from": format!("v/{from}"), "_to": format!("v/{to}"), "w": w}))
            .unwrap();
    }
    store
        .create_graph(GraphDefinition::new("triangle", vec![EdgeDefinition::new("e", ["v"], ["v"])]))
        .unwrap();
    engine
}

fn triangle() -> Engine<MemoryStore> {
    engine_with(&[("a", "b", 1.0), ("b", "c", 1.0), ("a", "c", 5.0)], &["a", "b", "c"])
}

fn weighted(direction: Direction) -> ShortestPathOptions {
    ShortestPathOptions { direction, weight: Some("w".into()), ..ShortestPathOptions::default() }
}

fn path_keys(result: &ShortestPathResult) -> Vec<&str> {
    result.vertex_ids().into_iter().map(DocumentId::key).collect()
}

fn all_vertices(engine: &Engine<MemoryStore>) -> Vec<Vertex> {
    engine.datasource().documents("v").unwrap().into_iter().filter_map(Vertex::from_document).collect()
}

fn all_edges(engine: &Engine<MemoryStore>) -> Vec<Edge> {
    engine.datasource().documents("e").unwrap().into_iter().filter_map(Edge::from_document).collect()
}

// ============================================================================
// 1. Single pair
// ============================================================================

#[test]
fn test_triangle_shortest_path() {
    let engine = triangle();
    let found = engine
        .shortest_path("v", "e", "a", "c", &weighted(Direction::Outbound))
        .unwrap()
        .unwrap();
    assert_eq!(found.distance, 2.0);
    assert_eq!(path_keys(&found), vec!["a", "b", "c"]);

    let value = found.to_value();
    assert_eq!(value.get("startVertex"), &Value::from("v/a"));
    assert_eq!(value.get("path").get("edges").as_array().map(<[Value]>::len), Some(2));
}

#[test]
fn test_against_edge_direction_there_is_no_path() {
    let engine = triangle();
    let found = engine.shortest_path("v", "e", "c", "a", &weighted(Direction::Outbound)).unwrap();
    assert!(found.is_none());
    let back = engine.shortest_path("v", "e", "c", "a", &weighted(Direction::Inbound)).unwrap().unwrap();
    assert_eq!(path_keys(&back), vec!["c", "b", "a"]);
}

#[test]
fn test_default_weight_for_missing_attribute() {
    let engine = triangle();
    engine.datasource().insert("e", json!({"_from": "v/a", "_to": "v/c"})).unwrap();
    let options = ShortestPathOptions { default_weight: Some(0.5), ..weighted(Direction::Outbound) };
    let found = engine.shortest_path("v", "e", "a", "c", &options).unwrap().unwrap();
    assert_eq!(found.distance, 0.5);
    assert_eq!(path_keys(&found), vec!["a", "c"]);
}

#[test]
fn test_unit_weights_match_breadth_first_hops() {
    // ring 0 -> 1 -> ... -> 7 -> 0 with two chords
    let keys: Vec<String> = (0..8).map(|i| i.to_string()).collect();
    let mut edges: Vec<(String, String)> = (0..8).map(|i| (i.to_string(), ((i + 1) % 8).to_string())).collect();
    edges.push(("0".into(), "4".into()));
    edges.push(("2".into(), "6".into()));
    let edge_refs: Vec<(&str, &str, f64)> = edges.iter().map(|(f, t)| (f.as_str(), t.as_str(), 1.0)).collect();
    let key_refs: Vec<&str> = keys.iter().map(String::as_str).collect();
    let engine = engine_with(&edge_refs, &key_refs);

    let bfs = TraversalOptions::from_json(json!({
        "strategy": "breadthfirst",
        "uniqueness": {"vertices": "global", "edges": "global"},
        "paths": true,
    }))
    .unwrap();
    let levels = engine.traversal("v", "e", "0", Direction::Outbound, &bfs).unwrap();

    let options = ShortestPathOptions { direction: Direction::Outbound, ..ShortestPathOptions::default() };
    for item in levels.iter().skip(1) {
        let target = item.get("vertex").get("_key").as_str().unwrap();
        let hops = item.get("path").get("edges").as_array().unwrap().len() as f64;
        let found = engine.shortest_path("v", "e", "0", target, &options).unwrap().unwrap();
        assert_eq!(found.distance, hops, "hops to {target}");
    }
    assert_eq!(levels.len(), 8);
}

#[test]
fn test_missing_end_handle_is_not_an_error() {
    let engine = triangle();
    let found = engine.shortest_path("v", "e", "a", "zz", &weighted(Direction::Outbound)).unwrap();
    assert!(found.is_none());
    assert!(matches!(
        engine.shortest_path("v", "e", "zz", "a", &weighted(Direction::Outbound)),
        Err(Error::NotFound(_))
    ));
}

// ============================================================================
// 2. Graph shortest paths
// ============================================================================

#[test]
fn test_graph_shortest_path_algorithms_agree() {
    let engine = triangle();
    let distances = |algorithm: Algorithm| -> Vec<(String, String, f64)> {
        let options = ShortestPathOptions { algorithm: Some(algorithm), ..weighted(Direction::Outbound) };
        engine
            .graph_shortest_path("triangle", &Value::Null, &Value::Null, &options)
            .unwrap()
            .iter()
            .map(|r| (r.start_vertex.key().to_owned(), r.vertex.id.key().to_owned(), r.distance))
            .collect()
    };
    let expected = vec![
        ("a".to_owned(), "b".to_owned(), 1.0),
        ("a".to_owned(), "c".to_owned(), 2.0),
        ("b".to_owned(), "c".to_owned(), 1.0),
    ];
    assert_eq!(distances(Algorithm::FloydWarshall), expected);
    assert_eq!(distances(Algorithm::Dijkstra), expected);
}

#[test]
fn test_graph_shortest_path_with_examples() {
    let engine = triangle();
    let options = weighted(Direction::Any);
    let found = engine
        .graph_shortest_path("triangle", &Value::from("v/c"), &Value::from(json!([{"_id": "v/a"}])), &options)
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].distance, 2.0);
    assert_eq!(path_keys(&found[0]), vec!["c", "b", "a"]);
}

#[test]
fn test_stop_at_first_match_and_distance_to() {
    let engine = triangle();
    let options = ShortestPathOptions { stop_at_first_match: true, ..weighted(Direction::Outbound) };
    let found = engine.graph_shortest_path("triangle", &Value::from("v/a"), &Value::Null, &options).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].vertex.id.key(), "b");

    let found = engine
        .graph_distance_to("triangle", &Value::Null, &Value::Null, &weighted(Direction::Outbound))
        .unwrap();
    assert_eq!(found.len(), 3);
    assert!(found.iter().all(|r| r.path.is_none()));
    assert_eq!(found[0].to_value().get("paths"), &Value::Null);
}

#[test]
fn test_unknown_algorithm_is_an_options_error() {
    let err = ShortestPathOptions::from_json(json!({"algorithm": "bellman-ford"})).unwrap_err();
    assert!(matches!(err, Error::Options(_)));
}

// ============================================================================
// 3. All pairs
// ============================================================================

#[test]
fn test_all_pairs_is_idempotent() {
    // two equally short routes from a to d
    let engine = engine_with(
        &[("a", "b", 1.0), ("b", "d", 1.0), ("a", "c", 1.0), ("c", "d", 1.0), ("d", "e", 2.0)],
        &["a", "b", "c", "d", "e"],
    );
    let vertices = all_vertices(&engine);
    let edges = all_edges(&engine);
    let options = weighted(Direction::Any);

    let first = engine.all_pairs_shortest_path(&vertices, &vertices, &edges, &options);
    let second = engine.all_pairs_shortest_path(&vertices, &vertices, &edges, &options);
    assert_eq!(first, second);
    assert_eq!(first.len(), 20);
    assert!(first.iter().all(|r| r.start_vertex != r.vertex.id));

    let a_to_e = first
        .iter()
        .find(|r| r.start_vertex.key() == "a" && r.vertex.id.key() == "e")
        .unwrap();
    assert_eq!(a_to_e.distance, 4.0);
    assert_eq!(path_keys(a_to_e), vec!["a", "b", "d", "e"]);
}

#[test]
fn test_all_pairs_drops_paths_through_missing_vertices() {
    let engine = engine_with(
        &[("a", "b", 1.0), ("b", "c", 1.0), ("a", "c", 5.0), ("c", "d", 1.0)],
        &["a", "b", "c", "d"],
    );
    let edges = all_edges(&engine);
    engine.datasource().remove(&DocumentId::new("v", "b")).unwrap();
    let vertices = all_vertices(&engine);
    let found = engine.all_pairs_shortest_path(&vertices, &vertices, &edges, &weighted(Direction::Outbound));
    // every minimal path out of a runs through the removed b
    let pairs: Vec<(&str, &str)> = found.iter().map(|r| (r.start_vertex.key(), r.vertex.id.key())).collect();
    assert_eq!(pairs, vec![("c", "d")]);
}

// ============================================================================
// 4. Centrality
// ============================================================================

#[test]
fn test_radius_and_diameter_of_triangle() {
    let engine = triangle();
    let options = CentralityOptions { direction: Direction::Outbound, weight: Some("w".into()), ..CentralityOptions::default() };
    assert_eq!(engine.radius("triangle", &options).unwrap(), Some(1.0));
    assert_eq!(engine.diameter("triangle", &options).unwrap(), 2.0);
}

#[test]
fn test_centrality_scores_are_normalized() {
    let engine = triangle();
    let options = CentralityOptions { direction: Direction::Any, ..CentralityOptions::default() };
    for metrics in [
        engine.eccentricity("triangle", &options).unwrap(),
        engine.closeness("triangle", &options).unwrap(),
        engine.betweenness("triangle", &options).unwrap(),
    ] {
        assert_eq!(metrics.len(), 3);
        assert!(metrics.values().all(|score| (0.0..=1.0).contains(score)));
    }
    // every vertex is one hop from every other
    let absolute = engine.absolute_closeness("triangle", &Value::Null, &options).unwrap();
    assert!(absolute.values().all(|sum| *sum == 2.0));
    assert!(engine.absolute_betweenness("triangle", &options).unwrap().values().all(|b| *b == 0.0));
}

#[test]
fn test_betweenness_shares_symmetric_routes() {
    // b and c each carry one of the two routes from a to d
    let engine = engine_with(
        &[("a", "b", 1.0), ("b", "d", 1.0), ("a", "c", 1.0), ("c", "d", 1.0)],
        &["a", "b", "c", "d"],
    );
    let options = CentralityOptions { direction: Direction::Outbound, ..CentralityOptions::default() };
    let absolute = engine.absolute_betweenness("triangle", &options).unwrap();
    let scores: Vec<(&str, f64)> = absolute.iter().map(|(id, b)| (id.key(), *b)).collect();
    assert_eq!(scores, vec![("a", 0.0), ("b", 1.0 / 3.0), ("c", 1.0 / 3.0), ("d", 0.0)]);

    let normalized = engine.betweenness("triangle", &options).unwrap();
    let scores: Vec<(&str, f64)> = normalized.iter().map(|(id, b)| (id.key(), *b)).collect();
    assert_eq!(scores, vec![("a", 0.0), ("b", 1.0), ("c", 1.0), ("d", 0.0)]);
}

#[test]
fn test_betweenness_along_a_chain() {
    let engine = engine_with(&[("a", "b", 1.0), ("b", "c", 1.0), ("c", "d", 1.0)], &["a", "b", "c", "d"]);
    let options = CentralityOptions { direction: Direction::Outbound, ..CentralityOptions::default() };
    let absolute = engine.absolute_betweenness("triangle", &options).unwrap();
    let interior = 1.0 / 3.0 + 1.0 / 4.0;
    assert_eq!(absolute.get(&DocumentId::new("v", "b")), Some(&interior));
    assert_eq!(absolute.get(&DocumentId::new("v", "c")), Some(&interior));
    assert_eq!(absolute.get(&DocumentId::new("v", "a")), Some(&0.0));
}

#[test]
fn test_centrality_on_unknown_graph() {
    let engine = triangle();
    assert!(matches!(engine.radius("nope", &CentralityOptions::default()), Err(Error::NotFound(_))));
}
