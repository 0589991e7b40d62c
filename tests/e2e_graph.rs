//! End-to-end integration tests for named graphs and neighborhood functions.
//!
//! Graph `social`: `persons -knows-> persons`, `persons -livesIn-> cities`,
//! with `tags` as an orphan collection.

use docgraph::{
    CollectionKind, CollectionRestriction, Datasource, Direction, EdgeDefinition, Engine, Error,
    GraphDefinition, MemoryStore, NeighborOptions, PathsOptions, Value, VertexOptions,
};
use pretty_assertions::assert_eq;
use serde_json::json;

// ============================================================================
// Fixture
// ============================================================================

fn social_graph() -> GraphDefinition {
    GraphDefinition::new(
        "social",
        vec![
            EdgeDefinition::new("knows", ["persons"], ["persons"]),
            EdgeDefinition::new("livesIn", ["persons"], ["cities"]),
        ],
    )
    .with_orphans(["tags"])
}

fn social() -> Engine<MemoryStore> {
    let engine = Engine::open_memory();
    let store = engine.datasource();
    for (name, kind) in [
        ("persons", CollectionKind::Document),
        ("cities", CollectionKind::Document),
        ("tags", CollectionKind::Document),
        ("knows", CollectionKind::Edge),
        ("livesIn", CollectionKind::Edge),
    ] {
        store.create_collection(name, kind).unwrap();
    }
    for key in ["alice", "bob", "carol", "dave"] {
        store.insert("persons", json!({"_key": key})).unwrap();
    }
    for key in ["bonn", "koeln"] {
        store.insert("cities", json!({"_key": key})).unwrap();
    }
    store.insert("tags", json!({"_key": "t1"})).unwrap();
    for (from, to, since) in [("alice", "bob", 2010), ("bob", "carol", 2015), ("alice", "carol", 2020), ("dave", "carol", 2015)] {
        store
            .insert("knows", json!({"_from": format!("persons/{from}"), "_to": format!("persons/{to}"), "since": since}))
            .unwrap();
    }
    for (from, to) in [("alice", "bonn"), ("bob", "bonn"), ("carol", "koeln")] {
        store
            .insert("livesIn", json!({"_from": format!("persons/{from}"), "_to": format!("cities/{to}")}))
            .unwrap();
    }
    store.create_graph(social_graph()).unwrap();
    engine
}

fn neighbor_keys(engine: &Engine<MemoryStore>, start: &str, options: &NeighborOptions) -> Vec<String> {
    engine
        .graph_neighbors("social", &Value::from(start), options)
        .unwrap()
        .iter()
        .map(|n| n.vertex.id.key().to_owned())
        .collect()
}

// ============================================================================
// 1. Graph definitions
// ============================================================================

#[test]
fn test_graph_definition_validation() {
    let engine = social();
    let store = engine.datasource();
    assert!(social_graph().validate(store).is_ok());

    let swapped = GraphDefinition::new("bad", vec![EdgeDefinition::new("persons", ["knows"], ["knows"])]);
    assert!(matches!(swapped.validate(store), Err(Error::TypeError { .. })));

    let missing = GraphDefinition::new("bad", vec![EdgeDefinition::new("knows", ["ghosts"], ["persons"])]);
    assert!(matches!(store.create_graph(missing), Err(Error::NotFound(_))));
    assert!(matches!(store.create_graph(social_graph()), Err(Error::InvalidArgument(_))));
}

#[test]
fn test_graph_definition_from_json() {
    let graph: GraphDefinition = serde_json::from_value(json!({
        "name": "social",
        "edgeDefinitions": [{"collection": "knows", "from": ["persons"], "to": ["persons"]}],
    }))
    .unwrap();
    assert_eq!(graph.vertex_collections(), vec!["persons"]);
    assert!(graph.orphan_collections.is_empty());
}

#[test]
fn test_graph_vertices() {
    let engine = social();
    let all = engine.graph_vertices("social", &Value::Null, &VertexOptions::default()).unwrap();
    assert_eq!(all.len(), 6);

    let orphans = VertexOptions {
        vertex_collection_restriction: Some(CollectionRestriction::One("tags".into())),
        ..VertexOptions::default()
    };
    let found = engine.graph_vertices("social", &Value::Null, &orphans).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id.as_str(), "tags/t1");

    let inbound = VertexOptions { direction: Direction::Inbound, vertex_collection_restriction: None };
    let targets = engine.graph_vertices("social", &Value::from(json!({"_key": "bonn"})), &inbound).unwrap();
    assert_eq!(targets.len(), 1);
}

// ============================================================================
// 2. Edges & neighbors
// ============================================================================

#[test]
fn test_edges_of_a_vertex() {
    let engine = social();
    let all = engine.edges("knows", "persons/carol", Direction::Inbound, None).unwrap();
    assert_eq!(all.len(), 3);

    let since = Value::from(json!({"since": 2015}));
    let found = engine.edges("knows", "persons/carol", Direction::Inbound, Some(&since)).unwrap();
    let froms: Vec<&str> = found.iter().map(|e| e.from.key()).collect();
    assert_eq!(froms, vec!["bob", "dave"]);

    assert!(matches!(
        engine.edges("knows", "carol", Direction::Inbound, None),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        engine.edges("persons", "persons/carol", Direction::Inbound, None),
        Err(Error::TypeError { .. })
    ));
}

#[test]
fn test_direct_neighbors() {
    let engine = social();
    let found = engine.neighbors("persons", "knows", "bob", Direction::Any, None).unwrap();
    let keys: Vec<&str> = found.iter().map(|n| n.vertex.id.key()).collect();
    assert_eq!(keys, vec!["carol", "alice"]);
    assert_eq!(found[0].to_value().get("edge").get("since"), &Value::from(2015));
}

#[test]
fn test_graph_neighbors_and_restrictions() {
    let engine = social();
    assert_eq!(neighbor_keys(&engine, "persons/alice", &NeighborOptions::default()), vec!["bob", "carol", "bonn"]);

    let cities = NeighborOptions {
        vertex_collection_restriction: Some(CollectionRestriction::One("cities".into())),
        ..NeighborOptions::default()
    };
    assert_eq!(neighbor_keys(&engine, "persons/alice", &cities), vec!["bonn"]);

    let knows = NeighborOptions {
        edge_collection_restriction: Some(CollectionRestriction::Many(vec!["knows".into()])),
        ..NeighborOptions::default()
    };
    assert_eq!(neighbor_keys(&engine, "persons/alice", &knows), vec!["bob", "carol"]);

    let carol_only = NeighborOptions { neighbor_examples: Some(Value::from("persons/carol")), ..NeighborOptions::default() };
    assert_eq!(neighbor_keys(&engine, "persons/alice", &carol_only), vec!["carol"]);
}

#[test]
fn test_graph_neighbors_two_hops() {
    let engine = social();
    let options = NeighborOptions { max_depth: 2, ..NeighborOptions::default() };
    assert_eq!(neighbor_keys(&engine, "persons/dave", &options), vec!["carol", "bob", "alice", "koeln"]);

    let found = engine.graph_neighbors("social", &Value::from("persons/dave"), &options).unwrap();
    let value = found[1].to_value();
    assert_eq!(value.get("startVertex"), &Value::from("persons/dave"));
    assert_eq!(value.get("path").get("vertices").as_array().map(<[Value]>::len), Some(3));
}

#[test]
fn test_graph_edges_are_distinct() {
    let engine = social();
    let options = NeighborOptions { max_depth: 2, ..NeighborOptions::default() };
    let edges = engine.graph_edges("social", &Value::from("persons/alice"), &options).unwrap();
    let distinct: std::collections::HashSet<&str> = edges.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(distinct.len(), edges.len());
    // alice's three edges, then bob's and carol's onward edges
    assert_eq!(edges.len(), 7);
}

#[test]
fn test_common_neighbors() {
    let engine = social();
    let options = NeighborOptions::default();
    let common = engine
        .graph_common_neighbors(
            "social",
            (&Value::from("persons/alice"), &options),
            (&Value::from("persons/dave"), &options),
        )
        .unwrap();
    assert_eq!(common.len(), 1);
    let (first, by_second) = common.first().unwrap();
    assert_eq!(first.key(), "alice");
    let shared: Vec<&str> = by_second.values().flatten().map(|v| v.id.key()).collect();
    assert_eq!(shared, vec!["carol"]);
}

// ============================================================================
// 3. Paths
// ============================================================================

#[test]
fn test_graph_paths_to_a_city() {
    let engine = social();
    let options = PathsOptions { min_length: 1, ..PathsOptions::default() };
    let found = engine.graph_paths("social", &options).unwrap();
    let into_koeln = found.iter().filter(|p| p.destination().id.key() == "koeln").count();
    assert_eq!(into_koeln, 5);
    assert!(found.iter().all(|p| p.source().collection() == "persons"));
}

#[test]
fn test_unknown_graph() {
    let engine = social();
    assert!(matches!(engine.graph_paths("nope", &PathsOptions::default()), Err(Error::NotFound(_))));
    assert!(engine.datasource().graph("social").is_some());
}
