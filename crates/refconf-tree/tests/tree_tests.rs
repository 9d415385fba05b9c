//! Tests for node tree construction and lookup

use pretty_assertions::assert_eq;
use refconf_tree::{Error, NodeKind, NodeState, Tree};
use rstest::rstest;
use serde_json::json;

fn sample() -> Tree {
    Tree::build(json!({
        "person": {
            "name": "John",
            "address": { "town": "Dublin" }
        },
        "e": ["a", "b", 2],
        "nested": [[1, 2], {"x": true}]
    }))
}

#[rstest]
#[case("person.name", json!("John"))]
#[case("person.address.town", json!("Dublin"))]
#[case("e.0", json!("a"))]
#[case("e[2]", json!(2))]
#[case("nested.0.1", json!(2))]
#[case("nested[1].x", json!(true))]
fn test_lookup_resolves_paths(#[case] path: &str, #[case] expected: serde_json::Value) {
    let tree = sample();
    let id = tree.lookup(path).unwrap();
    assert_eq!(tree.materialize(id), expected);
}

#[rstest]
#[case("missing")]
#[case("person.age")]
#[case("e.3")]
#[case("person.name.first")]
#[case("")]
fn test_lookup_missing_paths(#[case] path: &str) {
    let tree = sample();
    assert_eq!(
        tree.lookup(path),
        Err(Error::PathNotFound {
            path: path.to_string()
        })
    );
}

#[test]
fn test_lookup_non_numeric_segment_in_sequence() {
    let tree = sample();
    assert_eq!(
        tree.lookup("e.first"),
        Err(Error::InvalidIndex {
            path: "e.first".to_string(),
            segment: "first".to_string(),
        })
    );
}

#[test]
fn test_paths_are_unique() {
    let tree = sample();
    let mut paths: Vec<&str> = tree.nodes().map(|n| n.path()).collect();
    let total = paths.len();
    paths.sort();
    paths.dedup();
    assert_eq!(paths.len(), total);
}

#[test]
fn test_dotted_key_shares_a_path_but_not_an_id() {
    let tree = Tree::build(json!({"a.b": 0, "a": {"b": 1}}));
    let dotted = tree.children(tree.root())[0];
    let nested = tree.lookup("a.b").unwrap();
    assert_ne!(dotted, nested);
    assert_eq!(tree.path(dotted), tree.path(nested));
    assert_eq!(tree.materialize(nested), json!(1));
}

#[test]
fn test_every_path_looks_up_its_own_node() {
    let tree = sample();
    for id in tree.ids().skip(1) {
        assert_eq!(tree.lookup(tree.path(id)), Ok(id));
    }
}

#[test]
fn test_sequence_segments_are_indices() {
    let tree = sample();
    let id = tree.lookup("e.1").unwrap();
    assert_eq!(tree.node(id).segment(), Some("1"));
    assert_eq!(tree.node(id).path(), "e.1");
}

#[test]
fn test_nodes_start_unresolved() {
    let tree = sample();
    assert_eq!(tree.resolved_count(), 0);
    assert_eq!(tree.unresolved().len(), tree.len());
    assert!(tree.nodes().all(|n| n.state == NodeState::Unresolved));
}

#[test]
fn test_set_value_replaces_leaf() {
    let mut tree = sample();
    let id = tree.lookup("person.name").unwrap();
    tree.set_value(id, json!("Jane"));
    tree.set_state(id, NodeState::Resolved);
    assert_eq!(tree.node(id).kind, NodeKind::Scalar(json!("Jane")));
    assert_eq!(tree.resolved_count(), 1);
}

#[test]
fn test_into_value_round_trips_document() {
    let document = json!({"b": 1, "a": [true, null, {"z": "y"}]});
    let tree = Tree::build(document.clone());
    assert_eq!(tree.into_value(), document);
}
