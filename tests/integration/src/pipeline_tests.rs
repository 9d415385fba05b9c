//! End-to-end tests for the resolution pipeline
//!
//! These tests drive each layer by hand (decode -> tree -> graph ->
//! passes) and check the result agrees with the one-call `Config` API.

use pretty_assertions::assert_eq;
use refconf_core::{Config, DependencyGraph, Error, decode, resolve, resolve_tree};
use refconf_expr::{Evaluator, ExprError, Mode};
use refconf_test_utils::documents;
use refconf_tree::Tree;
use rstest::rstest;
use serde_json::json;

#[rstest]
#[case(documents::COMPLEX_REFERENCES)]
#[case(documents::MATH)]
#[case(documents::NESTED_EXPRESSIONS)]
#[case(documents::COMPOUND_PATHS)]
#[case(documents::COMMENTED)]
#[case(documents::CONTAINERS)]
fn test_layered_pipeline_matches_config(#[case] source: &str) {
    let mut tree = Tree::build(decode(source).unwrap());
    let graph = DependencyGraph::from_tree(&tree);
    graph.validate().unwrap();

    resolve_tree(&mut tree, &Evaluator::new(Mode::Restricted)).unwrap();
    assert!(tree.unresolved().is_empty());
    assert_eq!(tree.resolved_count(), tree.len());

    let config = Config::parse(source).unwrap();
    assert_eq!(tree.into_value(), config.into_value());
}

#[test]
fn test_resolve_function_matches_config() {
    let document = decode(documents::CONTAINERS).unwrap();
    let resolved = resolve(document, Mode::Restricted).unwrap();
    assert_eq!(resolved, Config::parse(documents::CONTAINERS).unwrap().into_value());
}

#[test]
fn test_failed_validation_leaves_tree_untouched() {
    let document = decode(documents::CYCLIC_REFERENCE).unwrap();
    let mut tree = Tree::build(document.clone());

    let err = resolve_tree(&mut tree, &Evaluator::default()).unwrap_err();
    assert!(err.is_reference_error());
    assert_eq!(tree.materialize(tree.root()), document);
}

#[test]
fn test_graph_reports_direct_dependencies() {
    let tree = Tree::build(decode(documents::COMPLEX_REFERENCES).unwrap());
    let graph = DependencyGraph::from_tree(&tree);

    assert_eq!(graph.dependencies_of("b"), vec!["a", "c"]);
    assert_eq!(graph.dependencies_of("c"), vec!["d"]);
    assert_eq!(graph.dependencies_of("d"), vec!["a", "e"]);
    assert!(graph.dependencies_of("a").is_empty());
}

#[test]
fn test_container_dependencies_include_descendants() {
    let tree = Tree::build(decode(documents::CONTAINERS).unwrap());
    let graph = DependencyGraph::from_tree(&tree);

    assert!(graph.dependencies_of("f").contains(&"x"));
    assert!(graph.dependencies_of("g").contains(&"year"));
    assert!(graph.references_of("f").is_empty());
}

#[test]
fn test_evaluator_errors_map_to_document_errors() {
    let evaluator = Evaluator::new(Mode::Restricted);
    assert!(matches!(
        evaluator.evaluate("cwd()"),
        Err(ExprError::Forbidden { ref capability }) if capability == "cwd"
    ));

    let err = Config::parse(r#"{"here": "{{ cwd() }}"}"#).unwrap_err();
    assert!(matches!(
        err,
        Error::ForbiddenCapability { ref path, ref capability }
            if path == "here" && capability == "cwd"
    ));
}

#[test]
fn test_same_expression_in_both_modes() {
    let source = "{{ [len('abc'), 2 ** 10, 7 // 2] }}";
    let restricted = Evaluator::new(Mode::Restricted).evaluate_template(source).unwrap();
    let unrestricted = Evaluator::new(Mode::Unrestricted).evaluate_template(source).unwrap();
    assert_eq!(restricted, Some(json!([3, 1024, 3])));
    assert_eq!(restricted, unrestricted);
}
