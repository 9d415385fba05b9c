//! Resolution driver
//!
//! Runs static validation, then substitution passes until every node is
//! resolved. Any error aborts the whole resolution; callers never see a
//! partially resolved document.

use refconf_expr::{Evaluator, Mode};
use refconf_tree::Tree;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::graph::DependencyGraph;
use crate::resolver::{refresh_containers, substitution_pass};

/// Resolve a decoded document.
///
/// # Errors
///
/// Reference errors from validation, expression errors from evaluation,
/// `DuplicateKey` from key substitution, or `Stalled` if passes stop making
/// progress.
pub fn resolve(document: Value, mode: Mode) -> Result<Value> {
    let mut tree = Tree::build(document);
    resolve_tree(&mut tree, &Evaluator::new(mode))?;
    Ok(tree.into_value())
}

/// Resolve every node of `tree` in place.
pub fn resolve_tree(tree: &mut Tree, evaluator: &Evaluator) -> Result<()> {
    DependencyGraph::from_tree(tree).validate()?;
    run_passes(tree, evaluator)
}

/// Substitution passes until every node is resolved. Expects a validated
/// tree; anything else ends in `Stalled`.
fn run_passes(tree: &mut Tree, evaluator: &Evaluator) -> Result<()> {
    let total = tree.len();
    let mut resolved = tree.resolved_count();
    let mut pass = 0;

    while resolved < total {
        pass += 1;
        let leaves = substitution_pass(tree, evaluator)?;
        let containers = refresh_containers(tree);
        let now = tree.resolved_count();
        tracing::debug!(pass, leaves, containers, resolved = now, total, "Substitution pass");

        if now <= resolved {
            let unresolved: Vec<String> = tree
                .unresolved()
                .into_iter()
                .map(|id| tree.path(id).to_string())
                .collect();
            tracing::warn!(?unresolved, "Resolution made no progress");
            return Err(Error::Stalled { unresolved });
        }
        resolved = now;
    }

    tracing::debug!(passes = pass, nodes = total, mode = %evaluator.mode(), "Document resolved");
    Ok(())
}
