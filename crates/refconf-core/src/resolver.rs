//! Placeholder substitution passes
//!
//! A pass visits every unresolved node in document order. A node whose
//! references all point at resolved nodes gets its placeholders replaced
//! and, for string values, goes through the expression stage; it is then
//! resolved. Nodes that still wait on something are left for the next
//! pass. Containers become resolved once their keys are substituted and
//! all of their children are resolved.

use std::collections::HashSet;

use refconf_expr::{Evaluator, render_text};
use refconf_tree::{NodeId, NodeKind, NodeState, Tree};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::expression;
use crate::reference::{single_placeholder, substitute};

/// Run one substitution pass. Returns how many leaf nodes it resolved.
pub fn substitution_pass(tree: &mut Tree, evaluator: &Evaluator) -> Result<usize> {
    let mut resolved = 0;
    for id in tree.unresolved() {
        let kind = tree.node(id).kind.clone();
        match kind {
            NodeKind::Scalar(Value::String(text)) => {
                if resolve_string(tree, evaluator, id, &text)? {
                    resolved += 1;
                }
            }
            NodeKind::Scalar(_) => {
                tree.set_state(id, NodeState::Resolved);
                resolved += 1;
            }
            NodeKind::Mapping(_) => substitute_keys(tree, id)?,
            NodeKind::Sequence(_) => {}
        }
    }
    Ok(resolved)
}

/// Mark containers whose keys and children are all final.
///
/// Children have larger ids than their parents, so one reverse sweep
/// settles nested containers bottom-up. Returns how many containers it
/// resolved.
pub fn refresh_containers(tree: &mut Tree) -> usize {
    let mut resolved = 0;
    let ids: Vec<NodeId> = tree.ids().collect();
    for id in ids.into_iter().rev() {
        let node = tree.node(id);
        if node.is_resolved() || !node.kind.is_container() {
            continue;
        }
        let keys_done = match &node.kind {
            NodeKind::Mapping(entries) => entries.iter().all(|e| e.resolved_key.is_some()),
            _ => true,
        };
        let children_done = node
            .children()
            .into_iter()
            .all(|child| tree.node(child).is_resolved());
        if keys_done && children_done {
            tree.set_state(id, NodeState::Resolved);
            resolved += 1;
        }
    }
    resolved
}

/// Text form of the resolved node at `path`, or `None` while it is not
/// resolved yet.
fn render_reference(tree: &Tree, origin: &str, path: &str) -> Result<Option<String>> {
    let target = tree.lookup(path).map_err(|_| Error::UnknownReference {
        path: path.to_string(),
        referenced_by: origin.to_string(),
    })?;
    if !tree.node(target).is_resolved() {
        return Ok(None);
    }
    Ok(Some(render_text(&tree.materialize(target))))
}

fn resolve_string(tree: &mut Tree, evaluator: &Evaluator, id: NodeId, text: &str) -> Result<bool> {
    let path = tree.path(id).to_string();

    if let Some(reference) = single_placeholder(text) {
        let target = tree.lookup(reference).map_err(|_| Error::UnknownReference {
            path: reference.to_string(),
            referenced_by: path.clone(),
        })?;
        if !tree.node(target).is_resolved() {
            return Ok(false);
        }
        let value = tree.materialize(target);
        if value.is_array() || value.is_object() {
            tracing::trace!(path = %path, target = reference, "Substituting container");
            tree.set_value(id, value);
            tree.set_state(id, NodeState::Resolved);
            return Ok(true);
        }
    }

    let Some(substituted) = substitute(text, |reference| {
        render_reference(tree, &path, reference)
    })?
    else {
        return Ok(false);
    };

    let value = match expression::evaluate(evaluator, &path, &substituted)? {
        Some(value) => value,
        None => Value::String(substituted),
    };
    tree.set_value(id, value);
    tree.set_state(id, NodeState::Resolved);
    Ok(true)
}

fn substitute_keys(tree: &mut Tree, id: NodeId) -> Result<()> {
    let path = tree.path(id).to_string();
    let NodeKind::Mapping(entries) = &tree.node(id).kind else {
        return Ok(());
    };
    if entries.iter().all(|e| e.resolved_key.is_some()) {
        return Ok(());
    }

    let mut keys: Vec<Option<String>> = Vec::with_capacity(entries.len());
    for entry in entries {
        let key = match &entry.resolved_key {
            Some(done) => Some(done.clone()),
            None => substitute(&entry.key, |reference| {
                render_reference(tree, &path, reference)
            })?,
        };
        keys.push(key);
    }

    if keys.iter().all(Option::is_some) {
        let mut seen = HashSet::new();
        for key in keys.iter().flatten() {
            if !seen.insert(key.as_str()) {
                return Err(Error::DuplicateKey {
                    path,
                    key: key.clone(),
                });
            }
        }
    }

    if let NodeKind::Mapping(entries) = &mut tree.node_mut(id).kind {
        for (entry, key) in entries.iter_mut().zip(keys) {
            if entry.resolved_key.is_none() {
                entry.resolved_key = key;
            }
        }
    }
    Ok(())
}
