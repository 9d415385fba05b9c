//! `refconf deps`

use std::path::Path;

use colored::Colorize;
use refconf_core::{DependencyGraph, decode};
use refconf_tree::Tree;

use crate::error::Result;

/// Label printed for the document root, whose path is empty.
const ROOT_LABEL: &str = "(root)";

/// Print every node's direct references, then validate the graph.
pub fn run_deps(path: &Path) -> Result<()> {
    let source = super::read_source(path)?;
    let tree = Tree::build(decode(&source)?);
    let graph = DependencyGraph::from_tree(&tree);
    tracing::debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "Built dependency graph"
    );

    for line in describe(&graph) {
        println!("{}", line);
    }

    graph.validate()?;
    println!("{} all references are satisfiable", "OK".green().bold());
    Ok(())
}

/// One line per node that writes a placeholder, in document order.
pub fn describe(graph: &DependencyGraph) -> Vec<String> {
    graph
        .own_references()
        .filter_map(|(node, references)| {
            if references.is_empty() {
                return None;
            }
            let targets: Vec<String> = references
                .iter()
                .map(|reference| match &reference.target {
                    Some(target) => target.clone(),
                    None => format!("{} (unknown)", reference.raw),
                })
                .collect();
            let label = if node.is_empty() { ROOT_LABEL } else { node };
            Some(format!("{} -> {}", label, targets.join(", ")))
        })
        .collect()
}
