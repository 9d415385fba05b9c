//! Reference graph and static validation
//!
//! Every node of a document gets a *direct dependency set*: the nodes
//! named by placeholders in its own string value or, for a mapping, in its
//! keys, plus for containers everything their descendants reference. A
//! container therefore depends on whatever its contents depend on, and a
//! value that references the container holding it is a self reference.
//!
//! Nodes are identified by [`NodeId`]. Qualified paths only label nodes in
//! errors and queries, since a top-level key `"a.b"` and the nested key
//! `b` under `a` share the path `a.b`.
//!
//! Validation walks this relation depth-first from every node in document
//! order and fails on the first self reference, cycle or dangling
//! reference it meets. It runs once, before any value is touched.
//!
//! # Example
//!
//! ```
//! use refconf_core::graph::DependencyGraph;
//! use refconf_tree::Tree;
//! use serde_json::json;
//!
//! let tree = Tree::build(json!({"a": "${b}", "b": "${c}", "c": 1}));
//! let graph = DependencyGraph::from_tree(&tree);
//! assert_eq!(graph.dependencies_of("a"), vec!["b"]);
//! assert!(graph.validate().is_ok());
//! ```

use std::collections::HashMap;

use refconf_tree::{NodeId, NodeKind, Tree};

use crate::error::{Error, Result};
use crate::reference::placeholders;

/// One placeholder occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Path text as written between `${` and `}`.
    pub raw: String,
    /// The referenced node. `None` when nothing matches.
    pub node: Option<NodeId>,
    /// Qualified path of the referenced node.
    pub target: Option<String>,
    /// Path of the node whose value or key holds the placeholder.
    pub origin: String,
}

/// Directed graph from each node to the nodes it needs.
///
/// Edges point from dependent to dependency: if `b` is `"${a}"`, the edge
/// is `b -> a`.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Nodes in validation order: document order, root last.
    nodes: Vec<NodeId>,
    /// Qualified path of each node.
    paths: HashMap<NodeId, String>,
    /// References written in each node's own value or keys.
    own: HashMap<NodeId, Vec<Reference>>,
    /// Direct dependency set of each node.
    edges: HashMap<NodeId, Vec<Reference>>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    OnChain,
    Done,
}

impl DependencyGraph {
    /// Create an empty dependency graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the references of every node of `tree`.
    pub fn from_tree(tree: &Tree) -> Self {
        let mut own: Vec<Vec<Reference>> = Vec::with_capacity(tree.len());
        for node in tree.nodes() {
            let texts: Vec<&str> = match &node.kind {
                NodeKind::Scalar(value) => value.as_str().into_iter().collect(),
                NodeKind::Mapping(entries) => entries.iter().map(|e| e.key.as_str()).collect(),
                NodeKind::Sequence(_) => Vec::new(),
            };
            let mut refs: Vec<Reference> = Vec::new();
            for text in texts {
                for raw in placeholders(text) {
                    if refs.iter().any(|r| r.raw == raw) {
                        continue;
                    }
                    let target = tree.lookup(raw).ok();
                    refs.push(Reference {
                        raw: raw.to_string(),
                        node: target,
                        target: target.map(|id| tree.path(id).to_string()),
                        origin: node.path().to_string(),
                    });
                }
            }
            own.push(refs);
        }

        // Ids are pre-order, so every child is folded in before its parent
        let mut direct: Vec<Vec<Reference>> = own.clone();
        for id in tree.ids().collect::<Vec<NodeId>>().into_iter().rev() {
            for child in tree.children(id) {
                let inherited = direct[child.index()].clone();
                let set = &mut direct[id.index()];
                for reference in inherited {
                    if !set.iter().any(|r| same_dependency(r, &reference)) {
                        set.push(reference);
                    }
                }
            }
        }

        let mut graph = Self::new();
        let root = tree.root();
        for id in tree.ids().filter(|id| *id != root).chain(std::iter::once(root)) {
            graph.add_node(id, tree.path(id));
            graph.own.insert(id, std::mem::take(&mut own[id.index()]));
            for reference in std::mem::take(&mut direct[id.index()]) {
                graph.add_edge(id, reference);
            }
        }
        graph
    }

    /// Add a node to the graph. Adding a known node again has no effect.
    pub fn add_node(&mut self, id: NodeId, path: &str) {
        if !self.edges.contains_key(&id) {
            self.nodes.push(id);
            self.paths.insert(id, path.to_string());
            self.edges.insert(id, Vec::new());
        }
    }

    /// Declare that `from` depends on `reference`. `from` must have been
    /// added with [`add_node`](Self::add_node).
    pub fn add_edge(&mut self, from: NodeId, reference: Reference) {
        let set = self.edges.entry(from).or_default();
        if !set.iter().any(|r| same_dependency(r, &reference)) {
            set.push(reference);
        }
    }

    /// Return the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Return the number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(|deps| deps.len()).sum()
    }

    /// Node paths in validation order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|id| self.path_of(*id))
    }

    /// Each node's path with the references written in its own value or
    /// keys, in validation order.
    pub fn own_references(&self) -> impl Iterator<Item = (&str, &[Reference])> {
        self.nodes
            .iter()
            .map(|id| (self.path_of(*id), self.own_of(*id)))
    }

    /// Qualified paths `path` depends on, known targets only.
    pub fn dependencies_of(&self, path: &str) -> Vec<&str> {
        self.edges_of(path)
            .iter()
            .filter_map(|r| r.target.as_deref())
            .collect()
    }

    /// The full direct dependency set of the first node at `path`.
    pub fn edges_of(&self, path: &str) -> &[Reference] {
        self.find(path).map(|id| self.deps_of(id)).unwrap_or_default()
    }

    /// References written in the first node at `path`'s own value or keys.
    pub fn references_of(&self, path: &str) -> &[Reference] {
        self.find(path).map(|id| self.own_of(id)).unwrap_or_default()
    }

    fn find(&self, path: &str) -> Option<NodeId> {
        self.nodes.iter().copied().find(|id| self.path_of(*id) == path)
    }

    fn path_of(&self, id: NodeId) -> &str {
        self.paths.get(&id).map(String::as_str).unwrap_or_default()
    }

    fn own_of(&self, id: NodeId) -> &[Reference] {
        self.own.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    fn deps_of(&self, id: NodeId) -> &[Reference] {
        self.edges.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Check that every reference can be satisfied.
    ///
    /// # Errors
    ///
    /// - `SelfReference` if a node is in its own direct set.
    /// - `CyclicReference` if following references returns to a node on
    ///   the current chain.
    /// - `UnknownReference` if a placeholder names no node.
    ///
    /// Nodes are tried in document order, so the same document always
    /// reports the same error.
    pub fn validate(&self) -> Result<()> {
        let mut marks: HashMap<NodeId, Mark> = HashMap::new();
        let mut chain: Vec<NodeId> = Vec::new();
        for id in &self.nodes {
            if !marks.contains_key(id) {
                self.visit(*id, &mut marks, &mut chain)?;
            }
        }
        tracing::debug!(
            nodes = self.node_count(),
            edges = self.edge_count(),
            "Reference graph is valid"
        );
        Ok(())
    }

    fn visit(
        &self,
        id: NodeId,
        marks: &mut HashMap<NodeId, Mark>,
        chain: &mut Vec<NodeId>,
    ) -> Result<()> {
        let deps = self.deps_of(id);
        if deps.iter().any(|r| r.node == Some(id)) {
            return Err(Error::SelfReference {
                path: self.path_of(id).to_string(),
            });
        }

        marks.insert(id, Mark::OnChain);
        chain.push(id);

        for reference in deps {
            let Some(target) = reference.node else {
                return Err(Error::UnknownReference {
                    path: reference.raw.clone(),
                    referenced_by: reference.origin.clone(),
                });
            };
            match marks.get(&target) {
                Some(Mark::Done) => {}
                Some(Mark::OnChain) => {
                    let start = chain.iter().position(|n| *n == target).unwrap_or(0);
                    let mut cycle: Vec<String> = chain[start..]
                        .iter()
                        .map(|n| self.path_of(*n).to_string())
                        .collect();
                    cycle.push(self.path_of(target).to_string());
                    return Err(Error::CyclicReference { cycle });
                }
                None => self.visit(target, marks, chain)?,
            }
        }

        chain.pop();
        marks.insert(id, Mark::Done);
        Ok(())
    }
}

fn same_dependency(a: &Reference, b: &Reference) -> bool {
    match (a.node, b.node) {
        (Some(x), Some(y)) => x == y,
        (None, None) => a.raw == b.raw,
        _ => false,
    }
}
