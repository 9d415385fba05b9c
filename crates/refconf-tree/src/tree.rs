//! The node arena

use serde_json::Value;

use crate::error::{Error, Result};
use crate::node::{Entry, Node, NodeId, NodeKind, NodeState};
use crate::path::{join_path, parse_path};

/// Owns every node of one document.
///
/// Nodes refer to their parent and to the root by [`NodeId`] only, so the
/// tree owns all nodes and no node owns the tree. Ids are handed out in
/// document order and stay valid for the lifetime of the tree; no node is
/// created or destroyed after [`Tree::build`] returns.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Build the tree for a decoded document.
    ///
    /// Every node starts out [`NodeState::Unresolved`].
    pub fn build(document: Value) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.insert(None, None, document);
        tree
    }

    fn insert(&mut self, parent: Option<NodeId>, segment: Option<String>, value: Value) -> NodeId {
        let id = NodeId(self.nodes.len());
        // Parents are inserted first, so their path is already final
        let path = match (parent, segment.as_deref()) {
            (Some(parent), Some(segment)) => join_path(&self.nodes[parent.0].path, segment),
            _ => String::new(),
        };
        self.nodes.push(Node {
            id,
            segment,
            path,
            parent,
            kind: NodeKind::Scalar(Value::Null),
            state: NodeState::Unresolved,
        });

        let kind = match value {
            Value::Object(map) => {
                let mut entries = Vec::with_capacity(map.len());
                for (key, child) in map {
                    let node = self.insert(Some(id), Some(key.clone()), child);
                    entries.push(Entry {
                        key,
                        resolved_key: None,
                        node,
                    });
                }
                NodeKind::Mapping(entries)
            }
            Value::Array(items) => {
                let mut children = Vec::with_capacity(items.len());
                for (index, child) in items.into_iter().enumerate() {
                    children.push(self.insert(Some(id), Some(index.to_string()), child));
                }
                NodeKind::Sequence(children)
            }
            scalar => NodeKind::Scalar(scalar),
        };
        self.nodes[id.0].kind = kind;
        id
    }

    /// The root handle.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A tree always holds at least its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// All node ids in document order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().map(|node| node.id)
    }

    /// All nodes in document order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn path(&self, id: NodeId) -> &str {
        &self.nodes[id.0].path
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Parents of `id`, nearest first, ending with the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.nodes[id.0].parent, move |current| {
            self.nodes[current.0].parent
        })
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes[id.0].children()
    }

    /// Every node below `id`, in document order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut pending = self.children(id);
        pending.reverse();
        while let Some(next) = pending.pop() {
            found.push(next);
            let mut children = self.children(next);
            children.reverse();
            pending.extend(children);
        }
        found
    }

    /// Locate a node by qualified path.
    ///
    /// # Errors
    ///
    /// `PathNotFound` if any segment is missing (or the path is empty),
    /// `InvalidIndex` if a non-numeric segment traverses a sequence.
    pub fn lookup(&self, path: &str) -> Result<NodeId> {
        let segments = parse_path(path);
        if segments.is_empty() {
            return Err(Error::PathNotFound {
                path: path.to_string(),
            });
        }

        let mut current = self.root();
        for segment in &segments {
            let next = match &self.nodes[current.0].kind {
                NodeKind::Mapping(entries) => {
                    let key = segment.as_key();
                    entries.iter().find(|e| e.key == key).map(|e| e.node)
                }
                NodeKind::Sequence(items) => items.get(segment.as_index(path)?).copied(),
                NodeKind::Scalar(_) => None,
            };
            current = next.ok_or_else(|| Error::PathNotFound {
                path: path.to_string(),
            })?;
        }

        Ok(current)
    }

    /// Replace the value cell of a node with a leaf value.
    pub fn set_value(&mut self, id: NodeId, value: Value) {
        self.nodes[id.0].kind = NodeKind::Scalar(value);
    }

    pub fn set_state(&mut self, id: NodeId, state: NodeState) {
        self.nodes[id.0].state = state;
    }

    /// Number of nodes currently [`NodeState::Resolved`].
    pub fn resolved_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_resolved()).count()
    }

    /// Ids of nodes that are not resolved yet, in document order.
    pub fn unresolved(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|node| !node.is_resolved())
            .map(|node| node.id)
            .collect()
    }

    /// Build the current value of the subtree rooted at `id`.
    ///
    /// Mapping entries use their substituted key when one has been set.
    pub fn materialize(&self, id: NodeId) -> Value {
        match &self.nodes[id.0].kind {
            NodeKind::Scalar(value) => value.clone(),
            NodeKind::Mapping(entries) => Value::Object(
                entries
                    .iter()
                    .map(|entry| {
                        let key = entry.resolved_key.as_ref().unwrap_or(&entry.key);
                        (key.clone(), self.materialize(entry.node))
                    })
                    .collect(),
            ),
            NodeKind::Sequence(items) => {
                Value::Array(items.iter().map(|item| self.materialize(*item)).collect())
            }
        }
    }

    /// Consume the tree and return the document it currently describes.
    pub fn into_value(self) -> Value {
        self.materialize(self.root())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_assigns_document_order_ids() {
        let tree = Tree::build(json!({"a": 1, "b": {"c": 2}, "d": [3]}));
        let paths: Vec<&str> = tree.nodes().map(Node::path).collect();
        assert_eq!(paths, vec!["", "a", "b", "b.c", "d", "d.0"]);
    }

    #[test]
    fn test_parent_links() {
        let tree = Tree::build(json!({"b": {"c": 2}}));
        let c = tree.lookup("b.c").unwrap();
        let b = tree.lookup("b").unwrap();
        assert_eq!(tree.parent(c), Some(b));
        assert_eq!(tree.parent(b), Some(tree.root()));
        assert_eq!(tree.parent(tree.root()), None);
        assert_eq!(tree.ancestors(c).collect::<Vec<_>>(), vec![b, tree.root()]);
    }

    #[test]
    fn test_descendants_in_document_order() {
        let tree = Tree::build(json!({"b": {"c": [1, 2], "d": 3}}));
        let b = tree.lookup("b").unwrap();
        let paths: Vec<&str> = tree
            .descendants(b)
            .into_iter()
            .map(|id| tree.path(id))
            .collect();
        assert_eq!(paths, vec!["b.c", "b.c.0", "b.c.1", "b.d"]);
    }

    #[test]
    fn test_materialize_uses_resolved_keys() {
        let mut tree = Tree::build(json!({"m": {"${k}": 1}}));
        let m = tree.lookup("m").unwrap();
        if let NodeKind::Mapping(entries) = &mut tree.node_mut(m).kind {
            entries[0].resolved_key = Some("name".to_string());
        }
        assert_eq!(tree.into_value(), json!({"m": {"name": 1}}));
    }
}
