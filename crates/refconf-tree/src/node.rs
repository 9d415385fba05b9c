//! Node types stored in the tree arena

use serde_json::Value;

/// Stable handle of a node inside a [`Tree`](crate::Tree).
///
/// Ids are assigned in document order (pre-order), so a parent always has a
/// smaller id than any of its descendants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Resolution state of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeState {
    /// Still contains placeholders or expression blocks, or (for
    /// containers) has an unresolved descendant or key.
    #[default]
    Unresolved,
    /// Final value; no further pass changes it.
    Resolved,
}

/// One entry of a mapping node.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// Key as written in the document. Paths are always built from it.
    pub key: String,
    /// Key after placeholder substitution. `None` while the key still
    /// waits on references.
    pub resolved_key: Option<String>,
    /// The entry's value node.
    pub node: NodeId,
}

/// The value cell of a node
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A leaf holding a value. After a whole-value container substitution
    /// the value may itself be an array or object.
    Scalar(Value),
    /// A mapping container, in declaration order.
    Mapping(Vec<Entry>),
    /// A sequence container.
    Sequence(Vec<NodeId>),
}

impl NodeKind {
    /// Whether the node owns child nodes.
    pub fn is_container(&self) -> bool {
        !matches!(self, NodeKind::Scalar(_))
    }
}

/// A single addressable location in the document.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) segment: Option<String>,
    pub(crate) path: String,
    pub(crate) parent: Option<NodeId>,
    /// Current value cell.
    pub kind: NodeKind,
    /// Current resolution state.
    pub state: NodeState,
}

impl Node {
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The key or stringified index of this node inside its parent.
    /// `None` for the root.
    pub fn segment(&self) -> Option<&str> {
        self.segment.as_deref()
    }

    /// Qualified path from the root. Empty for the root.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn is_resolved(&self) -> bool {
        self.state == NodeState::Resolved
    }

    /// The scalar value, if this is a leaf.
    pub fn scalar(&self) -> Option<&Value> {
        match &self.kind {
            NodeKind::Scalar(value) => Some(value),
            _ => None,
        }
    }

    /// Direct children in declaration order.
    pub fn children(&self) -> Vec<NodeId> {
        match &self.kind {
            NodeKind::Scalar(_) => Vec::new(),
            NodeKind::Mapping(entries) => entries.iter().map(|e| e.node).collect(),
            NodeKind::Sequence(items) => items.clone(),
        }
    }
}
