//! Addressable node tree for refconf documents
//!
//! Wraps a decoded [`serde_json::Value`] document into an arena of nodes.
//! Every node knows its qualified path, its parent and the tree root, so any
//! node can be located by name and can locate any other node.
//!
//! ```
//! use refconf_tree::Tree;
//! use serde_json::json;
//!
//! let tree = Tree::build(json!({"person": {"name": "John"}, "e": ["a", "b"]}));
//! let id = tree.lookup("person.name").unwrap();
//! assert_eq!(tree.path(id), "person.name");
//! assert_eq!(tree.materialize(tree.lookup("e.1").unwrap()), json!("b"));
//! ```

pub mod error;
pub mod node;
pub mod path;
pub mod tree;

pub use error::{Error, Result};
pub use node::{Entry, Node, NodeId, NodeKind, NodeState};
pub use path::{PathSegment, get_at_path, parse_path};
pub use tree::Tree;
