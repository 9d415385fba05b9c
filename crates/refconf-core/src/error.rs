//! Error types for refconf-core

use std::path::PathBuf;

/// Result type for refconf-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building a [`Config`](crate::Config).
///
/// Every error is fatal: construction either yields a fully-resolved
/// configuration or one of these.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A node references its own path, directly or through a container
    /// that holds it.
    #[error("Self reference: {path} references itself")]
    SelfReference { path: String },

    /// A chain of references returns to a node already on the chain.
    /// The first and last entries are the same path.
    #[error("Cyclic reference: {}", cycle.join(" -> "))]
    CyclicReference { cycle: Vec<String> },

    /// A placeholder names a path that does not exist.
    #[error("Unknown reference: ${{{path}}} in {referenced_by}")]
    UnknownReference { path: String, referenced_by: String },

    #[error("Invalid expression at {path}: `{text}`: {message}")]
    ExpressionSyntax {
        path: String,
        text: String,
        message: String,
    },

    #[error("Forbidden capability at {path}: `{capability}` requires unrestricted mode")]
    ForbiddenCapability { path: String, capability: String },

    /// Evaluation failed for a reason other than syntax or capability.
    #[error("Expression failed at {path}: `{text}`: {message}")]
    Expression {
        path: String,
        text: String,
        message: String,
    },

    /// The document root must be a mapping.
    #[error("Invalid document: expected a mapping at the root, found {found}")]
    InvalidDocument { found: String },

    /// Two keys of one mapping resolve to the same text.
    #[error("Duplicate key '{key}' in {path} after substitution")]
    DuplicateKey { path: String, key: String },

    /// Resolution stopped making progress with nodes still unresolved.
    #[error("Resolution stalled with {} unresolved node(s): {}", unresolved.len(), unresolved.join(", "))]
    Stalled { unresolved: Vec<String> },

    #[error("Failed to decode document: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Failed to deserialize configuration: {0}")]
    Deserialize(#[source] serde_json::Error),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Transparent wrappers for underlying crate errors
    /// Path addressing error from refconf-tree
    #[error(transparent)]
    Tree(#[from] refconf_tree::Error),
}

impl Error {
    /// Path of the node the error was raised for, when there is one.
    pub fn path(&self) -> Option<&str> {
        match self {
            Error::SelfReference { path }
            | Error::ExpressionSyntax { path, .. }
            | Error::ForbiddenCapability { path, .. }
            | Error::Expression { path, .. }
            | Error::DuplicateKey { path, .. } => Some(path),
            Error::UnknownReference { referenced_by, .. } => Some(referenced_by),
            Error::CyclicReference { cycle } => cycle.first().map(String::as_str),
            _ => None,
        }
    }

    /// Whether the error comes from static reference validation.
    pub fn is_reference_error(&self) -> bool {
        matches!(
            self,
            Error::SelfReference { .. }
                | Error::CyclicReference { .. }
                | Error::UnknownReference { .. }
        )
    }
}
