//! Error types for refconf-tree

/// Result type for refconf-tree operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while addressing nodes
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Path not found: {path}")]
    PathNotFound { path: String },

    #[error("Invalid sequence index '{segment}' in path {path}")]
    InvalidIndex { path: String, segment: String },
}
