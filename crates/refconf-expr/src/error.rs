//! Error types for refconf-expr

/// Result type for expression operations
pub type Result<T> = std::result::Result<T, ExprError>;

/// Errors raised while parsing or evaluating an expression
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExprError {
    #[error("Syntax error in `{text}`: {message}")]
    Syntax { text: String, message: String },

    #[error("Capability `{capability}` is not available in restricted mode")]
    Forbidden { capability: String },

    #[error("Unknown name `{name}`")]
    UnknownName { name: String },

    #[error("Unknown function `{name}`")]
    UnknownFunction { name: String },

    #[error("Type error: {message}")]
    Type { message: String },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("{message}")]
    Evaluation { message: String },

    #[error("Invalid mode: {mode}")]
    InvalidMode { mode: String },
}

impl ExprError {
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::Type {
            message: message.into(),
        }
    }

    pub fn evaluation(message: impl Into<String>) -> Self {
        Self::Evaluation {
            message: message.into(),
        }
    }

    /// Whether the error comes from the grammar rather than evaluation.
    pub fn is_syntax(&self) -> bool {
        matches!(self, Self::Syntax { .. })
    }
}
