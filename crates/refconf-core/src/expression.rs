//! Expression stage of node resolution

use refconf_expr::{Evaluator, ExprError};
use serde_json::Value;

use crate::error::{Error, Result};

/// Evaluate the blocks in a reference-free string value.
///
/// Returns `None` when the text is to be kept as written.
pub(crate) fn evaluate(evaluator: &Evaluator, path: &str, text: &str) -> Result<Option<Value>> {
    evaluator
        .evaluate_template(text)
        .map_err(|e| attribute(e, path, text))
}

/// Attach the node path to an evaluator error.
fn attribute(error: ExprError, path: &str, text: &str) -> Error {
    match error {
        ExprError::Syntax { text, message } => Error::ExpressionSyntax {
            path: path.to_string(),
            text,
            message,
        },
        ExprError::Forbidden { capability } => Error::ForbiddenCapability {
            path: path.to_string(),
            capability,
        },
        other => Error::Expression {
            path: path.to_string(),
            text: text.to_string(),
            message: other.to_string(),
        },
    }
}
