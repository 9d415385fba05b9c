//! Sandboxed expression language for refconf documents
//!
//! Values may embed expression blocks written as `{{ expr }}` or
//! `exp(expr)`. This crate finds those blocks, parses their contents with a
//! small grammar and evaluates them against a capability table chosen by
//! [`Mode`]:
//!
//! - **Restricted** (default): literals, arithmetic, comparisons, container
//!   construction and a closed set of pure functions.
//! - **Unrestricted**: additionally binds ambient capabilities such as
//!   `read_file` and `env`.
//!
//! # Example
//!
//! ```
//! use refconf_expr::{Evaluator, Mode};
//! use serde_json::json;
//!
//! let evaluator = Evaluator::new(Mode::Restricted);
//! assert_eq!(evaluator.evaluate("10 / 2").unwrap(), json!(5));
//! assert_eq!(
//!     evaluator.evaluate_template("{{ {{ 10 * 5 }} + 20 }}").unwrap(),
//!     Some(json!(70))
//! );
//! ```

pub mod ast;
pub mod block;
mod builtins;
pub mod capability;
pub mod error;
pub mod eval;
pub mod parser;
pub mod value;

pub use ast::{BinaryOp, Expr, UnaryOp};
pub use block::{Block, BlockKind, contains_block, find_innermost, is_literal_escape};
pub use capability::{AMBIENT_CAPABILITIES, Builtin, Capabilities, Mode};
pub use error::{ExprError, Result};
pub use eval::Evaluator;
pub use parser::parse_expression;
pub use value::{render_inline, render_text, truthy, type_name};
