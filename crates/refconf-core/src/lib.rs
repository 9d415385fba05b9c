//! Reference and expression resolution for JSON configuration documents
//!
//! A document is JSON with comments. String values may reference other
//! values with `${path}` placeholders and compute values with `{{ expr }}`
//! or `exp(expr)` blocks. Loading a document resolves all of it up front:
//!
//! 1. Comments are stripped and the text is decoded.
//! 2. The reference graph is validated. A reference that can never be
//!    satisfied fails before any value is touched.
//! 3. Substitution passes replace placeholders, in any declaration order,
//!    and evaluate expression blocks in the sandbox chosen by [`Mode`].
//!
//! The result is an immutable [`Config`].
//!
//! # Example
//!
//! ```
//! use refconf_core::{Config, Error};
//!
//! let config = Config::parse(r#"{
//!     "person": { "name": "John" },
//!     "greeting": "Hello ${person.name}",
//!     "shout": "{{ '${person.name}'.upper() }}"
//! }"#).unwrap();
//! assert_eq!(config["greeting"], "Hello John");
//! assert_eq!(config["shout"], "JOHN");
//!
//! let err = Config::parse(r#"{"a": "${b}", "b": "${a}"}"#).unwrap_err();
//! assert!(matches!(err, Error::CyclicReference { .. }));
//! ```

pub mod config;
pub mod driver;
pub mod error;
mod expression;
pub mod graph;
pub mod reference;
pub mod resolver;
pub mod source;

pub use config::{Config, ConfigOptions};
pub use driver::{resolve, resolve_tree};
pub use error::{Error, Result};
pub use graph::{DependencyGraph, Reference};
pub use source::{decode, strip_comments};

pub use refconf_expr::Mode;
