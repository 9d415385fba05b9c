//! Shared test utilities for the refconf workspace.
//!
//! This crate is a dev-dependency only and is never published.
//!
//! # Modules
//!
//! - [`documents`]: sample documents covering each resolution behaviour
//! - [`dir`]: [`TestDir`] for tests that need configuration files on disk

pub mod dir;
pub mod documents;

pub use dir::TestDir;
