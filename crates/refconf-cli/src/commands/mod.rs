//! Command implementations for refconf-cli

pub mod check;
pub mod deps;
pub mod get;
pub mod resolve;

pub use check::run_check;
pub use deps::run_deps;
pub use get::run_get;
pub use resolve::run_resolve;

use std::path::Path;

use refconf_core::{Config, ConfigOptions, Mode};

use crate::error::{CliError, Result};

/// Read the document text at `path`.
pub(crate) fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Read and resolve the document at `path`.
pub(crate) fn load(path: &Path, mode: Mode) -> Result<Config> {
    tracing::debug!(path = %path.display(), %mode, "Loading document");
    let source = read_source(path)?;
    Ok(Config::parse_with(&source, ConfigOptions::default().with_mode(mode))?)
}
