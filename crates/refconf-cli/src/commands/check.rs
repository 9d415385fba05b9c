//! `refconf check`

use std::path::Path;

use colored::Colorize;
use refconf_core::Mode;

use crate::error::Result;

/// Resolve the document and report success.
///
/// Resolution errors propagate so the process exits non-zero.
pub fn run_check(path: &Path, mode: Mode) -> Result<()> {
    let config = super::load(path, mode)?;
    println!(
        "{} {} resolves ({} top-level keys, {} mode)",
        "OK".green().bold(),
        path.display(),
        config.len(),
        config.mode()
    );
    Ok(())
}
