//! `refconf get`

use std::path::Path;

use refconf_core::Mode;
use serde_json::Value;

use crate::error::Result;

/// Resolve the document and print the value at `value_path`.
pub fn run_get(path: &Path, value_path: &str, mode: Mode, raw: bool) -> Result<()> {
    let config = super::load(path, mode)?;
    let value = config.lookup(value_path)?;
    println!("{}", format_value(value, raw)?);
    Ok(())
}

/// Strings print bare with `raw`; everything else prints as pretty JSON.
pub fn format_value(value: &Value, raw: bool) -> Result<String> {
    match value {
        Value::String(text) if raw => Ok(text.clone()),
        other => Ok(serde_json::to_string_pretty(other)?),
    }
}
