//! `${path}` placeholders

use regex::Regex;
use std::sync::LazyLock;

use crate::error::Result;

/// Pattern matching one placeholder and capturing the path inside it
pub static PLACEHOLDER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]*)\}").unwrap());

/// Raw paths of every placeholder in `text`, in order of appearance.
/// A path that appears more than once is listed once.
pub fn placeholders(text: &str) -> Vec<&str> {
    let mut found: Vec<&str> = Vec::new();
    for cap in PLACEHOLDER_PATTERN.captures_iter(text) {
        let Some(path) = cap.get(1) else {
            continue;
        };
        if !found.contains(&path.as_str()) {
            found.push(path.as_str());
        }
    }
    found
}

/// The path of the placeholder when `text` is exactly one placeholder and
/// nothing else.
pub fn single_placeholder(text: &str) -> Option<&str> {
    let cap = PLACEHOLDER_PATTERN.captures(text)?;
    let whole = cap.get(0)?;
    if whole.start() == 0 && whole.end() == text.len() {
        cap.get(1).map(|m| m.as_str())
    } else {
        None
    }
}

/// Replace every placeholder in `text` with the text `render` produces for
/// its path.
///
/// `render` returns `Ok(None)` when a referenced value is not final yet; the
/// whole substitution is then abandoned and `Ok(None)` returned, leaving the
/// caller to retry on a later pass.
pub fn substitute<F>(text: &str, mut render: F) -> Result<Option<String>>
where
    F: FnMut(&str) -> Result<Option<String>>,
{
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for cap in PLACEHOLDER_PATTERN.captures_iter(text) {
        let (Some(whole), Some(path)) = (cap.get(0), cap.get(1)) else {
            continue;
        };
        let Some(rendered) = render(path.as_str())? else {
            return Ok(None);
        };
        out.push_str(&text[last..whole.start()]);
        out.push_str(&rendered);
        last = whole.end();
    }
    out.push_str(&text[last..]);

    Ok(Some(out))
}
