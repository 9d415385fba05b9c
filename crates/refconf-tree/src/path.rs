//! Path parsing and traversal utilities
//!
//! Qualified paths are dot-separated. A segment addresses a mapping key, or,
//! when the container being traversed is a sequence, a non-negative index.
//!
//! # Path Syntax
//!
//! - Dot-separated keys: `database.host`
//! - Numeric segments into sequences: `servers.0.host`
//! - Bracketed indices, equivalent to the above: `servers[0].host`
//!
//! # Examples
//!
//! ```
//! use refconf_tree::path::{parse_path, PathSegment, get_at_path};
//! use serde_json::json;
//!
//! let path = parse_path("servers[0].host");
//! assert_eq!(path, vec![
//!     PathSegment::Name("servers".to_string()),
//!     PathSegment::Index(0),
//!     PathSegment::Name("host".to_string()),
//! ]);
//!
//! let value = json!({"servers": [{"host": "localhost"}]});
//! assert_eq!(get_at_path(&value, "servers.0.host").unwrap(), &json!("localhost"));
//! ```

use std::fmt;

use serde_json::Value;

use crate::error::{Error, Result};

/// A segment of a path - a name or an explicit sequence index
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// A dotted segment. Used as a key in mappings and as an index in
    /// sequences, where it must be all digits.
    Name(String),
    /// A bracketed index (e.g., 0 in `items[0]`)
    Index(usize),
}

impl PathSegment {
    /// Interpret the segment as a sequence index.
    ///
    /// `path` is only used for the error message.
    pub fn as_index(&self, path: &str) -> Result<usize> {
        match self {
            PathSegment::Index(index) => Ok(*index),
            PathSegment::Name(name) => {
                if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(Error::InvalidIndex {
                        path: path.to_string(),
                        segment: name.clone(),
                    });
                }
                name.parse::<usize>().map_err(|_| Error::InvalidIndex {
                    path: path.to_string(),
                    segment: name.clone(),
                })
            }
        }
    }

    /// Interpret the segment as a mapping key.
    pub fn as_key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Name(name) => write!(f, "{}", name),
            PathSegment::Index(index) => write!(f, "{}", index),
        }
    }
}

/// Parse a path string into segments.
///
/// Empty segments (`a..b`, a leading dot) are skipped.
///
/// # Examples
///
/// ```
/// use refconf_tree::path::{parse_path, PathSegment};
///
/// let path = parse_path("person.address.town");
/// assert_eq!(path, vec![
///     PathSegment::Name("person".to_string()),
///     PathSegment::Name("address".to_string()),
///     PathSegment::Name("town".to_string()),
/// ]);
///
/// let path = parse_path("e[2]");
/// assert_eq!(path, vec![
///     PathSegment::Name("e".to_string()),
///     PathSegment::Index(2),
/// ]);
/// ```
pub fn parse_path(path: &str) -> Vec<PathSegment> {
    let mut segments = Vec::new();
    let mut current_key = String::new();
    let mut chars = path.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '.' => {
                if !current_key.is_empty() {
                    segments.push(PathSegment::Name(std::mem::take(&mut current_key)));
                }
            }
            '[' => {
                if !current_key.is_empty() {
                    segments.push(PathSegment::Name(std::mem::take(&mut current_key)));
                }
                let mut index_str = String::new();
                for ch in chars.by_ref() {
                    if ch == ']' {
                        break;
                    }
                    index_str.push(ch);
                }
                // Non-numeric brackets stay names so traversal can report them
                match index_str.parse::<usize>() {
                    Ok(index) if index_str.bytes().all(|b| b.is_ascii_digit()) => {
                        segments.push(PathSegment::Index(index))
                    }
                    _ => segments.push(PathSegment::Name(index_str)),
                }
            }
            _ => current_key.push(ch),
        }
    }

    if !current_key.is_empty() {
        segments.push(PathSegment::Name(current_key));
    }

    segments
}

/// Append a segment to a qualified path.
///
/// The root has an empty path, so its children's paths are just their
/// segment.
pub fn join_path(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", parent, segment)
    }
}

/// Get the value at the given path inside a JSON value.
///
/// # Errors
///
/// `PathNotFound` when a key or index does not exist, `InvalidIndex` when a
/// non-numeric segment is used to traverse a sequence.
///
/// # Examples
///
/// ```
/// use refconf_tree::path::get_at_path;
/// use refconf_tree::Error;
/// use serde_json::json;
///
/// let value = json!({"e": ["a", "b", 2]});
/// assert_eq!(get_at_path(&value, "e.2").unwrap(), &json!(2));
/// assert!(matches!(get_at_path(&value, "e.x"), Err(Error::InvalidIndex { .. })));
/// ```
pub fn get_at_path<'a>(value: &'a Value, path: &str) -> Result<&'a Value> {
    let segments = parse_path(path);
    if segments.is_empty() {
        return Err(Error::PathNotFound {
            path: path.to_string(),
        });
    }

    let mut current = value;
    for segment in &segments {
        let next = match current {
            Value::Object(map) => map.get(&segment.as_key()),
            Value::Array(items) => items.get(segment.as_index(path)?),
            _ => None,
        };
        current = next.ok_or_else(|| Error::PathNotFound {
            path: path.to_string(),
        })?;
    }

    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_path_simple() {
        let path = parse_path("name");
        assert_eq!(path, vec![PathSegment::Name("name".to_string())]);
    }

    #[test]
    fn test_parse_path_numeric_segment_stays_a_name() {
        let path = parse_path("e.0");
        assert_eq!(
            path,
            vec![
                PathSegment::Name("e".to_string()),
                PathSegment::Name("0".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_path_mixed() {
        let path = parse_path("items[0].name");
        assert_eq!(
            path,
            vec![
                PathSegment::Name("items".to_string()),
                PathSegment::Index(0),
                PathSegment::Name("name".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_path_skips_empty_segments() {
        assert_eq!(parse_path("a..b"), parse_path("a.b"));
        assert!(parse_path("").is_empty());
    }

    #[test]
    fn test_as_index_rejects_signs() {
        let segment = PathSegment::Name("+1".to_string());
        assert!(segment.as_index("e.+1").is_err());
        assert_eq!(PathSegment::Name("12".to_string()).as_index("e.12"), Ok(12));
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("", "a"), "a");
        assert_eq!(join_path("a", "0"), "a.0");
    }

    #[test]
    fn test_get_at_path_nested() {
        let value = json!({"person": {"address": {"town": "Dublin"}}});
        assert_eq!(
            get_at_path(&value, "person.address.town").unwrap(),
            &json!("Dublin")
        );
    }

    #[test]
    fn test_get_at_path_missing() {
        let value = json!({"name": "test"});
        assert_eq!(
            get_at_path(&value, "missing"),
            Err(Error::PathNotFound {
                path: "missing".to_string()
            })
        );
    }

    #[test]
    fn test_get_at_path_through_scalar() {
        let value = json!({"name": "test"});
        assert!(get_at_path(&value, "name.first").is_err());
    }
}
