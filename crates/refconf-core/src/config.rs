//! The resolved configuration

use std::fmt;
use std::ops::Index;
use std::path::Path;
use std::str::FromStr;

use refconf_expr::{Mode, type_name};
use refconf_tree::get_at_path;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::driver;
use crate::error::{Error, Result};
use crate::source;

static NULL: Value = Value::Null;

/// Options for building a [`Config`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigOptions {
    /// Evaluation mode for expression blocks.
    pub mode: Mode,
}

impl ConfigOptions {
    /// Pure expressions only. This is the default.
    pub fn restricted() -> Self {
        Self {
            mode: Mode::Restricted,
        }
    }

    /// Allow expressions to read files and the environment. Only use this
    /// for documents you trust.
    pub fn unrestricted() -> Self {
        Self {
            mode: Mode::Unrestricted,
        }
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }
}

/// A fully resolved configuration document.
///
/// Construction either resolves every reference and expression or fails;
/// there is no partially resolved state. The value is immutable afterwards.
///
/// # Example
///
/// ```
/// use refconf_core::Config;
/// use serde_json::json;
///
/// let config: Config = r#"{
///     // values may reference each other
///     "a": 10,
///     "b": 2,
///     "c": "{{ ${a} / ${b} }}"
/// }"#
/// .parse()
/// .unwrap();
///
/// assert_eq!(config["c"], json!(5));
/// assert_eq!(config.get("a"), Some(&json!(10)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Always a mapping.
    root: Value,
    mode: Mode,
}

impl Config {
    /// Resolve an already decoded document.
    ///
    /// # Errors
    ///
    /// `InvalidDocument` when the root is not a mapping, otherwise any
    /// resolution error.
    pub fn from_value(document: Value, options: ConfigOptions) -> Result<Self> {
        if !document.is_object() {
            return Err(Error::InvalidDocument {
                found: type_name(&document).to_string(),
            });
        }

        let root = driver::resolve(document, options.mode)?;
        Ok(Self {
            root,
            mode: options.mode,
        })
    }

    /// Parse and resolve document text in restricted mode.
    pub fn parse(source: &str) -> Result<Self> {
        Self::parse_with(source, ConfigOptions::default())
    }

    /// Parse and resolve document text.
    pub fn parse_with(source: &str, options: ConfigOptions) -> Result<Self> {
        let document = source::decode(source)?;
        Self::from_value(document, options)
    }

    /// Read, parse and resolve a document file.
    pub fn from_file(path: impl AsRef<Path>, options: ConfigOptions) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(?path, mode = %options.mode, "Loading configuration");
        let source = std::fs::read_to_string(path).map_err(|e| Error::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse_with(&source, options)
    }

    /// Value at a qualified path, or `None`.
    ///
    /// A top-level key equal to `path` wins over path traversal, so keys
    /// containing dots stay reachable.
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.lookup(path).ok()
    }

    /// Value at a qualified path.
    ///
    /// # Errors
    ///
    /// `PathNotFound` or `InvalidIndex` explaining which path failed.
    pub fn lookup(&self, path: &str) -> Result<&Value> {
        if let Some(value) = self.root.get(path) {
            return Ok(value);
        }
        Ok(get_at_path(&self.root, path)?)
    }

    /// Deserialize the value at `path` into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let value = self.lookup(path)?;
        T::deserialize(value).map_err(Error::Deserialize)
    }

    /// Deserialize the whole configuration into `T`.
    ///
    /// Use `#[serde(rename = "...")]` on fields whose key collides with a
    /// Rust keyword or a method name.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        T::deserialize(&self.root).map_err(Error::Deserialize)
    }

    /// Top-level keys in document order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|(key, _)| key)
    }

    /// Top-level entries in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.root
            .as_object()
            .into_iter()
            .flat_map(|map| map.iter().map(|(key, value)| (key.as_str(), value)))
    }

    pub fn len(&self) -> usize {
        self.root.as_object().map_or(0, |map| map.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The resolved document.
    pub fn as_value(&self) -> &Value {
        &self.root
    }

    pub fn into_value(self) -> Value {
        self.root
    }
}

impl FromStr for Config {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Index<&str> for Config {
    type Output = Value;

    /// Missing paths index to `null`, like indexing a [`Value`].
    fn index(&self, path: &str) -> &Value {
        self.get(path).unwrap_or(&NULL)
    }
}

impl Serialize for Config {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.root.serialize(serializer)
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string_pretty(&self.root).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl From<Config> for Value {
    fn from(config: Config) -> Self {
        config.into_value()
    }
}
