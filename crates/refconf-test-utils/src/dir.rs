//! [`TestDir`] for file-backed configuration tests.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory that holds configuration files for one test.
///
/// # Example
///
/// ```rust
/// use refconf_test_utils::TestDir;
///
/// let dir = TestDir::new();
/// let path = dir.write("app.jsonc", r#"{"a": 1}"#);
/// assert!(path.exists());
/// dir.assert_file_exists("app.jsonc");
/// ```
pub struct TestDir {
    temp_dir: TempDir,
}

impl Default for TestDir {
    fn default() -> Self {
        Self::new()
    }
}

impl TestDir {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of `name` inside the directory.
    pub fn path(&self, name: &str) -> PathBuf {
        self.root().join(name)
    }

    /// Write `content` to `name`, creating parent directories, and return
    /// the file's path.
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    /// Path of `name` with forward slashes, safe to embed in a quoted
    /// expression string on every platform.
    pub fn expr_path(&self, name: &str) -> String {
        self.path(name).to_string_lossy().replace('\\', "/")
    }

    /// Panics if `name` does not exist.
    pub fn assert_file_exists(&self, name: &str) {
        let path = self.path(name);
        assert!(path.exists(), "Expected file to exist: {}", path.display());
    }
}
