//! [`TreeFixture`] for working-root and source-tree test scenarios.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary directory tree with helpers for setup and assertion.
///
/// # Example
///
/// ```rust,no_run
/// use nupd_test_utils::TreeFixture;
///
/// let tree = TreeFixture::with_files(&[("a.txt", "a"), ("sub/b.txt", "b")]);
/// tree.assert_contents("sub/b.txt", "b");
/// ```
pub struct TreeFixture {
    temp_dir: TempDir,
}

impl Default for TreeFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeFixture {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Create a temporary directory holding `files`.
    pub fn with_files(files: &[(&str, &str)]) -> Self {
        let tree = Self::new();
        tree.write_tree(files);
        tree
    }

    /// Return the root path of the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of `relative` under the root.
    pub fn join(&self, relative: &str) -> PathBuf {
        self.path().join(relative)
    }

    /// Write each `(relative path, content)` pair, creating parents.
    pub fn write_tree(&self, files: &[(&str, &str)]) {
        for (relative, content) in files {
            self.write(relative, content);
        }
    }

    pub fn write(&self, relative: &str, content: &str) {
        let full_path = self.join(relative);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full_path, content)
            .unwrap_or_else(|e| panic!("Could not write {}: {}", full_path.display(), e));
    }

    /// Read the file at `relative` as text.
    ///
    /// # Panics
    /// Panics if the file cannot be read.
    pub fn read(&self, relative: &str) -> String {
        let full_path = self.join(relative);
        fs::read_to_string(&full_path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full_path.display()))
    }

    /// Every regular file under the root, keyed by `/`-separated relative path.
    pub fn files(&self) -> BTreeMap<String, String> {
        let mut files = BTreeMap::new();
        collect(self.path(), self.path(), &mut files);
        files
    }

    /// Relative paths of files whose name starts with `prefix`.
    pub fn files_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.files()
            .into_keys()
            .filter(|path| {
                path.rsplit('/')
                    .next()
                    .is_some_and(|name| name.starts_with(prefix))
            })
            .collect()
    }

    /// Assert that the file at `relative` holds exactly `expected`.
    ///
    /// # Panics
    /// Panics with a descriptive message on mismatch.
    pub fn assert_contents(&self, relative: &str, expected: &str) {
        let actual = self.read(relative);
        assert_eq!(
            actual, expected,
            "File {} has unexpected content",
            relative
        );
    }

    /// Assert that nothing exists at `relative`.
    pub fn assert_absent(&self, relative: &str) {
        let full_path = self.join(relative);
        assert!(
            fs::symlink_metadata(&full_path).is_err(),
            "Expected nothing at: {}",
            full_path.display()
        );
    }
}

fn collect(root: &Path, dir: &Path, out: &mut BTreeMap<String, String>) {
    for entry in fs::read_dir(dir).unwrap() {
        let entry = entry.unwrap();
        let path = entry.path();
        let file_type = entry.file_type().unwrap();
        if file_type.is_dir() {
            collect(root, &path, out);
        } else if file_type.is_file() {
            let relative = path
                .strip_prefix(root)
                .unwrap()
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            let content = String::from_utf8_lossy(&fs::read(&path).unwrap()).into_owned();
            out.insert(relative, content);
        }
    }
}
