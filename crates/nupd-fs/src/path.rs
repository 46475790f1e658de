//! Root-relative path handling
//!
//! Every manifest entry is keyed by a [`RelativePath`]: a forward-slash,
//! normalized path that can never escape the root it is resolved against.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Result};

/// A normalized path relative to some root directory.
///
/// Internally stored with forward slashes, with `.` and empty components
/// removed. Absolute paths and `..` components are rejected, so joining a
/// `RelativePath` onto a root always yields a location under that root.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RelativePath {
    inner: String,
}

impl RelativePath {
    /// Parse and normalize a relative path.
    ///
    /// Backslashes are treated as separators.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPath`] if the path is empty after
    /// normalization, absolute, or contains a `..` component.
    pub fn new(path: impl AsRef<str>) -> Result<Self> {
        let raw = path.as_ref();
        let unified = raw.replace('\\', "/");

        if unified.starts_with('/') {
            return Err(Error::invalid_path(raw, "path is absolute"));
        }

        let mut segments = Vec::new();
        for segment in unified.split('/') {
            match segment {
                "" | "." => continue,
                ".." => return Err(Error::invalid_path(raw, "path escapes its root")),
                other => segments.push(other),
            }
        }

        if segments.is_empty() {
            return Err(Error::invalid_path(raw, "path is empty"));
        }

        let inner = segments.join("/");
        if has_drive_prefix(&inner) {
            return Err(Error::invalid_path(raw, "path is absolute"));
        }
        Ok(Self { inner })
    }

    /// Build a relative path from an absolute `path` located under `root`.
    pub fn from_root(root: &Path, path: &Path) -> Result<Self> {
        let stripped = path.strip_prefix(root).map_err(|_| {
            Error::invalid_path(
                path.to_string_lossy(),
                format!("not located under {}", root.display()),
            )
        })?;

        let mut segments = Vec::new();
        for component in stripped.components() {
            match component {
                Component::Normal(part) => match part.to_str() {
                    Some(part) => segments.push(part),
                    None => {
                        return Err(Error::invalid_path(
                            stripped.to_string_lossy(),
                            "name is not valid UTF-8",
                        ));
                    }
                },
                Component::CurDir => {}
                _ => {
                    return Err(Error::invalid_path(
                        stripped.to_string_lossy(),
                        "unexpected path component",
                    ));
                }
            }
        }
        Self::new(segments.join("/"))
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Resolve this path against `root` as a platform-native path.
    pub fn to_native(&self, root: &Path) -> PathBuf {
        self.inner
            .split('/')
            .fold(root.to_path_buf(), |acc, segment| acc.join(segment))
    }

    /// Get the file name component.
    pub fn file_name(&self) -> &str {
        self.inner.rsplit('/').next().unwrap_or(&self.inner)
    }

    /// Get the parent path, or `None` for a top-level entry.
    pub fn parent(&self) -> Option<Self> {
        self.inner.rfind('/').map(|idx| Self {
            inner: self.inner[..idx].to_string(),
        })
    }

    /// Iterate over all proper ancestors, nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = RelativePath> + '_ {
        std::iter::successors(self.parent(), |p| p.parent())
    }

    /// Check whether the manifest text encoding can carry this path.
    ///
    /// The listing format separates path and digest at the first space.
    pub fn is_listfile_safe(&self) -> bool {
        !self.inner.contains(' ')
    }
}

/// `C:/...` anywhere, bare `C:name` only where Windows reads it as a drive.
fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    let drive = bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':';
    drive && (cfg!(windows) || bytes.get(2) == Some(&b'/'))
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl AsRef<str> for RelativePath {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl TryFrom<&str> for RelativePath {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for RelativePath {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::new(s)
    }
}

impl Serialize for RelativePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.inner)
    }
}

impl<'de> Deserialize<'de> for RelativePath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}
