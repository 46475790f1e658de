//! Error types for nupd-core

use std::path::PathBuf;

use nupd_fs::{Digest, RelativePath};

/// Result type for nupd-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reconciling a working root
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Walking a directory tree failed
    #[error("Failed to scan {root}: {message}")]
    Scan { root: PathBuf, message: String },

    /// A line of a manifest listing could not be parsed
    #[error("Malformed manifest line {line}: {message}")]
    ManifestParse { line: usize, message: String },

    /// A manifest listing names the same path twice
    #[error("Duplicate manifest entry: {path}")]
    DuplicateEntry { path: RelativePath },

    /// The content source could not deliver a listing or file
    #[error("Fetch of {target} failed: {message}")]
    Fetch { target: String, message: String },

    /// Fetched bytes do not hash to the digest the goal listing promised
    #[error("Fetched {path} has digest {actual}, expected {expected}")]
    FetchDigestMismatch {
        path: RelativePath,
        expected: Digest,
        actual: Digest,
    },

    /// No indexed file holds the requested content
    #[error("No local source holds content {digest}")]
    ContentNotIndexed { digest: Digest },

    /// A goal path does not hold the goal content after applying
    #[error("Integrity check failed for {path}: expected {expected}, found {actual}")]
    IntegrityMismatch {
        path: RelativePath,
        expected: Digest,
        actual: String,
    },

    /// Filesystem error from nupd-fs
    #[error(transparent)]
    Fs(#[from] nupd_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failure classes a caller can react to differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing root, permission denied, disk full
    Filesystem,
    /// Transport failure or missing remote content
    Fetch,
    /// A malformed goal listing
    Manifest,
    /// Applied content does not match the goal
    Integrity,
    /// A freshly generated temporary name was already taken
    TempCollision,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Scan { .. } | Self::ContentNotIndexed { .. } | Self::Io(_) => {
                ErrorKind::Filesystem
            }
            Self::ManifestParse { .. } | Self::DuplicateEntry { .. } => ErrorKind::Manifest,
            Self::Fetch { .. } | Self::FetchDigestMismatch { .. } => ErrorKind::Fetch,
            Self::IntegrityMismatch { .. } => ErrorKind::Integrity,
            Self::Fs(nupd_fs::Error::TempNameCollision { .. }) => ErrorKind::TempCollision,
            Self::Fs(_) => ErrorKind::Filesystem,
        }
    }

    pub(crate) fn fetch(target: impl Into<String>, message: impl ToString) -> Self {
        Self::Fetch {
            target: target.into(),
            message: message.to_string(),
        }
    }
}

impl ErrorKind {
    /// Process exit code the CLI reports for this class.
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Filesystem => 2,
            Self::Fetch => 3,
            Self::Integrity => 4,
            Self::TempCollision => 5,
            Self::Manifest => 6,
        }
    }
}
