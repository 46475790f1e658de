//! Error types for nupd-fs

use std::path::PathBuf;

/// Result type for nupd-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in nupd-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid relative path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Invalid digest {value:?}: {reason}")]
    InvalidDigest { value: String, reason: String },

    #[error("Temporary name already taken: {path}")]
    TempNameCollision { path: PathBuf },

    #[error("Failed to parse {format} config at {path}: {message}")]
    ConfigParse {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Failed to serialize {format} config for {path}: {message}")]
    ConfigSerialize {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Unsupported config format: {extension}")]
    UnsupportedFormat { extension: String },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
