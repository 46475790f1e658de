//! Error types for nupd-cli

use nupd_core::ErrorKind;

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from nupd-core
    #[error(transparent)]
    Core(#[from] nupd_core::Error),

    /// Error from nupd-fs
    #[error(transparent)]
    Fs(#[from] nupd_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON output error
    #[error("Failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Core(e) => e.kind().exit_code(),
            Self::Fs(nupd_fs::Error::TempNameCollision { .. }) => ErrorKind::TempCollision.exit_code(),
            Self::Fs(_) | Self::Io(_) => ErrorKind::Filesystem.exit_code(),
            Self::Json(_) | Self::User { .. } => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn core_errors_use_their_kind() {
        let err = CliError::from(nupd_core::Error::Fetch {
            target: "http://x/".into(),
            message: "HTTP 404".into(),
        });
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn fs_errors_map_to_filesystem_or_collision() {
        let collision = CliError::from(nupd_fs::Error::TempNameCollision {
            path: PathBuf::from("/r/.nupd-tmp-x"),
        });
        assert_eq!(collision.exit_code(), 5);

        let io = CliError::from(nupd_fs::Error::io("/r", std::io::Error::other("boom")));
        assert_eq!(io.exit_code(), 2);
    }

    #[test]
    fn user_errors_exit_one() {
        assert_eq!(CliError::user("nope").exit_code(), 1);
        assert_eq!(CliError::user("nope").to_string(), "nope");
    }
}
