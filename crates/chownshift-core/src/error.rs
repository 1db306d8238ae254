//! Error types for shift operations.

use std::path::PathBuf;

use thiserror::Error;

use crate::record::Ownership;

/// Errors that abort a shift run.
///
/// Every variant is fatal: the transaction stops at the first error and
/// performs no further work.
#[derive(Debug, Error)]
pub enum ShiftError {
    /// The configuration handed to the core was malformed.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Metadata for an entry could not be read.
    #[error("stat {path}: {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory traversal failed.
    #[error("walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The shifted UID or GID would be negative.
    #[error("{path}: trying to assign uid or gid less than zero ({from} -> {target_uid},{target_gid})")]
    NegativeId {
        path: PathBuf,
        from: Ownership,
        target_uid: i128,
        target_gid: i128,
    },

    /// Changing the owner failed.
    #[error("chown {path}: {source}")]
    Chown {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Restoring the mode bits failed.
    #[error("chmod {path}: {source}")]
    Chmod {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading or writing the capability attribute failed.
    #[error("xattr {name} on {path}: {source}")]
    Xattr {
        path: PathBuf,
        name: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl ShiftError {
    /// Create a stat error with path context.
    pub fn stat(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Stat {
            path: path.into(),
            source,
        }
    }

    /// Create a walk error with path context.
    pub fn walk(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Walk {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Process exit code for this error: 2 for argument errors, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::InvalidArgument { .. } => 2,
            _ => 1,
        }
    }
}
