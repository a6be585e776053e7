use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error as ThisError;

/// Which input table an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Watchlist,
    Prices,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Watchlist => f.write_str("watchlist"),
            SourceKind::Prices => f.write_str("price"),
        }
    }
}

#[derive(ThisError, Debug)]
pub enum PmaError {
    #[error("{kind} source not found: {}", path.display())]
    SourceNotFound { kind: SourceKind, path: PathBuf },

    #[error("{kind} source {} is malformed: {detail}", path.display())]
    MalformedSource {
        kind: SourceKind,
        path: PathBuf,
        detail: String,
    },

    #[error("failed to read {kind} source {}: {source}", path.display())]
    ReadFailure {
        kind: SourceKind,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl PmaError {
    /// Classifies an I/O error raised while touching `path`.
    pub fn from_io(kind: SourceKind, path: &Path, err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            PmaError::SourceNotFound {
                kind,
                path: path.to_path_buf(),
            }
        } else {
            PmaError::ReadFailure {
                kind,
                path: path.to_path_buf(),
                source: err,
            }
        }
    }

    /// Unwraps csv's I/O errors so a missing file still reads as `SourceNotFound`.
    /// Anything else csv reports (bad UTF-8 and the like) is a content problem.
    pub fn from_csv(kind: SourceKind, path: &Path, err: csv::Error) -> Self {
        if err.is_io_error() {
            if let csv::ErrorKind::Io(io_err) = err.into_kind() {
                return Self::from_io(kind, path, io_err);
            }
            return PmaError::MalformedSource {
                kind,
                path: path.to_path_buf(),
                detail: "unreadable CSV content".to_string(),
            };
        }

        let detail = match err.position() {
            Some(pos) => format!("line {}: {}", pos.line(), err),
            None => err.to_string(),
        };
        PmaError::MalformedSource {
            kind,
            path: path.to_path_buf(),
            detail,
        }
    }

    pub fn missing_column(kind: SourceKind, path: &Path, column: &str) -> Self {
        PmaError::MalformedSource {
            kind,
            path: path.to_path_buf(),
            detail: format!("missing required column `{}`", column),
        }
    }

    /// The file this error is about, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            PmaError::SourceNotFound { path, .. }
            | PmaError::MalformedSource { path, .. }
            | PmaError::ReadFailure { path, .. } => Some(path),
            PmaError::InvalidParameter { .. } => None,
        }
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(
            self,
            PmaError::ReadFailure { source, .. } if source.kind() == io::ErrorKind::PermissionDenied
        )
    }
}

pub type Result<T> = std::result::Result<T, PmaError>;
