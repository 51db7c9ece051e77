use thiserror::Error;

use crate::maven::layout::RepositoryLayout;

/// A path or file name that can not be decomposed into an artifact coordinate.
///
/// There is deliberately only one kind of parse failure; the `reason` is a human readable
///  explanation of what did not match.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not a valid artifact path {path:?}: {reason}")]
pub struct MalformedPathError {
    pub path: String,
    pub reason: String,
}
impl MalformedPathError {
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> MalformedPathError {
        MalformedPathError {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Errors produced by storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("path escapes the storage root: {0}")]
    OutsideRoot(String),
}

pub type ContentResult<T> = Result<T, ContentError>;

/// Errors of coordinate-level queries and mutations on a managed repository.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("content not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    MalformedPath(#[from] MalformedPathError),

    #[error("repository error: {0}")]
    Repository(#[from] StorageError),

    #[error("operation not supported for {0:?} layout")]
    UnsupportedLayout(RepositoryLayout),
}

/// Session level scan failures. Anything that happens to individual files or consumers is
///  reported in the scan summary instead.
#[derive(Debug, Error)]
pub enum ScannerError {
    #[error("repository root {0} does not exist")]
    MissingRoot(String),

    #[error("repository root {0} is not a directory")]
    RootNotDirectory(String),

    #[error("invalid path pattern: {0}")]
    Pattern(#[from] globset::Error),

    #[error("storage error on repository root: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Debug, Error)]
pub enum RepositoryConversionError {
    #[error("error converting legacy repository: {0}")]
    Scan(#[from] ScannerError),

    #[error("error converting legacy repository: {0}")]
    Storage(#[from] StorageError),

    #[error("error converting legacy repository: {} artifact(s) failed to copy: {}", .failures.len(), .failures.join("; "))]
    Copy { failures: Vec<String> },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read configuration {0}: {1}")]
    Io(String, #[source] std::io::Error),

    #[error("invalid configuration {0}: {1}")]
    Json(String, #[source] serde_json::Error),

    #[error("invalid file type pattern: {0}")]
    Pattern(#[from] globset::Error),

    #[error("no repository with id {0:?} is configured")]
    UnknownRepository(String),
}
