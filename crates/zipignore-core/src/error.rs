//! Error types for zipignore-core

use std::path::PathBuf;
use thiserror::Error;

/// Core error types for the zipignore library
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Directory traversal hit an unrecoverable I/O fault
    #[error("Failed to walk {path:?}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid file or directory path
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// ZIP-specific error
    #[error("Zip error: {0}")]
    Zip(String),

    /// Configuration-related error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Security violation detected
    #[error("Security error: {0}")]
    SecurityError(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            other => Error::Zip(other.to_string()),
        }
    }
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        let path = err.path().map(PathBuf::from).unwrap_or_default();
        match err.into_io_error() {
            Some(source) => Error::Walk { path, source },
            None => Error::InvalidPath(format!("Filesystem loop detected at {:?}", path)),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
