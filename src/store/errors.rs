//! # Store Errors

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by the document collection
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store refused an argument (e.g. a negative skip)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Reading or writing the data file failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The data file could not be decoded
    #[error("Corrupt data file {}: {message}", path.display())]
    Corrupt { path: PathBuf, message: String },

    /// A writer panicked while holding the collection lock
    #[error("Store lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True when the failure was caused by the caller's arguments
    pub fn is_client_error(&self) -> bool {
        matches!(self, StoreError::InvalidArgument(_))
    }
}
