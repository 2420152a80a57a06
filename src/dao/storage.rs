use std::{io, path::Path};

use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by the session persistence layer.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to access `{path}`")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("corrupt session data in `{location}`: {reason}")]
    Corrupt { location: String, reason: String },
}

impl StorageError {
    /// Wrap a filesystem failure for `path`.
    pub fn io(path: &Path, source: io::Error) -> Self {
        StorageError::Io {
            path: path.display().to_string(),
            source,
        }
    }

    /// Build a corruption error for data found at `location`.
    pub fn corrupt(location: impl Into<String>, reason: impl ToString) -> Self {
        StorageError::Corrupt {
            location: location.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether the stored data exists but cannot be trusted.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, StorageError::Corrupt { .. })
    }
}
