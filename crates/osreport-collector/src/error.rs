//! Error types for inventory collection.

use std::path::PathBuf;

/// Error type for collection operations.
#[derive(Debug, thiserror::Error)]
pub enum CollectionError {
    /// The inventory source could not be read.
    #[error("Failed to read inventory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The inventory source was read but is not valid.
    #[error("Invalid inventory {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The backend reported an error.
    #[error("Collection failed: {0}")]
    Backend(String),
}

/// Result type for collection operations.
pub type Result<T> = std::result::Result<T, CollectionError>;
