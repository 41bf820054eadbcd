//! Error types for report storage.

/// Error type for report store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No usable snapshot: missing, or present but unparsable.
    #[error("Report not found: {0}")]
    NotFound(String),

    /// The snapshot exists but could not be read.
    #[error("Failed to read report: {0}")]
    Read(String),

    /// The snapshot could not be written or promoted.
    #[error("Failed to write report: {0}")]
    Write(String),

    /// The report could not be serialized.
    #[error("Failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// True if this error means "no report stored yet".
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// Result type for report store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
