//! Error types for session registry operations.

/// Error type for session registry operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No session is registered under this id.
    #[error("Session not found: {0}")]
    NotFound(String),
}

/// Result type for session registry operations.
pub type Result<T> = std::result::Result<T, Error>;
