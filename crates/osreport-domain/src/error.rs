//! Domain error types.

use thiserror::Error;

/// Domain-level errors.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The collector failed.
    #[error("Collection error: {0}")]
    Collection(#[from] osreport_collector::CollectionError),

    /// The report store failed.
    #[error("Storage error: {0}")]
    Store(#[from] osreport_store::StoreError),

    /// No session is registered under this id.
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// A background task failed to complete.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<osreport_session::Error> for DomainError {
    fn from(err: osreport_session::Error) -> Self {
        match err {
            osreport_session::Error::NotFound(id) => DomainError::SessionNotFound(id),
        }
    }
}

/// Result type for domain operations.
pub type Result<T> = std::result::Result<T, DomainError>;
