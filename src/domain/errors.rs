//! Domain errors for the gemscout discovery pipeline.

use thiserror::Error;

/// Domain-level errors that can occur while discovering, scoring and storing repositories.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Repository not found: {0}")]
    RepositoryNotFound(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Upstream request failed: {0}")]
    UpstreamFailed(String),

    #[error("Upstream rate limit exceeded: {0}")]
    UpstreamRateLimited(String),

    #[error("Export failed: {0}")]
    ExportFailed(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::ExportFailed(err.to_string())
    }
}
