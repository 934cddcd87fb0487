//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Used for deterministic failures outside the mutation engine itself:
/// catalog definition validation, identifier parsing, version conflicts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. a definition with a zero max stack).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested resource was not found (domain-level).
    #[error("not found")]
    NotFound,

    /// A conflict occurred (e.g. stale version / duplicate key).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}
