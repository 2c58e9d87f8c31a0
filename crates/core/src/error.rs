//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Insufficient stock is deliberately absent: an allocation that cannot be
/// satisfied is a business outcome reported by the scheduler, not a failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An item or request failed admission validation.
    #[error("invalid entity: {0}")]
    InvalidEntity(String),

    /// Malformed data reached the allocation engine despite the admission contract.
    #[error("precondition violated: {0}")]
    PreconditionViolation(String),

    /// An identifier was invalid (e.g. parse failure, blank value).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested item, request or pool was not found.
    #[error("not found")]
    NotFound,
}

impl DomainError {
    pub fn invalid_entity(msg: impl Into<String>) -> Self {
        Self::InvalidEntity(msg.into())
    }

    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::PreconditionViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}
