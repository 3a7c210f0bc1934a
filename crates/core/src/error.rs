//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant is a deterministic, recoverable business outcome. Nothing in
/// this enum represents storage unavailability or other fatal infrastructure
/// failures; those belong to the hosting layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. zero quantity, negative price).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An action was attempted from the wrong lifecycle state.
    #[error("state conflict: {0}")]
    StateConflict(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested entity id did not resolve.
    #[error("not found")]
    NotFound,

    /// A uniqueness constraint was violated (document number, product code,
    /// user email). Retryable for document numbers, see the sequence notes.
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// The actor lacks the permission flag required for the action.
    #[error("permission denied: {0}")]
    PermissionDenied(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn state_conflict(msg: impl Into<String>) -> Self {
        Self::StateConflict(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn duplicate_key(msg: impl Into<String>) -> Self {
        Self::DuplicateKey(msg.into())
    }

    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}
