//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, request-scoped failures (malformed
/// input, absent records, rejected credentials). Nothing in this taxonomy is
/// fatal to the process; every failure is scoped to a single operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed caller input — surfaced to the caller, never retried.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A value failed validation (e.g. malformed email).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A referenced principal/role is absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// Credential mismatch. Deliberately does not say which half was wrong.
    #[error("either username or password is incorrect")]
    Unauthenticated,
}

impl DomainError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}
