//! Service layer error types
//!
//! Provides a unified error type for all use-case operations. Domain
//! sentinels pass through unchanged so transports can dispatch on them.

use huddle_core::{DomainError, ErrorKind, ValidationError};
use tracing::warn;

use crate::ports::{RepoResult, RepositoryError};
use crate::request_context::ContextError;

/// Service layer error type
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Domain rule violation, surfaced verbatim
    #[error(transparent)]
    Domain(DomainError),

    /// Structural input validation failure
    #[error("validation failed: {0}")]
    Validation(ValidationError),

    /// Storage failure with the operation that hit it
    #[error("repository error during {operation}: {source}")]
    Repository {
        operation: &'static str,
        #[source]
        source: RepositoryError,
    },

    /// The request context was cancelled or ran out of time
    #[error(transparent)]
    Context(#[from] ContextError),
}

impl ServiceError {
    /// Wrap a repository failure, keeping cancellation and stale-write
    /// conflicts distinguishable.
    pub fn repository(operation: &'static str, source: RepositoryError) -> Self {
        match source {
            RepositoryError::Cancelled(e) => Self::Context(e),
            RepositoryError::Conflict { stored, expected } => {
                warn!(operation, stored, expected, "Stale write rejected");
                Self::Domain(DomainError::ConcurrencyConflict)
            }
            source => Self::Repository { operation, source },
        }
    }

    /// The domain sentinel behind this error, if any
    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        match self {
            Self::Validation(_) => true,
            Self::Domain(e) => e.is_validation(),
            _ => false,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Domain(e) => match e.kind() {
                ErrorKind::InvalidInput => 400,
                ErrorKind::NotFound => 404,
                ErrorKind::Forbidden => 403,
                ErrorKind::InvalidState | ErrorKind::AlreadyExists | ErrorKind::Conflict => 409,
                ErrorKind::External => 502,
            },
            Self::Validation(_) => 400,
            Self::Context(_) => 408,
            Self::Repository { .. } => 500,
        }
    }

    /// Get the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Domain(e) => e.code(),
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Repository { .. } => "REPOSITORY_ERROR",
            Self::Context(ContextError::Cancelled) => "REQUEST_CANCELLED",
            Self::Context(ContextError::DeadlineExceeded) => "DEADLINE_EXCEEDED",
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(v) => Self::Validation(v),
            other => Self::Domain(other),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Repository result adapters used by the use-cases
pub(crate) trait RepoResultExt<T> {
    /// Translate `NotFound` into a use-case specific sentinel
    fn or_not_found(
        self,
        operation: &'static str,
        not_found: impl FnOnce() -> DomainError,
    ) -> ServiceResult<T>;

    fn with_operation(self, operation: &'static str) -> ServiceResult<T>;
}

impl<T> RepoResultExt<T> for RepoResult<T> {
    fn or_not_found(
        self,
        operation: &'static str,
        not_found: impl FnOnce() -> DomainError,
    ) -> ServiceResult<T> {
        self.map_err(|e| match e {
            RepositoryError::NotFound => ServiceError::Domain(not_found()),
            other => ServiceError::repository(operation, other),
        })
    }

    fn with_operation(self, operation: &'static str) -> ServiceResult<T> {
        self.map_err(|e| ServiceError::repository(operation, e))
    }
}
