//! Domain-level error types.

use thiserror::Error;

use crate::ports::AuthError;

/// Domain errors - business logic failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{entity_type} with id {id} not found")]
    NotFound { entity_type: &'static str, id: i64 },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Invalid credentials")]
    Unauthorized,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(entity_type: &'static str, id: i64) -> Self {
        Self::NotFound { entity_type, id }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Unique constraint violated: {0}")]
    Unique(String),

    #[error("Foreign key constraint violated: {0}")]
    ForeignKey(String),
}

impl From<RepoError> for DomainError {
    fn from(err: RepoError) -> Self {
        match err {
            // The services check uniqueness and references up front, so these
            // only surface when a concurrent write wins the race. The store's
            // message names tables and columns and stays in the logs.
            RepoError::Unique(cause) => {
                tracing::warn!(%cause, "unique constraint rejected a write");
                DomainError::Conflict("resource already exists".to_string())
            }
            RepoError::ForeignKey(cause) => {
                tracing::warn!(%cause, "foreign key constraint rejected a write");
                DomainError::Validation("referenced resource does not exist".to_string())
            }
            other => DomainError::Internal(other.to_string()),
        }
    }
}

impl From<AuthError> for DomainError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::HashingError(msg) => DomainError::Internal(msg),
            AuthError::TokenCreation(msg) => DomainError::Internal(msg),
            _ => DomainError::Unauthorized,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_violation_maps_to_generic_conflict() {
        let err: DomainError = RepoError::Unique(
            r#"duplicate key value violates unique constraint "users_email_key""#.to_string(),
        )
        .into();

        match err {
            DomainError::Conflict(msg) => {
                assert_eq!(msg, "resource already exists");
                assert!(!msg.contains("users_email_key"));
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn test_foreign_key_violation_maps_to_validation() {
        let err: DomainError = RepoError::ForeignKey(
            r#"insert or update on table "comments" violates foreign key constraint"#.to_string(),
        )
        .into();

        match err {
            DomainError::Validation(msg) => assert!(!msg.contains("comments")),
            other => panic!("expected validation, got {other:?}"),
        }
    }

    #[test]
    fn test_query_failure_maps_to_internal() {
        let err: DomainError = RepoError::Query("connection reset".to_string()).into();
        assert!(matches!(err, DomainError::Internal(_)));
    }

    #[test]
    fn test_token_errors_map_to_unauthorized() {
        let err: DomainError = AuthError::TokenExpired.into();
        assert!(matches!(err, DomainError::Unauthorized));

        let err: DomainError = AuthError::HashingError("out of memory".to_string()).into();
        assert!(matches!(err, DomainError::Internal(_)));
    }
}
