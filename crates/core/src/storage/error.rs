use thiserror::Error;

/// Errors that can occur during repository operations.
///
/// These are the only errors a repository caller ever sees; cache failures
/// are logged and swallowed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    #[error("{entity_type} already exists: {key}")]
    AlreadyExists {
        entity_type: &'static str,
        key: String,
    },
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Query failed: {0}")]
    QueryFailed(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl RepositoryError {
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Returns true for the expected "no such record" outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_not_found_display() {
        let error = RepositoryError::not_found("quota", "abc-123");
        assert_eq!(error.to_string(), "quota not found: abc-123");
        assert!(error.is_not_found());
    }

    #[test]
    fn test_repository_error_already_exists_display() {
        let error = RepositoryError::AlreadyExists {
            entity_type: "space",
            key: "slug=acme".to_string(),
        };
        assert_eq!(error.to_string(), "space already exists: slug=acme");
        assert!(!error.is_not_found());
    }

    #[test]
    fn test_repository_error_constraint_violation_display() {
        let error =
            RepositoryError::ConstraintViolation("space s-1 is referenced by quota q-1".into());
        assert_eq!(
            error.to_string(),
            "Constraint violation: space s-1 is referenced by quota q-1"
        );
    }

    #[test]
    fn test_repository_error_connection_failed_display() {
        let error = RepositoryError::ConnectionFailed("timeout after 30s".to_string());
        assert_eq!(error.to_string(), "Connection failed: timeout after 30s");
    }

    #[test]
    fn test_repository_error_invalid_data_display() {
        let error = RepositoryError::InvalidData("quota exceeded".to_string());
        assert_eq!(error.to_string(), "Invalid data: quota exceeded");
    }
}
