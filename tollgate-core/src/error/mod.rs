pub mod utilities;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Operation cancelled")]
    Cancelled,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Record not found")]
    NotFound,

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Concurrency conflict: {0}")]
    ConcurrencyConflict(String),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Schema error: {0}")]
    Schema(String),
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid field: {0}")]
    InvalidField(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

impl Error {
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    pub fn is_storage_error(&self) -> bool {
        matches!(self, Error::Storage(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Storage(StorageError::NotFound))
    }

    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, Error::Storage(StorageError::DuplicateKey(_)))
    }

    pub fn is_concurrency_conflict(&self) -> bool {
        matches!(self, Error::Storage(StorageError::ConcurrencyConflict(_)))
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Error::Storage(StorageError::Unavailable(_)))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let validation_error =
            Error::Validation(ValidationError::InvalidArgument("user id is blank".to_string()));
        assert_eq!(
            validation_error.to_string(),
            "Validation error: Invalid argument: user id is blank"
        );

        let storage_error = Error::Storage(StorageError::NotFound);
        assert_eq!(storage_error.to_string(), "Storage error: Record not found");

        assert_eq!(Error::Cancelled.to_string(), "Operation cancelled");
    }

    #[test]
    fn test_storage_error_variants() {
        let duplicate = StorageError::DuplicateKey("users/usr_1".to_string());
        assert_eq!(duplicate.to_string(), "Duplicate key: users/usr_1");

        let conflict = StorageError::ConcurrencyConflict("etag mismatch".to_string());
        assert_eq!(conflict.to_string(), "Concurrency conflict: etag mismatch");

        let unavailable = StorageError::Unavailable("connection refused".to_string());
        assert_eq!(
            unavailable.to_string(),
            "Backend unavailable: connection refused"
        );
    }

    #[test]
    fn test_predicates() {
        assert!(Error::Storage(StorageError::NotFound).is_not_found());
        assert!(Error::Storage(StorageError::NotFound).is_storage_error());
        assert!(Error::Storage(StorageError::DuplicateKey("k".into())).is_duplicate_key());
        assert!(
            Error::Storage(StorageError::ConcurrencyConflict("k".into())).is_concurrency_conflict()
        );
        assert!(Error::Storage(StorageError::Unavailable("x".into())).is_unavailable());
        assert!(Error::Cancelled.is_cancelled());
        assert!(!Error::Cancelled.is_storage_error());
        assert!(
            Error::Validation(ValidationError::MissingField("user".into())).is_validation_error()
        );
        assert!(!Error::Storage(StorageError::NotFound).is_validation_error());
    }

    #[test]
    fn test_error_from_conversions() {
        let error: Error = StorageError::NotFound.into();
        assert!(matches!(error, Error::Storage(StorageError::NotFound)));

        let error: Error = ValidationError::InvalidField("name".to_string()).into();
        assert!(matches!(
            error,
            Error::Validation(ValidationError::InvalidField(_))
        ));
    }
}
