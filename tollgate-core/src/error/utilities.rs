use crate::{
    Error,
    error::{StorageError, ValidationError},
};

/// Extension trait for Result types to simplify backend error mapping
///
/// Any backend failure that is not one of the typed storage outcomes (not found, duplicate key,
/// concurrency conflict) surfaces as [`StorageError::Unavailable`].
///
/// # Example
///
/// ```rust,ignore
/// use tollgate_core::error::utilities::DatabaseResultExt;
///
/// // Instead of:
/// // query.execute(&pool).await.map_err(|e| Error::Storage(StorageError::Unavailable(e.to_string())))?;
///
/// // Use:
/// query.execute(&pool).await.map_db_err()?;
/// ```
pub trait DatabaseResultExt<T> {
    /// Convert a backend error to a storage error
    fn map_db_err(self) -> Result<T, Error>;

    /// Convert a backend error to a storage error with additional context
    fn map_db_err_with_context(self, context: &str) -> Result<T, Error>;
}

impl<T, E: std::fmt::Display> DatabaseResultExt<T> for Result<T, E> {
    fn map_db_err(self) -> Result<T, Error> {
        self.map_err(|e| Error::Storage(StorageError::Unavailable(e.to_string())))
    }

    fn map_db_err_with_context(self, context: &str) -> Result<T, Error> {
        self.map_err(|e| Error::Storage(StorageError::Unavailable(format!("{context}: {e}"))))
    }
}

/// Extension trait for Option types to simplify required field validation
///
/// # Example
///
/// ```rust
/// use tollgate_core::error::utilities::RequiredFieldExt;
///
/// let user_name: Option<String> = Some("alice".to_string());
/// assert_eq!(user_name.require_field("User name").unwrap(), "alice");
/// ```
pub trait RequiredFieldExt<T> {
    /// Convert None to a ValidationError::MissingField
    fn require_field(self, field_name: &str) -> Result<T, ValidationError>;
}

impl<T> RequiredFieldExt<T> for Option<T> {
    fn require_field(self, field_name: &str) -> Result<T, ValidationError> {
        self.ok_or_else(|| ValidationError::MissingField(format!("{field_name} is required")))
    }
}
