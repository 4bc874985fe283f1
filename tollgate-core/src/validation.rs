use crate::error::ValidationError;
use regex::Regex;
use std::sync::LazyLock;

/// Argument validation shared by the user store and storage backends.
///
/// Table names follow the table-storage naming rule: a letter followed by 2 to 62
/// alphanumeric characters.
static TABLE_NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9]{2,62}$").expect("Invalid table name regex pattern")
});

/// Rejects blank (empty or whitespace-only) arguments.
///
/// # Examples
///
/// ```rust
/// use tollgate_core::validation::require_non_blank;
///
/// assert!(require_non_blank("user id", "usr_123").is_ok());
/// assert!(require_non_blank("user id", "   ").is_err());
/// ```
pub fn require_non_blank(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::InvalidArgument(format!(
            "{field} must not be blank"
        )));
    }

    Ok(())
}

pub fn validate_user_id(id: &str) -> Result<(), ValidationError> {
    require_non_blank("user id", id)
}

pub fn validate_user_name(user_name: &str) -> Result<(), ValidationError> {
    require_non_blank("user name", user_name)
}

pub fn validate_normalized_user_name(normalized_user_name: &str) -> Result<(), ValidationError> {
    require_non_blank("normalized user name", normalized_user_name)
}

/// Validates a storage table name
pub fn validate_table_name(table_name: &str) -> Result<(), ValidationError> {
    if TABLE_NAME_REGEX.is_match(table_name) {
        Ok(())
    } else {
        Err(ValidationError::InvalidField(format!(
            "Invalid table name: {table_name}"
        )))
    }
}
