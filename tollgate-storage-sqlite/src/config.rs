use serde::{Deserialize, Serialize};
use tollgate_core::{DeletePolicy, Error, error::ValidationError, validation::validate_table_name};

pub const DEFAULT_DATABASE_URL: &str = "sqlite::memory:";
pub const DEFAULT_TABLE_NAME: &str = "users";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqliteStorageConfig {
    pub database_url: String,
    pub table_name: String,
    pub delete_policy: DeletePolicy,
    pub max_connections: u32,
}

impl SqliteStorageConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Self::default()
        }
    }

    /// Read configuration from `TOLLGATE_*` environment variables, falling back to defaults
    /// for anything unset.
    pub fn from_env() -> Result<Self, Error> {
        let mut config = Self::default();

        if let Ok(database_url) = std::env::var("TOLLGATE_DATABASE_URL") {
            config.database_url = database_url;
        }
        if let Ok(table_name) = std::env::var("TOLLGATE_USERS_TABLE") {
            config.table_name = table_name;
        }
        if let Ok(policy) = std::env::var("TOLLGATE_DELETE_POLICY") {
            config.delete_policy = policy.parse()?;
        }
        if let Ok(max_connections) = std::env::var("TOLLGATE_MAX_CONNECTIONS") {
            config.max_connections = max_connections.parse().map_err(|_| {
                ValidationError::InvalidField(format!(
                    "TOLLGATE_MAX_CONNECTIONS must be a positive integer, got {max_connections}"
                ))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }

    pub fn with_delete_policy(mut self, delete_policy: DeletePolicy) -> Self {
        self.delete_policy = delete_policy;
        self
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    pub fn validate(&self) -> Result<(), Error> {
        validate_table_name(&self.table_name)?;
        if self.max_connections == 0 {
            return Err(ValidationError::InvalidField(
                "max_connections must be at least 1".to_string(),
            )
            .into());
        }
        Ok(())
    }

    /// In-memory databases live inside a single connection.
    pub fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }
}

impl Default for SqliteStorageConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            table_name: DEFAULT_TABLE_NAME.to_string(),
            delete_policy: DeletePolicy::default(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SqliteStorageConfig::default();
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.table_name, "users");
        assert_eq!(config.delete_policy, DeletePolicy::Strict);
        assert!(config.is_in_memory());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_setters() {
        let config = SqliteStorageConfig::new("sqlite://tollgate.db?mode=rwc")
            .with_table_name("accounts")
            .with_delete_policy(DeletePolicy::Idempotent)
            .with_max_connections(2);

        assert_eq!(config.table_name, "accounts");
        assert_eq!(config.delete_policy, DeletePolicy::Idempotent);
        assert_eq!(config.max_connections, 2);
        assert!(!config.is_in_memory());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = SqliteStorageConfig::default().with_table_name("users; --");
        assert!(config.validate().unwrap_err().is_validation_error());

        let config = SqliteStorageConfig::default().with_max_connections(0);
        assert!(config.validate().is_err());
    }
}
