use crate::{CancellationToken, Error, User, UserId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Repository for user records (the users-table adapter contract)
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Insert a new user keyed by its partition and row key.
    ///
    /// Fails with `DuplicateKey` when the key or the normalized user name is already taken.
    /// Returns the stored record, carrying its new concurrency tag.
    async fn create(&self, user: &User, cancel: &CancellationToken) -> Result<User, Error>;

    /// Replace the stored record with the entity's current state.
    ///
    /// Fails with `NotFound` when the record is missing and with `ConcurrencyConflict` when the
    /// entity's tag is neither the wildcard nor the stored tag.
    async fn update(&self, user: &User, cancel: &CancellationToken) -> Result<User, Error>;

    /// Remove the stored record, honouring the entity's concurrency tag and the repository's
    /// [`DeletePolicy`] for missing records.
    async fn delete(&self, user: &User, cancel: &CancellationToken) -> Result<(), Error>;

    /// Find a user by ID
    async fn find_by_id(
        &self,
        id: &UserId,
        cancel: &CancellationToken,
    ) -> Result<Option<User>, Error>;

    /// Find a user by normalized user name. At most one record can match.
    async fn find_by_name(
        &self,
        normalized_user_name: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<User>, Error>;

    /// Cheap round-trip to the backend
    async fn health_check(&self) -> Result<(), Error>;

    /// Release backend resources. Safe to call more than once.
    async fn dispose(&self) -> Result<(), Error>;
}

/// What deleting a record that does not exist means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletePolicy {
    /// A missing record is reported as `StorageError::NotFound`.
    #[default]
    Strict,
    /// A missing record counts as already deleted.
    Idempotent,
}

impl std::str::FromStr for DeletePolicy {
    type Err = crate::error::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(DeletePolicy::Strict),
            "idempotent" => Ok(DeletePolicy::Idempotent),
            other => Err(crate::error::ValidationError::InvalidField(format!(
                "Unknown delete policy: {other}"
            ))),
        }
    }
}
