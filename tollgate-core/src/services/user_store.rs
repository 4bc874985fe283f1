use std::sync::Arc;

use crate::{
    CancellationToken, Error, LookupNormalizer, UpperInvariantNormalizer, User, UserId,
    error::StorageError,
    repositories::UserRepository,
    validation::{validate_normalized_user_name, validate_user_id, validate_user_name},
};

/// Backend-agnostic user store
///
/// Validates arguments, keeps the normalized user name in step with the user name, and forwards
/// storage work to the configured [`UserRepository`]. The store holds no state of its own beyond
/// the injected repository and normalizer.
pub struct UserStore<R: UserRepository> {
    repository: Arc<R>,
    normalizer: Arc<dyn LookupNormalizer>,
}

impl<R: UserRepository> Clone for UserStore<R> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
            normalizer: self.normalizer.clone(),
        }
    }
}

impl<R: UserRepository> UserStore<R> {
    /// Create a new UserStore over the given repository
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            normalizer: Arc::new(UpperInvariantNormalizer),
        }
    }

    /// Replace the default upper-casing normalizer
    pub fn with_normalizer(mut self, normalizer: Arc<dyn LookupNormalizer>) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    pub fn normalize_name(&self, name: &str) -> String {
        self.normalizer.normalize_name(name)
    }

    /// Persist a new user.
    ///
    /// Fills in the normalized user name when it is missing. On success the entity carries the
    /// concurrency tag of the stored record, so it can be passed straight to [`Self::update`].
    pub async fn create(&self, user: &mut User, cancel: &CancellationToken) -> Result<(), Error> {
        self.prepare_write(user)?;

        let stored = self
            .repository
            .create(user, cancel)
            .await
            .inspect_err(|e| log_failure("create", user.id(), e))?;
        user.apply_stored(&stored);

        tracing::info!(user_id = %user.id(), "Created user");
        Ok(())
    }

    /// Persist the current in-memory state of a previously created user.
    pub async fn update(&self, user: &mut User, cancel: &CancellationToken) -> Result<(), Error> {
        self.prepare_write(user)?;

        let stored = self
            .repository
            .update(user, cancel)
            .await
            .inspect_err(|e| log_failure("update", user.id(), e))?;
        user.apply_stored(&stored);

        tracing::info!(user_id = %user.id(), "Updated user");
        Ok(())
    }

    pub async fn delete(&self, user: &User, cancel: &CancellationToken) -> Result<(), Error> {
        validate_user_id(user.id().as_str())?;

        self.repository
            .delete(user, cancel)
            .await
            .inspect_err(|e| log_failure("delete", user.id(), e))?;

        tracing::info!(user_id = %user.id(), "Deleted user");
        Ok(())
    }

    pub async fn find_by_id(
        &self,
        user_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<User>, Error> {
        validate_user_id(user_id)?;

        self.repository
            .find_by_id(&UserId::new(user_id), cancel)
            .await
    }

    /// Find a user by the normalized name stored on the record.
    ///
    /// The argument is matched as given. Run raw input through [`Self::normalize_name`] first.
    pub async fn find_by_name(
        &self,
        normalized_user_name: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<User>, Error> {
        validate_normalized_user_name(normalized_user_name)?;

        self.repository
            .find_by_name(normalized_user_name, cancel)
            .await
    }

    pub fn get_user_id<'a>(&self, user: &'a User) -> &'a str {
        user.id().as_str()
    }

    pub fn get_user_name<'a>(&self, user: &'a User) -> &'a str {
        user.user_name()
    }

    pub fn get_normalized_user_name<'a>(&self, user: &'a User) -> Option<&'a str> {
        user.normalized_user_name()
    }

    /// Rename the user in memory and re-derive its normalized name. Nothing is persisted until
    /// [`Self::update`] is called.
    pub fn set_user_name(&self, user: &mut User, user_name: &str) -> Result<(), Error> {
        validate_user_name(user_name)?;

        user.set_user_name(user_name);
        user.set_normalized_user_name(Some(self.normalizer.normalize_name(user_name)));
        Ok(())
    }

    /// Override the normalized name in memory.
    pub fn set_normalized_user_name(
        &self,
        user: &mut User,
        normalized_user_name: &str,
    ) -> Result<(), Error> {
        validate_normalized_user_name(normalized_user_name)?;

        user.set_normalized_user_name(Some(normalized_user_name.to_string()));
        Ok(())
    }

    pub async fn dispose(&self) -> Result<(), Error> {
        self.repository.dispose().await
    }

    fn prepare_write(&self, user: &mut User) -> Result<(), Error> {
        validate_user_id(user.id().as_str())?;
        validate_user_name(user.user_name())?;

        match user.normalized_user_name() {
            Some(normalized) => validate_normalized_user_name(normalized)?,
            None => {
                let normalized = self.normalizer.normalize_name(user.user_name());
                user.set_normalized_user_name(Some(normalized));
            }
        }
        Ok(())
    }
}

fn log_failure(operation: &str, user_id: &UserId, error: &Error) {
    match error {
        Error::Storage(StorageError::Unavailable(_)) | Error::Storage(StorageError::Schema(_)) => {
            tracing::error!(%user_id, operation, error = %error, "User store operation failed")
        }
        Error::Storage(StorageError::ConcurrencyConflict(_)) => {
            tracing::warn!(%user_id, operation, error = %error, "User store write conflict")
        }
        _ => tracing::debug!(%user_id, operation, error = %error, "User store operation rejected"),
    }
}
