//! In-process users table
//!
//! [`MemoryUserRepository`] keeps records in a [`DashMap`] keyed by `(partition_key, row_key)`
//! with a second map reserving normalized user names, so duplicate names are rejected at write
//! time just like the SQL backends' unique index. Intended for tests and demos.
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::{DashMap, mapref::entry::Entry};

use crate::{
    CancellationToken, ETag, Error, User, UserId,
    cancellation::ensure_active,
    error::StorageError,
    repositories::{DeletePolicy, UserRepository},
};

type StorageKey = (String, String);

fn key_of(user: &User) -> StorageKey {
    (user.partition_key().to_string(), user.row_key().to_string())
}

#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    records: DashMap<StorageKey, User>,
    names: DashMap<String, UserId>,
    delete_policy: DeletePolicy,
    disposed: AtomicBool,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delete_policy(mut self, delete_policy: DeletePolicy) -> Self {
        self.delete_policy = delete_policy;
        self
    }

    pub fn delete_policy(&self) -> DeletePolicy {
        self.delete_policy
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn ensure_open(&self) -> Result<(), Error> {
        if self.disposed.load(Ordering::Acquire) {
            return Err(Error::Storage(StorageError::Unavailable(
                "memory users table has been disposed".to_string(),
            )));
        }
        Ok(())
    }

    /// Claim `name` for `id`. Returns whether a new reservation was made.
    fn reserve_name(&self, name: &str, id: &UserId) -> Result<bool, Error> {
        match self.names.entry(name.to_string()) {
            Entry::Occupied(owner) if owner.get() == id => Ok(false),
            Entry::Occupied(_) => Err(Error::Storage(StorageError::DuplicateKey(format!(
                "normalized user name {name} is already taken"
            )))),
            Entry::Vacant(slot) => {
                slot.insert(id.clone());
                Ok(true)
            }
        }
    }

    fn release_name(&self, name: &str, id: &UserId) {
        self.names.remove_if(name, |_, owner| owner == id);
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: &User, cancel: &CancellationToken) -> Result<User, Error> {
        ensure_active(cancel)?;
        self.ensure_open()?;

        let name = user.normalized_user_name();
        let reserved = match name {
            Some(name) => self.reserve_name(name, user.id())?,
            None => false,
        };

        let mut stored = user.clone();
        stored.stamp(ETag::new_random(), Utc::now());

        match self.records.entry(key_of(user)) {
            Entry::Occupied(_) => {
                if let (Some(name), true) = (name, reserved) {
                    self.release_name(name, user.id());
                }
                Err(Error::Storage(StorageError::DuplicateKey(format!(
                    "user {} already exists",
                    user.id()
                ))))
            }
            Entry::Vacant(slot) => {
                slot.insert(stored.clone());
                tracing::debug!(user_id = %user.id(), "Inserted user into memory table");
                Ok(stored)
            }
        }
    }

    async fn update(&self, user: &User, cancel: &CancellationToken) -> Result<User, Error> {
        ensure_active(cancel)?;
        self.ensure_open()?;

        let name = user.normalized_user_name();
        let reserved = match name {
            Some(name) => self.reserve_name(name, user.id())?,
            None => false,
        };

        let outcome = match self.records.get_mut(&key_of(user)) {
            None => Err(Error::Storage(StorageError::NotFound)),
            Some(existing) if !user.etag().matches(existing.etag()) => {
                Err(Error::Storage(StorageError::ConcurrencyConflict(format!(
                    "user {} was modified since it was read",
                    user.id()
                ))))
            }
            Some(mut existing) => {
                let previous_name = existing.normalized_user_name().map(str::to_string);
                let mut stored = user.clone();
                stored.apply_stored(&existing);
                stored.stamp(ETag::new_random(), Utc::now());
                *existing = stored.clone();
                Ok((stored, previous_name))
            }
        };

        match outcome {
            Ok((stored, previous_name)) => {
                if let Some(previous) = previous_name.filter(|prev| Some(prev.as_str()) != name) {
                    self.release_name(&previous, user.id());
                }
                Ok(stored)
            }
            Err(e) => {
                if let (Some(name), true) = (name, reserved) {
                    self.release_name(name, user.id());
                }
                Err(e)
            }
        }
    }

    async fn delete(&self, user: &User, cancel: &CancellationToken) -> Result<(), Error> {
        ensure_active(cancel)?;
        self.ensure_open()?;

        let key = key_of(user);
        if let Some((_, removed)) = self
            .records
            .remove_if(&key, |_, existing| user.etag().matches(existing.etag()))
        {
            if let Some(name) = removed.normalized_user_name() {
                self.release_name(name, removed.id());
            }
            return Ok(());
        }

        if self.records.contains_key(&key) {
            return Err(Error::Storage(StorageError::ConcurrencyConflict(format!(
                "user {} was modified since it was read",
                user.id()
            ))));
        }

        match self.delete_policy {
            DeletePolicy::Strict => Err(Error::Storage(StorageError::NotFound)),
            DeletePolicy::Idempotent => {
                tracing::debug!(user_id = %user.id(), "Delete of missing user treated as success");
                Ok(())
            }
        }
    }

    async fn find_by_id(
        &self,
        id: &UserId,
        cancel: &CancellationToken,
    ) -> Result<Option<User>, Error> {
        ensure_active(cancel)?;
        self.ensure_open()?;

        let key = (id.as_str().to_string(), id.as_str().to_string());
        Ok(self.records.get(&key).map(|record| record.value().clone()))
    }

    async fn find_by_name(
        &self,
        normalized_user_name: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<User>, Error> {
        ensure_active(cancel)?;
        self.ensure_open()?;

        let Some(id) = self
            .names
            .get(normalized_user_name)
            .map(|owner| owner.value().clone())
        else {
            return Ok(None);
        };

        let key = (id.as_str().to_string(), id.into_inner());
        Ok(self.records.get(&key).map(|record| record.value().clone()))
    }

    async fn health_check(&self) -> Result<(), Error> {
        self.ensure_open()
    }

    async fn dispose(&self) -> Result<(), Error> {
        if !self.disposed.swap(true, Ordering::AcqRel) {
            self.records.clear();
            self.names.clear();
            tracing::debug!("Disposed memory users table");
        }
        Ok(())
    }
}
