//! The user entity
//!
//! A [`User`] is the in-memory representation of one persisted account record:
//!
//! | Field                  | Type               | Description                                              |
//! | ---------------------- | ------------------ | -------------------------------------------------------- |
//! | `id`                   | `UserId`           | Unique, immutable identifier and primary key.            |
//! | `user_name`            | `String`           | Display name.                                            |
//! | `normalized_user_name` | `Option<String>`   | Case-normalized name used for lookups.                   |
//! | `partition_key`        | `String`           | Storage binding, always equal to `id`.                   |
//! | `row_key`              | `String`           | Storage binding, always equal to `id`.                   |
//! | `etag`                 | `ETag`             | Concurrency tag of the last write this entity has seen.  |
//! | `created_at`           | `DateTime`         | When the entity was created.                             |
//! | `updated_at`           | `DateTime`         | When the entity was last written.                        |
//!
//! The storage binding is derived from the id when the entity is built and cannot be changed
//! afterwards. The entity does not keep `normalized_user_name` in sync with `user_name`; the
//! [`UserStore`](crate::UserStore) does that.
use crate::{
    Error,
    error::utilities::RequiredFieldExt,
    id::{generate_prefixed_id, validate_prefixed_id},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A unique, stable identifier for a specific user
/// This value should be treated as opaque, and should not be used as a UUID even if it may look like one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: &str) -> Self {
        UserId(id.to_string())
    }

    pub fn new_random() -> Self {
        UserId(generate_prefixed_id("usr"))
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validate that this ID has the format produced by [`UserId::new_random`]
    pub fn is_valid(&self) -> bool {
        validate_prefixed_id(&self.0, "usr")
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new_random()
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque version marker used for optimistic concurrency.
///
/// The wildcard tag `*` matches any stored version, so a write carrying it is unconditional.
/// Entities that were never written or read carry the wildcard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct ETag(String);

impl ETag {
    const WILDCARD: &'static str = "*";

    pub fn new(tag: &str) -> Self {
        ETag(tag.to_string())
    }

    /// The wildcard tag
    pub fn any() -> Self {
        ETag(Self::WILDCARD.to_string())
    }

    /// A fresh tag for a new stored version
    pub fn new_random() -> Self {
        ETag(generate_prefixed_id("etag"))
    }

    pub fn is_any(&self) -> bool {
        self.0 == Self::WILDCARD
    }

    /// Whether a write carrying `self` may replace a record stored with `stored`
    pub fn matches(&self, stored: &ETag) -> bool {
        self.is_any() || self == stored
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ETag {
    fn default() -> Self {
        Self::any()
    }
}

impl From<String> for ETag {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for ETag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    user_name: String,
    normalized_user_name: Option<String>,
    partition_key: String,
    row_key: String,
    etag: ETag,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new, not yet persisted user
    pub fn new(id: UserId, user_name: impl Into<String>) -> Self {
        let now = Utc::now();
        let key = id.as_str().to_string();
        User {
            partition_key: key.clone(),
            row_key: key,
            id,
            user_name: user_name.into(),
            normalized_user_name: None,
            etag: ETag::any(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn builder() -> UserBuilder {
        UserBuilder::default()
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn normalized_user_name(&self) -> Option<&str> {
        self.normalized_user_name.as_deref()
    }

    pub fn partition_key(&self) -> &str {
        &self.partition_key
    }

    pub fn row_key(&self) -> &str {
        &self.row_key
    }

    pub fn etag(&self) -> &ETag {
        &self.etag
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn set_user_name(&mut self, user_name: impl Into<String>) {
        self.user_name = user_name.into();
    }

    pub fn set_normalized_user_name(&mut self, normalized_user_name: Option<String>) {
        self.normalized_user_name = normalized_user_name;
    }

    /// Copy the storage-owned state (tag and timestamps) of a freshly written record.
    pub(crate) fn apply_stored(&mut self, stored: &User) {
        self.etag = stored.etag.clone();
        self.created_at = stored.created_at;
        self.updated_at = stored.updated_at;
    }

    /// Mark the entity as a new stored version.
    pub(crate) fn stamp(&mut self, etag: ETag, updated_at: DateTime<Utc>) {
        self.etag = etag;
        self.updated_at = updated_at;
    }
}

#[derive(Default)]
pub struct UserBuilder {
    id: Option<UserId>,
    user_name: Option<String>,
    normalized_user_name: Option<String>,
    etag: Option<ETag>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl UserBuilder {
    pub fn id(mut self, id: UserId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn user_name(mut self, user_name: impl Into<String>) -> Self {
        self.user_name = Some(user_name.into());
        self
    }

    pub fn normalized_user_name(mut self, normalized_user_name: Option<String>) -> Self {
        self.normalized_user_name = normalized_user_name;
        self
    }

    pub fn etag(mut self, etag: ETag) -> Self {
        self.etag = Some(etag);
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = Some(updated_at);
        self
    }

    pub fn build(self) -> Result<User, Error> {
        let now = Utc::now();
        let id = self.id.require_field("User ID")?;
        let key = id.as_str().to_string();
        Ok(User {
            partition_key: key.clone(),
            row_key: key,
            id,
            user_name: self.user_name.require_field("User name")?,
            normalized_user_name: self.normalized_user_name,
            etag: self.etag.unwrap_or_default(),
            created_at: self.created_at.unwrap_or(now),
            updated_at: self.updated_at.unwrap_or(now),
        })
    }
}
