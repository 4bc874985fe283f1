use chrono::{DateTime, Utc};
use tollgate_core::{ETag, Error, User, UserId, error::StorageError};

/// One row of the users table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SqliteUserEntity {
    pub partition_key: String,
    pub row_key: String,
    pub id: String,
    pub user_name: String,
    pub normalized_user_name: Option<String>,
    pub etag: String,
    pub created_at: i64,
    pub updated_at: i64,
}

fn from_millis(column: &str, millis: i64) -> Result<DateTime<Utc>, Error> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| {
        Error::Storage(StorageError::Schema(format!(
            "{column} holds an out of range timestamp: {millis}"
        )))
    })
}

impl TryFrom<SqliteUserEntity> for User {
    type Error = Error;

    fn try_from(entity: SqliteUserEntity) -> Result<Self, Self::Error> {
        if entity.partition_key != entity.id || entity.row_key != entity.id {
            return Err(Error::Storage(StorageError::Schema(format!(
                "row ({}, {}) is not keyed by its id {}",
                entity.partition_key, entity.row_key, entity.id
            ))));
        }

        User::builder()
            .id(UserId::new(&entity.id))
            .user_name(entity.user_name)
            .normalized_user_name(entity.normalized_user_name)
            .etag(ETag::from(entity.etag))
            .created_at(from_millis("created_at", entity.created_at)?)
            .updated_at(from_millis("updated_at", entity.updated_at)?)
            .build()
    }
}
