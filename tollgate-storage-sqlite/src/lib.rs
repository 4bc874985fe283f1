//! SQLite users table for tollgate
//!
//! [`SqliteUserTable`] implements [`UserRepository`] over a single SQLite table laid out like a
//! table-storage entity set: every row is addressed by `(partition_key, row_key)` (both equal to
//! the user id), carries an `etag` for optimistic concurrency, and exposes
//! `normalized_user_name` as a filterable, unique column.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tollgate_core::UserStore;
//! use tollgate_storage_sqlite::{SqliteStorageConfig, SqliteUserTable};
//!
//! # async fn run() -> Result<(), tollgate_core::Error> {
//! let table = SqliteUserTable::connect(&SqliteStorageConfig::default()).await?;
//! table.migrate().await?;
//! let store = UserStore::new(Arc::new(table));
//! # Ok(())
//! # }
//! ```
mod config;
mod entity;
mod migrations;

pub use config::{
    DEFAULT_DATABASE_URL, DEFAULT_MAX_CONNECTIONS, DEFAULT_TABLE_NAME, SqliteStorageConfig,
};
pub use entity::SqliteUserEntity;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use tollgate_core::{
    CancellationToken, DeletePolicy, ETag, Error, User, UserId, UserRepository,
    cancellation::{ensure_active, run_cancellable},
    error::{StorageError, utilities::DatabaseResultExt},
    validation::validate_table_name,
};

/// SQL text for one table, built once at construction.
#[derive(Debug, Clone)]
struct Statements {
    insert: String,
    update: String,
    delete: String,
    select_by_key: String,
    select_by_name: String,
    select_etag: String,
}

impl Statements {
    fn for_table(table: &str) -> Self {
        Self {
            insert: format!(
                "INSERT INTO {table} \
                 (partition_key, row_key, id, user_name, normalized_user_name, etag, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) \
                 RETURNING *"
            ),
            update: format!(
                "UPDATE {table} \
                 SET user_name = ?1, normalized_user_name = ?2, etag = ?3, updated_at = ?4 \
                 WHERE partition_key = ?5 AND row_key = ?6 AND (?7 = '*' OR etag = ?7) \
                 RETURNING *"
            ),
            delete: format!(
                "DELETE FROM {table} \
                 WHERE partition_key = ?1 AND row_key = ?2 AND (?3 = '*' OR etag = ?3)"
            ),
            select_by_key: format!(
                "SELECT * FROM {table} WHERE partition_key = ?1 AND row_key = ?2"
            ),
            select_by_name: format!(
                "SELECT * FROM {table} WHERE normalized_user_name = ?1 LIMIT 1"
            ),
            select_etag: format!(
                "SELECT etag FROM {table} WHERE partition_key = ?1 AND row_key = ?2"
            ),
        }
    }
}

pub struct SqliteUserTable {
    pool: SqlitePool,
    table: String,
    delete_policy: DeletePolicy,
    statements: Statements,
}

impl SqliteUserTable {
    /// Use the default `users` table over an existing pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self::build(pool, config::DEFAULT_TABLE_NAME.to_string(), DeletePolicy::default())
    }

    /// Use the table and delete policy from `config` over an existing pool.
    pub fn with_config(pool: SqlitePool, config: &SqliteStorageConfig) -> Result<Self, Error> {
        validate_table_name(&config.table_name)?;
        Ok(Self::build(
            pool,
            config.table_name.clone(),
            config.delete_policy,
        ))
    }

    /// Open a pool for `config.database_url` and bind it to the configured table.
    pub async fn connect(config: &SqliteStorageConfig) -> Result<Self, Error> {
        config.validate()?;

        let options = if config.is_in_memory() {
            // Each connection would otherwise see its own empty database.
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(config.max_connections)
        };

        let pool = options
            .connect(&config.database_url)
            .await
            .map_db_err_with_context("Failed to connect to SQLite")?;

        Self::with_config(pool, config)
    }

    fn build(pool: SqlitePool, table: String, delete_policy: DeletePolicy) -> Self {
        let statements = Statements::for_table(&table);
        Self {
            pool,
            table,
            delete_policy,
            statements,
        }
    }

    pub fn with_delete_policy(mut self, delete_policy: DeletePolicy) -> Self {
        self.delete_policy = delete_policy;
        self
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn delete_policy(&self) -> DeletePolicy {
        self.delete_policy
    }

    /// Create the users table if needed
    pub async fn migrate(&self) -> Result<(), Error> {
        self.ensure_open()?;
        migrations::ensure_schema(&self.pool, &self.table).await
    }

    fn ensure_open(&self) -> Result<(), Error> {
        if self.pool.is_closed() {
            return Err(Error::Storage(StorageError::Unavailable(format!(
                "connection pool for table {} has been closed",
                self.table
            ))));
        }
        Ok(())
    }

    /// Distinguish a missing row from a stale tag after a conditional write touched nothing.
    async fn stored_etag(&self, user: &User) -> Result<Option<String>, Error> {
        sqlx::query_scalar::<_, String>(&self.statements.select_etag)
            .bind(user.partition_key())
            .bind(user.row_key())
            .fetch_optional(&self.pool)
            .await
            .map_db_err_with_context("Failed to read user etag")
    }

    fn conflict(&self, user: &User) -> Error {
        tracing::warn!(
            user_id = %user.id(),
            table = %self.table,
            etag = %user.etag(),
            "Rejected write with stale etag"
        );
        Error::Storage(StorageError::ConcurrencyConflict(format!(
            "user {} was modified since it was read",
            user.id()
        )))
    }
}

fn map_write_err(e: sqlx::Error, user: &User) -> Error {
    match e.as_database_error() {
        Some(db) if db.is_unique_violation() => Error::Storage(StorageError::DuplicateKey(
            format!("user {}: {}", user.id(), db.message()),
        )),
        _ => {
            tracing::error!(user_id = %user.id(), error = %e, "Failed to write user");
            Error::Storage(StorageError::Unavailable(e.to_string()))
        }
    }
}

#[async_trait]
impl UserRepository for SqliteUserTable {
    async fn create(&self, user: &User, cancel: &CancellationToken) -> Result<User, Error> {
        ensure_active(cancel)?;
        self.ensure_open()?;

        let etag = ETag::new_random();
        let now = Utc::now().timestamp_millis();

        let entity = run_cancellable(cancel, async {
            sqlx::query_as::<_, SqliteUserEntity>(&self.statements.insert)
                .bind(user.partition_key())
                .bind(user.row_key())
                .bind(user.id().as_str())
                .bind(user.user_name())
                .bind(user.normalized_user_name())
                .bind(etag.as_str())
                .bind(user.created_at().timestamp_millis())
                .bind(now)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| map_write_err(e, user))
        })
        .await?;

        tracing::debug!(user_id = %user.id(), table = %self.table, "Inserted user");
        entity.try_into()
    }

    async fn update(&self, user: &User, cancel: &CancellationToken) -> Result<User, Error> {
        ensure_active(cancel)?;
        self.ensure_open()?;

        let etag = ETag::new_random();
        let now = Utc::now().timestamp_millis();

        let entity = run_cancellable(cancel, async {
            let updated = sqlx::query_as::<_, SqliteUserEntity>(&self.statements.update)
                .bind(user.user_name())
                .bind(user.normalized_user_name())
                .bind(etag.as_str())
                .bind(now)
                .bind(user.partition_key())
                .bind(user.row_key())
                .bind(user.etag().as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| map_write_err(e, user))?;

            match updated {
                Some(entity) => Ok(entity),
                None => match self.stored_etag(user).await? {
                    Some(_) => Err(self.conflict(user)),
                    None => Err(Error::Storage(StorageError::NotFound)),
                },
            }
        })
        .await?;

        tracing::debug!(user_id = %user.id(), table = %self.table, "Replaced user");
        entity.try_into()
    }

    async fn delete(&self, user: &User, cancel: &CancellationToken) -> Result<(), Error> {
        ensure_active(cancel)?;
        self.ensure_open()?;

        run_cancellable(cancel, async {
            let result = sqlx::query(&self.statements.delete)
                .bind(user.partition_key())
                .bind(user.row_key())
                .bind(user.etag().as_str())
                .execute(&self.pool)
                .await
                .map_db_err_with_context("Failed to delete user")?;

            if result.rows_affected() > 0 {
                return Ok(());
            }

            if self.stored_etag(user).await?.is_some() {
                return Err(self.conflict(user));
            }

            match self.delete_policy {
                DeletePolicy::Strict => Err(Error::Storage(StorageError::NotFound)),
                DeletePolicy::Idempotent => {
                    tracing::debug!(
                        user_id = %user.id(),
                        table = %self.table,
                        "Delete of missing user treated as success"
                    );
                    Ok(())
                }
            }
        })
        .await
    }

    async fn find_by_id(
        &self,
        id: &UserId,
        cancel: &CancellationToken,
    ) -> Result<Option<User>, Error> {
        ensure_active(cancel)?;
        self.ensure_open()?;

        let entity = run_cancellable(cancel, async {
            sqlx::query_as::<_, SqliteUserEntity>(&self.statements.select_by_key)
                .bind(id.as_str())
                .bind(id.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_db_err_with_context("Failed to find user by id")
        })
        .await?;

        entity.map(User::try_from).transpose()
    }

    async fn find_by_name(
        &self,
        normalized_user_name: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<User>, Error> {
        ensure_active(cancel)?;
        self.ensure_open()?;

        let entity = run_cancellable(cancel, async {
            sqlx::query_as::<_, SqliteUserEntity>(&self.statements.select_by_name)
                .bind(normalized_user_name)
                .fetch_optional(&self.pool)
                .await
                .map_db_err_with_context("Failed to find user by name")
        })
        .await?;

        entity.map(User::try_from).transpose()
    }

    async fn health_check(&self) -> Result<(), Error> {
        self.ensure_open()?;
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_db_err()?;
        Ok(())
    }

    async fn dispose(&self) -> Result<(), Error> {
        if !self.pool.is_closed() {
            self.pool.close().await;
            tracing::debug!(table = %self.table, "Closed SQLite pool");
        }
        Ok(())
    }
}
