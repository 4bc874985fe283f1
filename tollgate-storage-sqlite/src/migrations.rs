//! Users table bootstrap
use sqlx::SqlitePool;
use tollgate_core::{Error, error::StorageError};

pub(crate) fn create_table_sql(table: &str) -> String {
    format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            partition_key TEXT NOT NULL,
            row_key TEXT NOT NULL,
            id TEXT NOT NULL,
            user_name TEXT NOT NULL,
            normalized_user_name TEXT,
            etag TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            PRIMARY KEY (partition_key, row_key)
        )"#
    )
}

// NULLs never collide under a SQLite unique index, so unnamed users stay allowed.
pub(crate) fn create_name_index_sql(table: &str) -> String {
    format!(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_{table}_normalized_user_name \
         ON {table} (normalized_user_name)"
    )
}

/// Create the users table and its indexes if they do not exist yet.
pub(crate) async fn ensure_schema(pool: &SqlitePool, table: &str) -> Result<(), Error> {
    let mut tx = pool.begin().await.map_err(schema_err)?;

    for statement in [create_table_sql(table), create_name_index_sql(table)] {
        sqlx::query(&statement)
            .execute(&mut *tx)
            .await
            .map_err(schema_err)?;
    }

    tx.commit().await.map_err(schema_err)?;
    tracing::info!(table, "Users table is ready");
    Ok(())
}

fn schema_err(e: sqlx::Error) -> Error {
    tracing::error!(error = %e, "Failed to create users table");
    Error::Storage(StorageError::Schema(e.to_string()))
}
