//! # Tollgate
//!
//! Tollgate is a pluggable user store for identity frameworks. The identity layer talks to a
//! [`UserStore`], which validates input and delegates to a users-table adapter implementing
//! [`UserRepository`]. Adapters decide where users live:
//!
//! - [`MemoryUserRepository`] keeps users in process, for tests and demos
//! - `SqliteUserTable` (feature `sqlite`, on by default) keeps them in a SQLite table with
//!   table-storage style keys and concurrency tags
//!
//! Account emails go through the [`EmailSender`] boundary from `tollgate-mailer`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use tollgate::{CancellationToken, User, UserId, memory_user_store};
//!
//! # async fn run() -> Result<(), tollgate::Error> {
//! let store = memory_user_store();
//! let cancel = CancellationToken::new();
//!
//! let mut user = User::new(UserId::new_random(), "alice");
//! store.create(&mut user, &cancel).await?;
//!
//! let found = store.find_by_name("ALICE", &cancel).await?;
//! assert!(found.is_some());
//! # Ok(())
//! # }
//! ```
use std::sync::Arc;

/// Re-export core types from tollgate_core
pub use tollgate_core::{
    CancellationToken, DeletePolicy, ETag, Error, LookupNormalizer, MemoryUserRepository,
    UpperInvariantNormalizer, User, UserBuilder, UserId, UserRepository, UserStore,
    error::{StorageError, ValidationError},
};

/// Re-export the email boundary
pub use tollgate_mailer::{EmailSender, MailerConfig, MailerError, MailerService};

#[cfg(feature = "sqlite")]
pub use tollgate_storage_sqlite::{SqliteStorageConfig, SqliteUserTable};

/// Errors surfaced by the `tollgate` binary and the wiring helpers.
#[derive(Debug, thiserror::Error)]
pub enum TollgateError {
    #[error(transparent)]
    Store(#[from] Error),
    #[error(transparent)]
    Mailer(#[from] MailerError),
}

/// A store over a fresh in-memory repository with the default delete policy.
pub fn memory_user_store() -> UserStore<MemoryUserRepository> {
    UserStore::new(Arc::new(MemoryUserRepository::new()))
}

/// Connect to the configured SQLite database, create the users table if needed, and wrap it in
/// a store.
#[cfg(feature = "sqlite")]
pub async fn sqlite_user_store(
    config: &SqliteStorageConfig,
) -> Result<UserStore<SqliteUserTable>, Error> {
    let table = SqliteUserTable::connect(config).await?;
    table.migrate().await?;

    tracing::debug!(table = %table.table_name(), "SQLite user store ready");
    Ok(UserStore::new(Arc::new(table)))
}

/// Run `operation`, then dispose the store.
///
/// The operation's error wins over a disposal failure; disposal errors surface only when the
/// operation itself succeeded.
pub async fn dispose_after<R, T, F>(store: &UserStore<R>, operation: F) -> Result<T, Error>
where
    R: UserRepository,
    F: std::future::Future<Output = Result<T, Error>>,
{
    let result = operation.await;
    let disposed = store.dispose().await;

    match (result, disposed) {
        (Ok(value), disposed) => disposed.map(|()| value),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(dispose_err)) => {
            tracing::warn!(error = %dispose_err, "Failed to dispose user store after an error");
            Err(e)
        }
    }
}

/// Build an [`EmailSender`] from mailer configuration.
pub fn email_sender(
    config: &MailerConfig,
) -> Result<MailerService<Box<dyn tollgate_mailer::Mailer>>, MailerError> {
    let transport = config.build_transport()?;
    Ok(MailerService::new(transport, config.get_from_address()))
}
