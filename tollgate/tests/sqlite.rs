#![cfg(feature = "sqlite")]

mod common;

use tollgate::{
    CancellationToken, DeletePolicy, SqliteStorageConfig, SqliteUserTable, User, UserId,
    UserStore, sqlite_user_store,
};

async fn store() -> UserStore<SqliteUserTable> {
    sqlite_user_store(&SqliteStorageConfig::default())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_sqlite_create_then_find_by_id() {
    common::init_tracing();
    common::create_then_find_by_id(&store().await).await;
}

#[tokio::test]
async fn test_sqlite_find_missing_user() {
    common::find_missing_is_none(&store().await).await;
}

#[tokio::test]
async fn test_sqlite_double_create() {
    common::double_create_is_duplicate_key(&store().await).await;
}

#[tokio::test]
async fn test_sqlite_duplicate_normalized_name() {
    common::duplicate_name_is_duplicate_key(&store().await).await;
}

#[tokio::test]
async fn test_sqlite_delete_then_find() {
    common::delete_then_find_is_none(&store().await).await;
}

#[tokio::test]
async fn test_sqlite_rename_and_update() {
    common::rename_and_update(&store().await).await;
}

#[tokio::test]
async fn test_sqlite_update_missing_user() {
    common::update_missing_is_not_found(&store().await).await;
}

#[tokio::test]
async fn test_sqlite_find_by_name_matches_stored_value() {
    common::find_by_name_matches_stored_value(&store().await).await;
}

#[tokio::test]
async fn test_sqlite_find_by_explicit_normalized_name() {
    common::find_by_explicit_normalized_name(&store().await).await;
}

#[tokio::test]
async fn test_sqlite_stale_tag_conflicts() {
    common::stale_tag_conflicts(&store().await).await;
}

#[tokio::test]
async fn test_sqlite_cancelled_token() {
    common::cancelled_token_does_not_mutate(&store().await).await;
}

#[tokio::test]
async fn test_sqlite_validation_precedes_io() {
    common::validation_precedes_io(&store().await).await;
}

#[tokio::test]
async fn test_sqlite_strict_delete_of_missing_user() {
    common::strict_delete_of_missing_user(&store().await).await;
}

#[tokio::test]
async fn test_sqlite_idempotent_delete_of_missing_user() {
    let config = SqliteStorageConfig::default().with_delete_policy(DeletePolicy::Idempotent);
    let store = sqlite_user_store(&config).await.unwrap();
    common::idempotent_delete_of_missing_user(&store).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_sqlite_concurrent_creates_with_same_name() {
    common::concurrent_creates_with_same_name(&store().await).await;
}

#[tokio::test]
async fn test_sqlite_file_database_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!(
        "sqlite://{}?mode=rwc",
        dir.path().join("tollgate.db").display()
    );
    let config = SqliteStorageConfig::new(url).with_table_name("accounts");
    let cancel = CancellationToken::new();

    let store = sqlite_user_store(&config).await.unwrap();
    let mut user = User::new(UserId::new("p1"), "persisted");
    store.create(&mut user, &cancel).await.unwrap();
    store.dispose().await.unwrap();

    let err = store.find_by_id("p1", &cancel).await.unwrap_err();
    assert!(err.is_storage_error());

    let reopened = sqlite_user_store(&config).await.unwrap();
    let found = reopened.find_by_id("p1", &cancel).await.unwrap().unwrap();
    assert_eq!(found.user_name(), "persisted");
    assert_eq!(found.etag(), user.etag());
    assert_eq!(reopened.repository().table_name(), "accounts");
}

#[tokio::test]
async fn test_sqlite_rejects_bad_table_name() {
    let config = SqliteStorageConfig::default().with_table_name("users; DROP TABLE users");
    let err = sqlite_user_store(&config).await.err().unwrap();
    assert!(err.is_validation_error());
}
