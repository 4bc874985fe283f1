//! Behaviour every users-table adapter must share, run against each backend.
#![allow(dead_code)]

use tollgate::{CancellationToken, User, UserId, UserRepository, UserStore};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub async fn create_then_find_by_id<R: UserRepository>(store: &UserStore<R>) {
    let cancel = CancellationToken::new();
    let mut user = User::new(UserId::new("u1"), "alice");
    store.create(&mut user, &cancel).await.unwrap();

    let found = store.find_by_id("u1", &cancel).await.unwrap().unwrap();
    assert_eq!(found.id(), &UserId::new("u1"));
    assert_eq!(found.user_name(), "alice");
    assert_eq!(found.normalized_user_name(), Some("ALICE"));
    assert_eq!(found.partition_key(), "u1");
    assert_eq!(found.row_key(), "u1");
    assert!(!found.etag().is_any());
    assert_eq!(found.etag(), user.etag());
}

pub async fn find_missing_is_none<R: UserRepository>(store: &UserStore<R>) {
    let cancel = CancellationToken::new();
    assert!(store.find_by_id("nobody", &cancel).await.unwrap().is_none());
    assert!(store.find_by_name("NOBODY", &cancel).await.unwrap().is_none());
}

pub async fn double_create_is_duplicate_key<R: UserRepository>(store: &UserStore<R>) {
    let cancel = CancellationToken::new();
    let mut first = User::new(UserId::new("dup"), "first");
    store.create(&mut first, &cancel).await.unwrap();

    let mut second = User::new(UserId::new("dup"), "second");
    let err = store.create(&mut second, &cancel).await.unwrap_err();
    assert!(err.is_duplicate_key(), "unexpected error: {err}");

    let stored = store.find_by_id("dup", &cancel).await.unwrap().unwrap();
    assert_eq!(stored.user_name(), "first");
}

pub async fn duplicate_name_is_duplicate_key<R: UserRepository>(store: &UserStore<R>) {
    let cancel = CancellationToken::new();
    let mut alice = User::new(UserId::new("a1"), "alice");
    store.create(&mut alice, &cancel).await.unwrap();

    let mut shouting = User::new(UserId::new("a2"), "ALICE");
    let err = store.create(&mut shouting, &cancel).await.unwrap_err();
    assert!(err.is_duplicate_key(), "unexpected error: {err}");
    assert!(store.find_by_id("a2", &cancel).await.unwrap().is_none());
}

pub async fn delete_then_find_is_none<R: UserRepository>(store: &UserStore<R>) {
    let cancel = CancellationToken::new();
    let mut user = User::new(UserId::new("gone"), "gone");
    store.create(&mut user, &cancel).await.unwrap();

    store.delete(&user, &cancel).await.unwrap();
    assert!(store.find_by_id("gone", &cancel).await.unwrap().is_none());
    assert!(store.find_by_name("GONE", &cancel).await.unwrap().is_none());

    // The name is free again
    let mut again = User::new(UserId::new("gone2"), "gone");
    store.create(&mut again, &cancel).await.unwrap();
}

pub async fn rename_and_update<R: UserRepository>(store: &UserStore<R>) {
    let cancel = CancellationToken::new();
    let mut user = User::new(UserId::new("r1"), "bob");
    store.create(&mut user, &cancel).await.unwrap();
    let created_tag = user.etag().clone();

    store.set_user_name(&mut user, "Alice").unwrap();
    assert_eq!(user.normalized_user_name(), Some("ALICE"));
    store.update(&mut user, &cancel).await.unwrap();
    assert_ne!(user.etag(), &created_tag);

    let found = store.find_by_id("r1", &cancel).await.unwrap().unwrap();
    assert_eq!(found.user_name(), "Alice");
    assert_eq!(found.etag(), user.etag());

    assert!(store.find_by_name("BOB", &cancel).await.unwrap().is_none());
    let by_name = store.find_by_name("ALICE", &cancel).await.unwrap().unwrap();
    assert_eq!(by_name.id().as_str(), "r1");
}

pub async fn update_missing_is_not_found<R: UserRepository>(store: &UserStore<R>) {
    let cancel = CancellationToken::new();
    let mut ghost = User::new(UserId::new("ghost"), "ghost");
    let err = store.update(&mut ghost, &cancel).await.unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {err}");
}

pub async fn find_by_name_matches_stored_value<R: UserRepository>(store: &UserStore<R>) {
    let cancel = CancellationToken::new();
    let mut user = User::new(UserId::new("u1"), "alice");
    store.create(&mut user, &cancel).await.unwrap();

    let found = store.find_by_name("ALICE", &cancel).await.unwrap().unwrap();
    assert_eq!(found.id().as_str(), "u1");
    assert!(store.find_by_name("alice", &cancel).await.unwrap().is_none());

    for raw in ["alice", "  Alice "] {
        let key = store.normalize_name(raw);
        let found = store.find_by_name(&key, &cancel).await.unwrap().unwrap();
        assert_eq!(found.id().as_str(), "u1", "raw name {raw:?}");
    }
}

pub async fn find_by_explicit_normalized_name<R: UserRepository>(store: &UserStore<R>) {
    let cancel = CancellationToken::new();
    let mut user = User::new(UserId::new("e1"), "alice");
    store
        .set_normalized_user_name(&mut user, "alice@example.com")
        .unwrap();
    store.create(&mut user, &cancel).await.unwrap();

    let found = store
        .find_by_name("alice@example.com", &cancel)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id().as_str(), "e1");
    assert_eq!(found.normalized_user_name(), Some("alice@example.com"));
}

pub async fn stale_tag_conflicts<R: UserRepository>(store: &UserStore<R>) {
    let cancel = CancellationToken::new();
    let mut user = User::new(UserId::new("c1"), "carol");
    store.create(&mut user, &cancel).await.unwrap();
    let mut stale = user.clone();

    store.set_user_name(&mut user, "caroline").unwrap();
    store.update(&mut user, &cancel).await.unwrap();

    store.set_user_name(&mut stale, "carla").unwrap();
    let err = store.update(&mut stale, &cancel).await.unwrap_err();
    assert!(err.is_concurrency_conflict(), "unexpected error: {err}");

    let err = store.delete(&stale, &cancel).await.unwrap_err();
    assert!(err.is_concurrency_conflict(), "unexpected error: {err}");

    let stored = store.find_by_id("c1", &cancel).await.unwrap().unwrap();
    assert_eq!(stored.user_name(), "caroline");
}

pub async fn cancelled_token_does_not_mutate<R: UserRepository>(store: &UserStore<R>) {
    let cancelled = CancellationToken::new();
    cancelled.cancel();
    let live = CancellationToken::new();

    let mut user = User::new(UserId::new("x1"), "xavier");
    let err = store.create(&mut user, &cancelled).await.unwrap_err();
    assert!(err.is_cancelled());
    assert!(store.find_by_id("x1", &live).await.unwrap().is_none());

    store.create(&mut user, &live).await.unwrap();
    let err = store.delete(&user, &cancelled).await.unwrap_err();
    assert!(err.is_cancelled());
    assert!(store.find_by_id("x1", &live).await.unwrap().is_some());

    let err = store.find_by_id("x1", &cancelled).await.unwrap_err();
    assert!(err.is_cancelled());
}

pub async fn validation_precedes_io<R: UserRepository>(store: &UserStore<R>) {
    let cancelled = CancellationToken::new();
    cancelled.cancel();

    let err = store.find_by_id("  ", &cancelled).await.unwrap_err();
    assert!(err.is_validation_error());

    let err = store.find_by_name("", &cancelled).await.unwrap_err();
    assert!(err.is_validation_error());

    let mut blank_name = User::new(UserId::new("v1"), " ");
    let err = store.create(&mut blank_name, &cancelled).await.unwrap_err();
    assert!(err.is_validation_error());

    let mut user = User::new(UserId::new("v1"), "valid");
    assert!(store.set_user_name(&mut user, "").unwrap_err().is_validation_error());
    assert_eq!(user.user_name(), "valid");
}

pub async fn strict_delete_of_missing_user<R: UserRepository>(store: &UserStore<R>) {
    let cancel = CancellationToken::new();
    let ghost = User::new(UserId::new("ghost"), "ghost");
    let err = store.delete(&ghost, &cancel).await.unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {err}");
}

pub async fn idempotent_delete_of_missing_user<R: UserRepository>(store: &UserStore<R>) {
    let cancel = CancellationToken::new();
    let ghost = User::new(UserId::new("ghost"), "ghost");
    store.delete(&ghost, &cancel).await.unwrap();
    store.delete(&ghost, &cancel).await.unwrap();
}

pub async fn concurrent_creates_with_same_name<R: UserRepository>(store: &UserStore<R>) {
    let mut handles = Vec::new();
    for i in 0..8 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            let cancel = CancellationToken::new();
            let mut user = User::new(UserId::new(&format!("racer{i}")), "racer");
            store.create(&mut user, &cancel).await
        }));
    }

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => created += 1,
            Err(e) => assert!(e.is_duplicate_key(), "unexpected error: {e}"),
        }
    }
    assert_eq!(created, 1);
}
