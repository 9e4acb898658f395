use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::time::sleep;
use tokio::time::timeout;

use crate::test_utils::enable_logger;
use crate::test_utils::identity_query;
use crate::Change;
use crate::EntryContent;
use crate::MemoryStore;
use crate::Query;
use crate::Revision;
use crate::StoreConfig;
use crate::StoreError;
use crate::VersionedStore;

#[tokio::test]
async fn test_fresh_store_resolves_init_revision_empty() {
    enable_logger();
    let store = MemoryStore::new();

    assert_eq!(store.head_revision(), Revision::INIT);
    let read = store
        .get(Revision::INIT, &identity_query("/a.txt"))
        .await
        .expect("read succeeds");
    assert!(read.is_none());
}

#[tokio::test]
async fn test_put_get_roundtrip_and_head() {
    enable_logger();
    let store = MemoryStore::new();

    let revision = store
        .put("/a.txt", EntryContent::text("a"))
        .expect("commit succeeds");
    assert_eq!(revision, Revision::new(2));
    assert_eq!(store.head_revision(), revision);

    let entry = store
        .get(revision, &identity_query("/a.txt"))
        .await
        .expect("read succeeds")
        .expect("entry present");
    assert_eq!(entry.revision(), revision);
    assert_eq!(entry.content(), &EntryContent::text("a"));

    // The previous revision still reads the old state.
    let old = store
        .get(Revision::INIT, &identity_query("/a.txt"))
        .await
        .expect("read succeeds");
    assert!(old.is_none());
}

#[tokio::test]
async fn test_read_ahead_of_head_fails_without_blocking() {
    enable_logger();
    let store = MemoryStore::new();

    let outcome = store.get(Revision::new(5), &identity_query("/a.txt")).await;
    assert!(matches!(
        outcome,
        Err(StoreError::RevisionOutOfRange { .. })
    ));
}

#[tokio::test]
async fn test_history_pruning() {
    enable_logger();
    let store = MemoryStore::with_config(StoreConfig { history_limit: 2 }).expect("valid config");

    store.put("/a.txt", EntryContent::text("a")).expect("commit"); // r2
    store.put("/a.txt", EntryContent::text("b")).expect("commit"); // r3, prunes r1

    let outcome = store.get(Revision::INIT, &identity_query("/a.txt")).await;
    assert!(matches!(outcome, Err(StoreError::RevisionPruned { .. })));

    let entry = store
        .get(Revision::new(2), &identity_query("/a.txt"))
        .await
        .expect("retained revision reads")
        .expect("entry present");
    assert_eq!(entry.content(), &EntryContent::text("a"));
}

#[tokio::test]
async fn test_await_change_resolves_immediately_for_committed_change() {
    enable_logger();
    let store = MemoryStore::new();
    let revision = store.put("/a.txt", EntryContent::text("a")).expect("commit");

    let notified = store
        .await_change(Revision::INIT, "/a.txt")
        .await
        .expect("notification");
    assert_eq!(notified, revision);
}

#[tokio::test]
async fn test_await_change_wakes_on_commit() {
    enable_logger();
    let store = Arc::new(MemoryStore::new());

    let waiter = {
        let store = store.clone();
        tokio::spawn(async move { store.await_change(Revision::INIT, "/a.txt").await })
    };
    sleep(Duration::from_millis(20)).await;

    let revision = store.put("/a.txt", EntryContent::text("a")).expect("commit");

    let notified = waiter.await.expect("task joins").expect("notification");
    assert_eq!(notified, revision);
}

#[tokio::test]
async fn test_await_change_ignores_other_paths() {
    enable_logger();
    let store = Arc::new(MemoryStore::new());
    store.put("/b.txt", EntryContent::text("b")).expect("commit");

    let pending = timeout(
        Duration::from_millis(50),
        store.await_change(Revision::INIT, "/a.txt"),
    )
    .await;
    assert!(pending.is_err(), "commit to /b.txt must not notify /a.txt");
}

#[tokio::test]
async fn test_removal_notifies_and_reads_absent() {
    enable_logger();
    let store = MemoryStore::new();
    let committed = store.put("/a.txt", EntryContent::text("a")).expect("commit");
    let removed = store.remove("/a.txt").expect("commit");

    let notified = store
        .await_change(committed, "/a.txt")
        .await
        .expect("notification");
    assert_eq!(notified, removed);

    let read = store
        .get(removed, &identity_query("/a.txt"))
        .await
        .expect("read succeeds");
    assert!(read.is_none());
}

#[tokio::test]
async fn test_await_change_over_notifies_across_pruned_gap() {
    enable_logger();
    let store = MemoryStore::with_config(StoreConfig { history_limit: 2 }).expect("valid config");
    store.put("/b.txt", EntryContent::text("b")).expect("commit"); // r2
    store.put("/b.txt", EntryContent::text("c")).expect("commit"); // r3
    store.put("/b.txt", EntryContent::text("d")).expect("commit"); // r4, retained: r3, r4

    // Commits r2 (and anything before r3) are pruned; their touched sets are
    // unknown, so the oldest retained revision is reported.
    let notified = store
        .await_change(Revision::INIT, "/a.txt")
        .await
        .expect("notification");
    assert_eq!(notified, Revision::new(3));
}

#[tokio::test]
async fn test_batch_commit_touches_all_paths() {
    enable_logger();
    let store = MemoryStore::new();
    let revision = store
        .push(vec![
            Change::upsert("/a.txt", EntryContent::text("a")),
            Change::upsert("/b.txt", EntryContent::text("b")),
        ])
        .expect("commit");

    assert_eq!(
        store.await_change(Revision::INIT, "/a.txt").await.expect("notified"),
        revision
    );
    assert_eq!(
        store.await_change(Revision::INIT, "/b.txt").await.expect("notified"),
        revision
    );
}

#[tokio::test]
async fn test_json_pointer_projection() {
    enable_logger();
    let store = MemoryStore::new();
    let revision = store
        .put(
            "/config.json",
            EntryContent::json(json!({"service": {"timeout_ms": 500}})),
        )
        .expect("commit");

    let query = Query::json_pointer("/config.json", "/service/timeout_ms").expect("valid query");
    let entry = store
        .get(revision, &query)
        .await
        .expect("read succeeds")
        .expect("entry present");
    assert_eq!(entry.content(), &EntryContent::json(json!(500)));
}

#[tokio::test]
async fn test_json_pointer_on_text_content_fails_query_evaluation() {
    enable_logger();
    let store = MemoryStore::new();
    let revision = store.put("/a.txt", EntryContent::text("a")).expect("commit");

    let query = Query::json_pointer("/a.txt", "/field").expect("valid query");
    let outcome = store.get(revision, &query).await;
    assert!(matches!(outcome, Err(StoreError::QueryEvaluation { .. })));
}

#[tokio::test]
async fn test_exists_does_not_project_content() {
    enable_logger();
    let store = MemoryStore::new();
    let revision = store.put("/a.txt", EntryContent::text("a")).expect("commit");

    assert!(store.exists(revision, "/a.txt").await.expect("exists"));
    assert!(!store.exists(revision, "/b.txt").await.expect("exists"));
}
