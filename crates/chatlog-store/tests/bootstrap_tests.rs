// Test suite for repository initialization
// Single-flight init, restart ledger, degraded paths, recovery logging

mod common;

use chatlog_core::logging_facility::init_test_capture;
use chatlog_core::{BootSource, EngineState, ExErrorKind, Role};
use chatlog_store::migrations::applied_migrations;
use chatlog_store::snapshot::import_image;
use chatlog_store::{MemorySnapshotStore, MessageRepository, StoreConfig};
use common::{memory_repo, CountingLoader, FlakyStore, UnreadableStore};
use std::sync::Arc;

#[tokio::test]
async fn test_init_twice_creates_schema_once() {
    let store = MemorySnapshotStore::new();
    let repo = memory_repo(&store, "init-twice");

    repo.init().await.unwrap();
    assert_eq!(store.writes(), 1);
    repo.append(Role::User, "kept").await.unwrap();

    repo.init().await.unwrap();

    assert_eq!(store.writes(), 2);
    assert_eq!(repo.list().await.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_init_bootstraps_once() {
    let store = MemorySnapshotStore::new();
    let loader = CountingLoader::default();
    let repo = Arc::new(MessageRepository::new(
        StoreConfig::default().with_snapshot_key("init-concurrent"),
        Arc::new(loader.clone()),
        Arc::new(store.clone()),
    ));

    let calls = (0..16).map(|_| {
        let repo = repo.clone();
        async move { repo.init().await }
    });
    let results = futures::future::join_all(calls).await;

    assert!(results.iter().all(|r| r.is_ok()));
    assert_eq!(loader.loads(), 1);
    assert_eq!(store.writes(), 1);
}

#[tokio::test]
async fn test_health_reports_initializing_while_bootstrap_runs() {
    let loader = CountingLoader::default();
    let repo = Arc::new(MessageRepository::new(
        StoreConfig::default().with_snapshot_key("init-progress"),
        Arc::new(loader),
        Arc::new(MemorySnapshotStore::new()),
    ));

    let background = tokio::spawn({
        let repo = repo.clone();
        async move { repo.init().await }
    });
    tokio::task::yield_now().await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    assert_eq!(repo.health().state, EngineState::Initializing);

    background.await.unwrap().unwrap();
    assert_eq!(repo.health().state, EngineState::Ready);
}

#[tokio::test]
async fn test_abandoned_init_reports_uninitialized() {
    let loader = CountingLoader::default();
    let repo = Arc::new(MessageRepository::new(
        StoreConfig::default().with_snapshot_key("init-abandoned"),
        Arc::new(loader.clone()),
        Arc::new(MemorySnapshotStore::new()),
    ));

    let background = tokio::spawn({
        let repo = repo.clone();
        async move { repo.init().await }
    });
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    assert_eq!(repo.health().state, EngineState::Initializing);

    background.abort();
    assert!(background.await.unwrap_err().is_cancelled());

    assert_eq!(repo.health().state, EngineState::Uninitialized);

    repo.init().await.unwrap();
    assert_eq!(repo.health().state, EngineState::Ready);
    assert_eq!(loader.loads(), 2);
}

#[tokio::test]
async fn test_restart_keeps_migration_ledger() {
    let store = MemorySnapshotStore::new();
    let first = memory_repo(&store, "init-ledger");
    first.append(Role::User, "hi").await.unwrap();

    let ledger_before = {
        let conn = import_image("init-ledger", &store.peek("init-ledger").unwrap()).unwrap();
        applied_migrations(&conn).unwrap()
    };

    let second = memory_repo(&store, "init-ledger");
    second.init().await.unwrap();
    second.append(Role::Model, "again").await.unwrap();

    let conn = import_image("init-ledger", &store.peek("init-ledger").unwrap()).unwrap();
    let ledger_after = applied_migrations(&conn).unwrap();

    assert_eq!(ledger_after.len(), 1);
    assert_eq!(ledger_after[0].applied_at, ledger_before[0].applied_at);
    assert_eq!(ledger_after[0].checksum, ledger_before[0].checksum);
}

#[tokio::test]
async fn test_unreadable_store_degrades() {
    let store = UnreadableStore::default();
    let repo = MessageRepository::with_store(
        StoreConfig::default().with_snapshot_key("init-unreadable"),
        Arc::new(store.clone()),
    );

    let err = repo.init().await.unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::PersistenceRead);
    assert_eq!(repo.health().state, EngineState::Degraded);
    assert_eq!(repo.append(Role::User, "x").await.unwrap(), None);
    assert_eq!(store.inner.writes(), 0);
}

#[tokio::test]
async fn test_schema_persist_failure_degrades() {
    let store = FlakyStore::new(MemorySnapshotStore::new());
    store.reject_writes(true);
    let repo = MessageRepository::with_store(
        StoreConfig::default().with_snapshot_key("init-unwritable"),
        Arc::new(store.clone()),
    );

    let err = repo.init().await.unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::PersistenceWrite);

    store.reject_writes(false);
    repo.init().await.unwrap_err();
    assert!(repo.list().await.is_empty());
}

#[tokio::test]
async fn test_degraded_state_is_permanent() {
    let repo = MessageRepository::with_store(
        StoreConfig::default()
            .with_snapshot_key("init-permanent")
            .with_runtime_asset("/missing/engine.wasm"),
        Arc::new(MemorySnapshotStore::new()),
    );

    repo.init().await.unwrap_err();
    repo.init().await.unwrap_err();

    let health = repo.health();
    assert_eq!(health.state, EngineState::Degraded);
    assert_eq!(
        health.reason.map(|r| r.kind()),
        Some(ExErrorKind::EngineUnavailable)
    );
    repo.clear().await.unwrap();
    repo.flush().await.unwrap();
}

#[tokio::test]
async fn test_corrupt_snapshot_is_logged() {
    let capture = init_test_capture();
    let store = MemorySnapshotStore::new().with_blob("init-corrupt-log", b"junk".to_vec());
    let repo = memory_repo(&store, "init-corrupt-log");

    repo.init().await.unwrap();

    let health = repo.health();
    assert_eq!(health.boot_source, Some(BootSource::Recovered));
    assert_eq!(
        health.reason.map(|r| r.kind()),
        Some(ExErrorKind::CorruptSnapshot)
    );

    let events = capture.events_for_key("init-corrupt-log");
    let recovery = events
        .iter()
        .find(|e| e.op.as_deref() == Some("restore_snapshot"))
        .expect("recovery event");
    assert_eq!(recovery.level, tracing::Level::WARN);
    assert_eq!(recovery.field("err.code"), Some("ERR_CORRUPT_SNAPSHOT"));

    assert!(events
        .iter()
        .any(|e| e.op.as_deref() == Some("bootstrap") && e.event.as_deref() == Some("end")));
}

#[tokio::test]
async fn test_snapshot_without_messages_table_recovers() {
    let foreign = rusqlite::Connection::open_in_memory().unwrap();
    foreign
        .execute("CREATE TABLE notes (body TEXT)", [])
        .unwrap();
    let bytes = chatlog_store::snapshot::export_image(&foreign).unwrap();

    let store = MemorySnapshotStore::new().with_blob("init-foreign", bytes);
    let repo = memory_repo(&store, "init-foreign");

    repo.init().await.unwrap();

    assert_eq!(repo.health().boot_source, Some(BootSource::Recovered));
    assert!(repo.append(Role::User, "fits").await.unwrap().is_some());
}

#[tokio::test]
async fn test_snapshot_with_outdated_messages_columns_recovers() {
    let outdated = rusqlite::Connection::open_in_memory().unwrap();
    outdated
        .execute_batch(
            "CREATE TABLE messages (id INTEGER PRIMARY KEY, role TEXT, text TEXT, timestamp INTEGER);
             INSERT INTO messages (role, text, timestamp) VALUES ('user', 'old layout', 1);",
        )
        .unwrap();
    let bytes = chatlog_store::snapshot::export_image(&outdated).unwrap();

    let store = MemorySnapshotStore::new().with_blob("init-outdated", bytes);
    let repo = memory_repo(&store, "init-outdated");

    repo.init().await.unwrap();

    let health = repo.health();
    assert_eq!(health.boot_source, Some(BootSource::Recovered));
    assert_eq!(
        health.reason.map(|r| r.kind()),
        Some(ExErrorKind::CorruptSnapshot)
    );

    let id = repo.append(Role::User, "new layout").await.unwrap();
    assert!(id.is_some());
    let listed = repo.list().await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].content, "new layout");

    let restarted = memory_repo(&store, "init-outdated");
    restarted.init().await.unwrap();
    assert_eq!(restarted.health().boot_source, Some(BootSource::Restored));
    assert_eq!(restarted.list().await.len(), 1);
}
