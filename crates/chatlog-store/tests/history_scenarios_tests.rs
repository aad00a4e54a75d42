// End-to-end behaviour of the host-facing history
// Fresh start, restart, corrupt snapshot, ordering, clear, missing runtime

mod common;

use chatlog_core::{BootSource, EngineState, Role};
use chatlog_store::snapshot::import_image;
use chatlog_store::{ChatHistory, MemorySnapshotStore, StoreConfig, UNAVAILABLE_ID};
use common::memory_repo;
use std::time::Duration;

fn open_history(store: &MemorySnapshotStore, key: &str) -> ChatHistory {
    ChatHistory::new(memory_repo(store, key))
}

#[tokio::test]
async fn test_fresh_start_first_message_gets_id_one() {
    let store = MemorySnapshotStore::new();
    let history = open_history(&store, "scenario-fresh");

    let health = history.init().await;
    assert_eq!(health.state, EngineState::Ready);
    assert_eq!(health.boot_source, Some(BootSource::Fresh));

    let before = chrono::Utc::now().timestamp_millis();
    let id = history.save_message(Role::User, "Hello").await.unwrap();
    let after = chrono::Utc::now().timestamp_millis();
    assert_eq!(id, 1);

    let turns = history.get_history().await;
    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0].id, 1);
    assert_eq!(turns[0].role, Role::User);
    assert_eq!(turns[0].content, "Hello");
    assert!(turns[0].timestamp >= before && turns[0].timestamp <= after);
}

#[tokio::test]
async fn test_restart_restores_rows_without_schema_write() {
    let store = MemorySnapshotStore::new();
    let first = open_history(&store, "scenario-restart");
    first.save_message(Role::User, "Hello").await.unwrap();
    let original = first.get_history().await;
    let writes_before_restart = store.writes();

    let second = open_history(&store, "scenario-restart");
    let health = second.init().await;

    assert_eq!(health.boot_source, Some(BootSource::Restored));
    assert_eq!(second.get_history().await, original);
    assert_eq!(store.writes(), writes_before_restart);
}

#[tokio::test]
async fn test_corrupt_snapshot_recovers_to_empty_history() {
    let store = MemorySnapshotStore::new()
        .with_blob("scenario-corrupt", b"\x00\x01not sqlite at all".to_vec());
    let history = open_history(&store, "scenario-corrupt");

    let health = history.init().await;

    assert_eq!(health.state, EngineState::Ready);
    assert_eq!(health.boot_source, Some(BootSource::Recovered));
    assert!(health.reason.is_some());
    assert!(history.get_history().await.is_empty());

    let id = history.save_message(Role::Model, "usable").await.unwrap();
    assert!(id > 0);
}

#[tokio::test]
async fn test_two_appends_list_in_order() {
    let store = MemorySnapshotStore::new();
    let history = open_history(&store, "scenario-order");

    history.save_message(Role::User, "A").await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    history.save_message(Role::Model, "B").await.unwrap();

    let contents: Vec<String> = history
        .get_history()
        .await
        .into_iter()
        .map(|m| m.content)
        .collect();
    assert_eq!(contents, vec!["A", "B"]);
}

#[tokio::test]
async fn test_clear_empties_history_and_snapshot() {
    let store = MemorySnapshotStore::new();
    let history = open_history(&store, "scenario-clear");
    for i in 0..5 {
        history
            .save_message(Role::User, &format!("turn {}", i))
            .await
            .unwrap();
    }
    assert_eq!(history.get_history().await.len(), 5);

    history.clear_history().await.unwrap();

    assert!(history.get_history().await.is_empty());

    let bytes = store.peek("scenario-clear").unwrap();
    let conn = import_image("scenario-clear", &bytes).unwrap();
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 0);

    let reopened = open_history(&store, "scenario-clear");
    assert!(reopened.get_history().await.is_empty());
}

#[tokio::test]
async fn test_missing_runtime_asset_degrades() {
    let config = StoreConfig::default()
        .with_snapshot_key("scenario-degraded")
        .with_runtime_asset("/definitely/missing/sqlite3.wasm");
    let history = ChatHistory::from_config(config).unwrap();

    let health = history.init().await;
    assert_eq!(health.state, EngineState::Degraded);
    assert_eq!(
        health.reason.as_ref().map(|r| r.code()),
        Some("ERR_ENGINE_UNAVAILABLE")
    );

    assert_eq!(
        history.save_message(Role::User, "dropped").await.unwrap(),
        UNAVAILABLE_ID
    );
    assert!(history.get_history().await.is_empty());
}

#[tokio::test]
async fn test_ids_not_reused_after_clear() {
    let store = MemorySnapshotStore::new();
    let history = open_history(&store, "scenario-ids");

    history.save_message(Role::User, "one").await.unwrap();
    let second = history.save_message(Role::User, "two").await.unwrap();
    history.clear_history().await.unwrap();

    let third = history.save_message(Role::User, "three").await.unwrap();
    assert!(third > second);
}
