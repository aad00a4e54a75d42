//! Append / list / clear over the snapshotted engine
//!
//! Write path: mutate the engine, then persist a full image under the same
//! lock, so snapshot writes reach the store in mutation order. When the store
//! rejects a write the mutation is undone in the engine before the error is
//! returned, keeping `list()` consistent with what callers were told.

use crate::bootstrap::{bootstrap, BootOutcome};
use crate::config::StoreConfig;
use crate::engine::{EngineLoader, SqliteRuntimeLoader};
use crate::errors::{from_rusqlite, Result};
use crate::snapshot::{
    export_image, persist_snapshot, restore_image, FsSnapshotStore, SnapshotStore,
};
use chatlog_core::errors::{ExError, ExErrorKind};
use chatlog_core::model::{BootSource, ChatMessage, EngineHealth, Role};
use chatlog_core::{log_op_end, log_op_error, log_op_start};
use chatlog_core_types::Sensitive;
use rusqlite::{params, Connection};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, OnceCell};

const INSERT_MESSAGE: &str = "INSERT INTO messages (role, content, timestamp) VALUES (?1, ?2, ?3)";
const DELETE_MESSAGE: &str = "DELETE FROM messages WHERE id = ?1";
const DELETE_ALL: &str = "DELETE FROM messages";
const SELECT_ALL: &str =
    "SELECT id, role, content, timestamp FROM messages ORDER BY timestamp ASC, id ASC";

/// Engine plus the count of mutations not yet in the snapshot store
struct Session {
    conn: Connection,
    pending: u32,
}

/// Terminal result of initialization, fixed for the repository's lifetime
enum EngineSlot {
    Ready {
        session: Mutex<Session>,
        source: BootSource,
        recovered_from: Option<ExError>,
    },
    Degraded(ExError),
}

impl From<BootOutcome> for EngineSlot {
    fn from(outcome: BootOutcome) -> Self {
        match outcome {
            BootOutcome::Ready {
                conn,
                source,
                recovered_from,
            } => EngineSlot::Ready {
                session: Mutex::new(Session { conn, pending: 0 }),
                source,
                recovered_from,
            },
            BootOutcome::Degraded(reason) => EngineSlot::Degraded(reason),
        }
    }
}

/// Raises the initializing flag for one bootstrap attempt
///
/// Dropped without `complete()`, i.e. the attempt was cancelled, it lowers
/// the flag again.
struct InitInFlight<'a> {
    flag: &'a AtomicBool,
    completed: bool,
}

impl<'a> InitInFlight<'a> {
    fn mark(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self {
            flag,
            completed: false,
        }
    }

    fn complete(&mut self) {
        self.completed = true;
    }
}

impl Drop for InitInFlight<'_> {
    fn drop(&mut self) {
        if !self.completed {
            self.flag.store(false, Ordering::Release);
        }
    }
}

/// Conversation store bound to one snapshot key
///
/// Every operation initializes lazily. Initialization is single-flight:
/// concurrent first callers share one bootstrap, and its outcome (ready or
/// degraded) is permanent.
///
/// # Example
///
/// ```
/// use chatlog_store::{MessageRepository, MemorySnapshotStore, StoreConfig};
/// use chatlog_core::Role;
/// use std::sync::Arc;
///
/// # tokio_test_block_on(async {
/// let repo = MessageRepository::with_store(
///     StoreConfig::default(),
///     Arc::new(MemorySnapshotStore::new()),
/// );
/// let id = repo.append(Role::User, "hello").await.unwrap();
/// assert!(id.is_some());
/// assert_eq!(repo.list().await.len(), 1);
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread()
/// #         .enable_all()
/// #         .build()
/// #         .unwrap()
/// #         .block_on(f)
/// # }
/// ```
pub struct MessageRepository {
    config: StoreConfig,
    loader: Arc<dyn EngineLoader>,
    store: Arc<dyn SnapshotStore>,
    engine: OnceCell<EngineSlot>,
    initializing: AtomicBool,
}

impl MessageRepository {
    pub fn new(
        config: StoreConfig,
        loader: Arc<dyn EngineLoader>,
        store: Arc<dyn SnapshotStore>,
    ) -> Self {
        Self {
            config,
            loader,
            store,
            engine: OnceCell::new(),
            initializing: AtomicBool::new(false),
        }
    }

    /// Repository using the default runtime loader for `config.runtime_asset`
    pub fn with_store(config: StoreConfig, store: Arc<dyn SnapshotStore>) -> Self {
        let loader = Arc::new(SqliteRuntimeLoader::new(config.runtime_asset.clone()));
        Self::new(config, loader, store)
    }

    /// Repository over a filesystem store rooted at `config.snapshot_dir`
    ///
    /// # Errors
    ///
    /// `InvalidConfig` when the configuration does not validate or names no
    /// snapshot directory.
    pub fn open(config: StoreConfig) -> Result<Self> {
        config.validate()?;
        let root = config.snapshot_dir.clone().ok_or_else(|| {
            ExError::new(ExErrorKind::InvalidConfig)
                .with_op("open_repository")
                .with_message("snapshot_dir is required for a filesystem store")
        })?;
        Ok(Self::with_store(config, Arc::new(FsSnapshotStore::new(root))))
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn key(&self) -> &str {
        &self.config.snapshot_key
    }

    async fn slot(&self) -> &EngineSlot {
        self.engine
            .get_or_init(|| async move {
                let mut in_flight = InitInFlight::mark(&self.initializing);
                let outcome =
                    bootstrap(self.loader.as_ref(), self.store.as_ref(), self.key()).await;
                in_flight.complete();
                EngineSlot::from(outcome)
            })
            .await
    }

    /// Initialize the engine if no caller has yet
    ///
    /// Safe to call any number of times from any number of tasks; only the
    /// first performs work.
    ///
    /// # Errors
    ///
    /// The degradation reason when the engine could not be made ready. The
    /// repository stays usable: reads return empty and appends return `None`.
    pub async fn init(&self) -> Result<()> {
        match self.slot().await {
            EngineSlot::Ready { .. } => Ok(()),
            EngineSlot::Degraded(reason) => Err(reason.clone()),
        }
    }

    /// Current lifecycle state, without waiting on initialization
    pub fn health(&self) -> EngineHealth {
        match self.engine.get() {
            Some(EngineSlot::Ready {
                source,
                recovered_from,
                ..
            }) => EngineHealth::ready(*source, recovered_from.clone()),
            Some(EngineSlot::Degraded(reason)) => EngineHealth::degraded(reason.clone()),
            None if self.initializing.load(Ordering::Acquire) => EngineHealth::initializing(),
            None => EngineHealth::uninitialized(),
        }
    }

    /// Store one turn and return its id
    ///
    /// Returns `Ok(None)` when the engine is degraded. Under the write-through
    /// cadence a returned id means the row is already in the snapshot store.
    ///
    /// # Errors
    ///
    /// - `StatementExecution`: the insert failed; nothing changed
    /// - `PersistenceWrite`: the snapshot write failed; the row was removed
    pub async fn append(&self, role: Role, content: &str) -> Result<Option<i64>> {
        let EngineSlot::Ready { session, .. } = self.slot().await else {
            tracing::debug!(snapshot_key = self.key(), "Append skipped, engine degraded");
            return Ok(None);
        };

        let start = Instant::now();
        let body = Sensitive::new(content);
        log_op_start!(
            "append",
            snapshot_key = self.key(),
            role = role.as_str(),
            content_len = body.len()
        );

        let mut session = session.lock().await;
        let timestamp = chrono::Utc::now().timestamp_millis();

        let id = match insert_message(&session.conn, role, body.expose(), timestamp) {
            Ok(id) => id,
            Err(e) => {
                log_op_error!(
                    "append",
                    e.clone(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    snapshot_key = self.key()
                );
                return Err(e);
            }
        };
        session.pending = session.pending.saturating_add(1);

        if self.config.persist.is_due(session.pending) {
            if let Err(e) = self.persist(&mut session).await {
                match delete_message(&session.conn, id) {
                    Ok(()) => session.pending = session.pending.saturating_sub(1),
                    Err(undo) => tracing::error!(
                        snapshot_key = self.key(),
                        message_id = id,
                        error = %undo,
                        "Could not remove row after failed persist"
                    ),
                }
                log_op_error!(
                    "append",
                    e.clone(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    snapshot_key = self.key(),
                    message_id = id
                );
                return Err(e);
            }
        }

        log_op_end!(
            "append",
            duration_ms = start.elapsed().as_millis() as u64,
            snapshot_key = self.key(),
            message_id = id
        );
        Ok(Some(id))
    }

    /// Every stored turn, oldest first
    ///
    /// Never fails: a degraded engine or a failing query yields an empty list,
    /// and rows with an unrecognized role are skipped.
    pub async fn list(&self) -> Vec<ChatMessage> {
        let EngineSlot::Ready { session, .. } = self.slot().await else {
            return Vec::new();
        };

        let session = session.lock().await;
        match select_messages(&session.conn) {
            Ok(messages) => {
                tracing::debug!(
                    snapshot_key = self.key(),
                    row_count = messages.len(),
                    "Listed messages"
                );
                messages
            }
            Err(e) => {
                tracing::warn!(
                    op = "list",
                    snapshot_key = self.key(),
                    err.code = e.code(),
                    error = %e,
                    "Listing failed, returning empty history"
                );
                Vec::new()
            }
        }
    }

    /// Delete every turn and persist the empty table
    ///
    /// A no-op when the engine is degraded. Always persists, whatever the
    /// cadence.
    ///
    /// # Errors
    ///
    /// - `StatementExecution`: the delete failed; nothing changed
    /// - `PersistenceWrite`: the snapshot write failed; the rows were restored
    pub async fn clear(&self) -> Result<()> {
        let EngineSlot::Ready { session, .. } = self.slot().await else {
            return Ok(());
        };

        let start = Instant::now();
        log_op_start!("clear", snapshot_key = self.key());

        let mut session = session.lock().await;
        let result = self.clear_locked(&mut session).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(removed) => {
                log_op_end!(
                    "clear",
                    duration_ms = duration_ms,
                    snapshot_key = self.key(),
                    row_count = removed
                );
                Ok(())
            }
            Err(e) => {
                log_op_error!(
                    "clear",
                    e.clone(),
                    duration_ms = duration_ms,
                    snapshot_key = self.key()
                );
                Err(e)
            }
        }
    }

    async fn clear_locked(&self, session: &mut Session) -> Result<usize> {
        let before = export_image(&session.conn)?;
        let removed = session
            .conn
            .execute(DELETE_ALL, [])
            .map_err(|e| from_rusqlite(e).with_op("clear"))?;

        if let Err(e) = self.persist(session).await {
            if let Err(undo) = restore_image(&mut session.conn, &before) {
                tracing::error!(
                    snapshot_key = self.key(),
                    error = %undo,
                    "Could not restore rows after failed persist"
                );
            }
            return Err(e);
        }

        Ok(removed)
    }

    /// Persist outstanding mutations now
    ///
    /// Only does work under a batched cadence with pending appends.
    ///
    /// # Errors
    ///
    /// `PersistenceWrite` when the store rejects the image; the mutations stay
    /// pending and the next flush retries them.
    pub async fn flush(&self) -> Result<()> {
        let EngineSlot::Ready { session, .. } = self.slot().await else {
            return Ok(());
        };

        let mut session = session.lock().await;
        if session.pending == 0 {
            return Ok(());
        }
        self.persist(&mut session).await
    }

    async fn persist(&self, session: &mut Session) -> Result<()> {
        persist_snapshot(&mut session.conn, self.store.as_ref(), self.key()).await?;
        session.pending = 0;
        Ok(())
    }
}

fn insert_message(conn: &Connection, role: Role, content: &str, timestamp: i64) -> Result<i64> {
    let mut stmt = conn
        .prepare(INSERT_MESSAGE)
        .map_err(|e| from_rusqlite(e).with_op("append"))?;
    stmt.execute(params![role.as_str(), content, timestamp])
        .map_err(|e| from_rusqlite(e).with_op("append"))?;
    Ok(conn.last_insert_rowid())
}

fn delete_message(conn: &Connection, id: i64) -> Result<()> {
    conn.execute(DELETE_MESSAGE, [id])
        .map_err(|e| from_rusqlite(e).with_op("append"))?;
    Ok(())
}

fn select_messages(conn: &Connection) -> Result<Vec<ChatMessage>> {
    let mut stmt = conn
        .prepare(SELECT_ALL)
        .map_err(|e| from_rusqlite(e).with_op("list"))?;

    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
            ))
        })
        .map_err(|e| from_rusqlite(e).with_op("list"))?;

    let mut messages = Vec::new();
    for row in rows {
        let (id, role, content, timestamp) = row.map_err(|e| from_rusqlite(e).with_op("list"))?;
        match role.parse::<Role>() {
            Ok(role) => messages.push(ChatMessage {
                id,
                role,
                content,
                timestamp,
            }),
            Err(e) => {
                tracing::warn!(message_id = id, error = %e, "Skipping row with unknown role");
            }
        }
    }

    Ok(messages)
}
