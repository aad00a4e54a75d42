//! Engine image codec
//!
//! Converts between a live in-memory database and the opaque bytes kept in
//! the snapshot store. The bytes are SQLite's own serialized database format,
//! so a snapshot carries schema, rows, and the AUTOINCREMENT sequence.

use crate::db;
use crate::errors::{corrupt_snapshot, from_rusqlite, Result};
use rusqlite::{Connection, DatabaseName, OptionalExtension};

/// Table that must exist for an image to be usable
pub const MESSAGES_TABLE: &str = "messages";

/// Columns the repository reads and writes; an image may carry more
pub const MESSAGES_COLUMNS: [&str; 4] = ["id", "role", "content", "timestamp"];

/// Serialize the main database of `conn` into an owned byte image
pub fn export_image(conn: &Connection) -> Result<Vec<u8>> {
    let data = conn
        .serialize(DatabaseName::Main)
        .map_err(|e| from_rusqlite(e).with_op("export_image"))?;
    Ok(data.to_vec())
}

/// Build a new engine from an image, validating it before returning
///
/// Any failure is reported as `CorruptSnapshot` carrying `key`.
pub fn import_image(key: &str, bytes: &[u8]) -> Result<Connection> {
    let mut conn = db::open_in_memory()
        .map_err(|e| corrupt_snapshot(key, "could not open scratch engine").with_source(e))?;

    load_into(&mut conn, bytes).map_err(|e| corrupt_snapshot(key, e.to_string()))?;
    validate_image(&conn).map_err(|reason| corrupt_snapshot(key, reason))?;

    db::configure(&conn)
        .map_err(|e| corrupt_snapshot(key, "could not configure engine").with_source(e))?;

    Ok(conn)
}

/// Replace the contents of an existing engine with a previously exported image
///
/// Used to undo a mutation whose snapshot could not be persisted.
pub fn restore_image(conn: &mut Connection, bytes: &[u8]) -> Result<()> {
    load_into(conn, bytes).map_err(|e| from_rusqlite(e).with_op("restore_image"))?;
    db::configure(conn)
}

fn load_into(conn: &mut Connection, bytes: &[u8]) -> rusqlite::Result<()> {
    conn.deserialize_read_exact(DatabaseName::Main, bytes, bytes.len(), false)
}

/// Structural checks on a freshly deserialized image
///
/// SQLite only inspects the header lazily, so the first real read is what
/// surfaces "file is not a database".
fn validate_image(conn: &Connection) -> std::result::Result<(), String> {
    let check: String = conn
        .query_row("PRAGMA quick_check", [], |row| row.get(0))
        .map_err(|e| e.to_string())?;
    if check != "ok" {
        return Err(format!("integrity check failed: {}", check));
    }

    let has_messages = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [MESSAGES_TABLE],
            |_| Ok(()),
        )
        .optional()
        .map_err(|e| e.to_string())?
        .is_some();
    if !has_messages {
        return Err(format!("image has no {} table", MESSAGES_TABLE));
    }

    let columns = table_columns(conn, MESSAGES_TABLE).map_err(|e| e.to_string())?;
    let missing: Vec<&str> = MESSAGES_COLUMNS
        .iter()
        .copied()
        .filter(|required| !columns.iter().any(|c| c == required))
        .collect();
    if !missing.is_empty() {
        return Err(format!(
            "{} table is missing columns: {}",
            MESSAGES_TABLE,
            missing.join(", ")
        ));
    }

    Ok(())
}

fn table_columns(conn: &Connection, table: &str) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1)")?;
    let columns = stmt
        .query_map([table], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(columns)
}
