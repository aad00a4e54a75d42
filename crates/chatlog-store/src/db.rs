//! Engine connection management
//!
//! The conversation database lives entirely in memory; durability comes from
//! snapshots, never from a database file.

use crate::errors::{from_rusqlite, Result};
use rusqlite::Connection;

/// Open an empty in-memory database
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().map_err(from_rusqlite)?;
    configure(&conn)?;
    Ok(conn)
}

/// Apply connection settings
///
/// Must also be applied to connections built from a snapshot image, since
/// pragmas are per-connection and not part of the image.
pub fn configure(conn: &Connection) -> Result<()> {
    // Journal in memory; a file journal has nothing to protect here
    conn.pragma_update_and_check(None, "journal_mode", "MEMORY", |row| {
        row.get::<_, String>(0)
    })
    .map_err(from_rusqlite)?;

    conn.pragma_update(None, "temp_store", "MEMORY")
        .map_err(from_rusqlite)?;

    Ok(())
}
