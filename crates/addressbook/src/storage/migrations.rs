//! Schema versioning for the address database.
//!
//! The schema version lives in `SQLite`'s `user_version` pragma. Opening a
//! database applies every script in [`MIGRATIONS`] past that version inside
//! one transaction.

use rusqlite::Connection;
use tracing::info;

use crate::error::{Error, Result};

use super::schema::MIGRATIONS;

/// The schema version a fully migrated database reports.
#[must_use]
pub fn current_version() -> u32 {
    u32::try_from(MIGRATIONS.len()).unwrap_or(u32::MAX)
}

/// Bring the schema up to [`current_version`].
///
/// # Errors
///
/// Returns an error if the database reports a version newer than this
/// build knows, or if a migration script fails.
pub fn initialize_schema(conn: &mut Connection) -> Result<()> {
    let from = schema_version(conn)?;
    let to = current_version();

    if from > to {
        return Err(Error::DatabaseMigration {
            message: format!("database schema version {from} is newer than supported {to}"),
        });
    }
    if from == to {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for (index, script) in MIGRATIONS.iter().enumerate().skip(from as usize) {
        tx.execute_batch(script).map_err(|e| Error::DatabaseMigration {
            message: format!("migration to version {} failed: {e}", index + 1),
        })?;
    }
    tx.pragma_update(None, "user_version", to)?;
    tx.commit()?;

    info!("Migrated address schema from version {} to {}", from, to);
    Ok(())
}

/// Read the schema version. A fresh database reports 0.
fn schema_version(conn: &Connection) -> Result<u32> {
    let version: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    Ok(version)
}
