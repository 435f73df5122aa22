//! Schema migrations for the task store.
//!
//! # Responsibility
//! - Own the ordered list of `tasks` schema revisions.
//! - Bring a connection up to the newest revision inside one transaction.
//!
//! # Schema history
//! - `1`: `tasks` table with `UNIQUE (national_id)`, the
//!   `status IN ('pending', 'completed')` check and the status index.
//!
//! # Invariants
//! - Revisions are strictly increasing; `PRAGMA user_version` holds the last
//!   one applied.
//! - Revision 1 uses `IF NOT EXISTS`: a file that already holds a `tasks`
//!   table at `user_version = 0` is stamped as version 1 with its rows kept.
//! - A file stamped with a revision this binary does not know is refused
//!   rather than downgraded.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct SchemaRevision {
    version: u32,
    sql: &'static str,
}

const SCHEMA_REVISIONS: &[SchemaRevision] = &[SchemaRevision {
    version: 1,
    sql: include_str!("0001_init.sql"),
}];

/// Newest schema revision this binary can write.
pub fn latest_version() -> u32 {
    SCHEMA_REVISIONS
        .last()
        .map_or(0, |revision| revision.version)
}

fn revisions_after(version: u32) -> impl Iterator<Item = &'static SchemaRevision> {
    SCHEMA_REVISIONS
        .iter()
        .filter(move |revision| revision.version > version)
}

/// Upgrades `conn` to [`latest_version`].
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file is newer than this binary.
/// - `Sqlite` when a revision fails; the transaction is rolled back.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let found: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let target = latest_version();

    if found > target {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: found,
            latest_supported: target,
        });
    }
    if found == target {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for revision in revisions_after(found) {
        tx.execute_batch(revision.sql)?;
        tx.pragma_update(None, "user_version", revision.version)?;
    }
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from_version={found} to_version={target}");
    Ok(())
}
