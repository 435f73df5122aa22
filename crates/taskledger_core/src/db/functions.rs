//! Scalar SQL functions registered on every store connection.
//!
//! SQLite's built-in `LOWER()` only folds ASCII, so `Ñ`/`Á` would never
//! match `ñ`/`á` in search. The store folds both sides with Rust's Unicode
//! lowercase mapping instead.

use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;

/// Name of the Unicode-aware lowercase function available in store SQL.
pub const FOLD_FUNCTION: &str = "taskledger_fold";

pub(super) fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        FOLD_FUNCTION,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value = ctx.get::<Option<String>>(0)?;
            Ok(value.map(|text| text.to_lowercase()))
        },
    )
}
