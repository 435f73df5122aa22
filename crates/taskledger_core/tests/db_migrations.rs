use taskledger_core::db::migrations::latest_version;
use taskledger_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "tasks");
}

#[test]
fn opening_same_database_twice_is_idempotent_and_keeps_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("database.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute(
            "INSERT INTO tasks (national_id, first_name, last_name, course, shift, pending_action, created_at, completed_at, status)
             VALUES ('123456', 'Ana', 'Paz', '1° Grado', 'Tarde', 'Firmar', '01/01/2024 10:00', '', 'pending');",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let count: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM tasks;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn pre_versioned_database_with_existing_table_is_adopted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("adopted.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(include_str!("../src/db/migrations/0001_init.sql"))
        .unwrap();
    assert_eq!(schema_version(&conn), 0);
    drop(conn);

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
}

#[test]
fn schema_rejects_unknown_status_and_duplicate_national_id() {
    let conn = open_db_in_memory().unwrap();
    let insert = "INSERT INTO tasks (national_id, first_name, last_name, course, shift, created_at, status)
                  VALUES (?1, 'Ana', 'Paz', '1° Grado', 'Tarde', '01/01/2024 10:00', ?2);";

    conn.execute(insert, ["123456", "pending"]).unwrap();
    assert!(conn.execute(insert, ["123456", "pending"]).is_err());
    assert!(conn.execute(insert, ["654321", "archived"]).is_err());
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
