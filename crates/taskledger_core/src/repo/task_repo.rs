//! Task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and search APIs over the `tasks` table.
//! - Keep SQL details inside the core persistence boundary.
//! - Translate unique-constraint failures into `DuplicateKey`.
//!
//! # Invariants
//! - Write paths call `TaskRecord::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - List and search results are ordered by `id DESC`.
//! - Existence probes (`exists_by_national_id`, `has_data`) never fail; they
//!   log and answer `false` when the store is unreachable.

use crate::db::migrations::latest_version;
use crate::db::{DbError, FOLD_FUNCTION};
use crate::model::task::{TaskId, TaskRecord, TaskStatus, TaskValidationError};
use log::{error, info, warn};
use rusqlite::types::ToSqlOutput;
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql};
use std::error::Error;
use std::fmt::{Display, Formatter};

const TASK_SELECT_SQL: &str = "SELECT
    id,
    national_id,
    first_name,
    last_name,
    course,
    shift,
    pending_action,
    created_at,
    completed_at,
    status
FROM tasks";

const TASK_INSERT_COLUMNS: &str = "(
    national_id,
    first_name,
    last_name,
    course,
    shift,
    pending_action,
    created_at,
    completed_at,
    status
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for task persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(TaskValidationError),
    /// Another record already owns this national id.
    DuplicateKey(String),
    NotFound(TaskId),
    Db(DbError),
    InvalidData(String),
    /// Connection was not bootstrapped through `db::open_db*`.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::DuplicateKey(national_id) => {
                write!(f, "national id `{national_id}` already belongs to another record")
            }
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::DuplicateKey(_)
            | Self::NotFound(_)
            | Self::InvalidData(_)
            | Self::UninitializedConnection { .. } => None,
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Result of a full-row update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated,
    /// No row matched the id. Reported as success with a logged warning.
    Unchanged,
}

/// Record Store interface for task records.
pub trait TaskRepository {
    /// Inserts a new record and returns it with the assigned id.
    fn insert(&self, record: &TaskRecord) -> RepoResult<TaskRecord>;
    /// Overwrites every mutable column of the row matching `record.id`.
    fn update(&self, record: &TaskRecord) -> RepoResult<UpdateOutcome>;
    fn delete_by_id(&self, id: TaskId) -> RepoResult<()>;
    fn get_by_id(&self, id: TaskId) -> RepoResult<Option<TaskRecord>>;
    /// Returns every record, most recent id first.
    fn get_all(&self) -> RepoResult<Vec<TaskRecord>>;
    /// Case-insensitive substring search; blank text behaves like `get_all`.
    fn search(&self, text: Option<&str>) -> RepoResult<Vec<TaskRecord>>;
    fn exists_by_national_id(&self, national_id: &str, exclude_id: Option<TaskId>) -> bool;
    fn has_data(&self) -> bool;
    fn count(&self) -> RepoResult<usize>;
    /// Inserts records in one transaction, skipping national id conflicts.
    ///
    /// Returns the number of rows actually inserted.
    fn insert_or_ignore_many(&self, records: &[TaskRecord]) -> RepoResult<usize>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let expected_version = latest_version();
        let actual_version: u32 =
            conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }

    fn query_records(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> RepoResult<Vec<TaskRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut records = Vec::new();

        while let Some(row) = rows.next()? {
            records.push(parse_task_row(row)?);
        }

        Ok(records)
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn insert(&self, record: &TaskRecord) -> RepoResult<TaskRecord> {
        record.validate()?;

        self.conn
            .execute(
                &format!("INSERT INTO tasks {TASK_INSERT_COLUMNS};"),
                &record_params(record),
            )
            .map_err(|err| map_write_error(err, &record.national_id))?;

        let id = self.conn.last_insert_rowid();
        info!("event=task_insert module=repo status=ok id={id}");

        let mut stored = record.clone();
        stored.id = Some(id);
        Ok(stored)
    }

    fn update(&self, record: &TaskRecord) -> RepoResult<UpdateOutcome> {
        let id = record.id.ok_or(TaskValidationError::MissingId)?;
        record.validate()?;

        let changed = self
            .conn
            .execute(
                "UPDATE tasks
                 SET
                    national_id = ?1,
                    first_name = ?2,
                    last_name = ?3,
                    course = ?4,
                    shift = ?5,
                    pending_action = ?6,
                    completed_at = ?7,
                    status = ?8
                 WHERE id = ?9;",
                params![
                    record.national_id.as_str(),
                    record.first_name.as_str(),
                    record.last_name.as_str(),
                    record.course.as_str(),
                    record.shift.as_str(),
                    record.pending_action.as_str(),
                    record.completed_at.as_str(),
                    record.status,
                    id,
                ],
            )
            .map_err(|err| map_write_error(err, &record.national_id))?;

        if changed == 0 {
            warn!("event=task_update module=repo status=unchanged id={id} rows=0");
            return Ok(UpdateOutcome::Unchanged);
        }

        info!("event=task_update module=repo status=ok id={id}");
        Ok(UpdateOutcome::Updated)
    }

    fn delete_by_id(&self, id: TaskId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM tasks WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        info!("event=task_delete module=repo status=ok id={id}");
        Ok(())
    }

    fn get_by_id(&self, id: TaskId) -> RepoResult<Option<TaskRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }

        Ok(None)
    }

    fn get_all(&self) -> RepoResult<Vec<TaskRecord>> {
        self.query_records(&format!("{TASK_SELECT_SQL} ORDER BY id DESC;"), [])
    }

    fn search(&self, text: Option<&str>) -> RepoResult<Vec<TaskRecord>> {
        let needle = match text.map(str::trim) {
            Some(value) if !value.is_empty() => value.to_lowercase(),
            _ => return self.get_all(),
        };

        let sql = format!(
            "{TASK_SELECT_SQL}
             WHERE instr({FOLD_FUNCTION}(national_id), ?1) > 0
                OR instr({FOLD_FUNCTION}(first_name), ?1) > 0
                OR instr({FOLD_FUNCTION}(last_name), ?1) > 0
                OR instr({FOLD_FUNCTION}(course), ?1) > 0
                OR instr({FOLD_FUNCTION}(shift), ?1) > 0
                OR instr({FOLD_FUNCTION}(pending_action), ?1) > 0
             ORDER BY id DESC;"
        );
        self.query_records(&sql, [needle])
    }

    fn exists_by_national_id(&self, national_id: &str, exclude_id: Option<TaskId>) -> bool {
        let result = self
            .conn
            .query_row(
                "SELECT 1
                 FROM tasks
                 WHERE national_id = ?1
                   AND (?2 IS NULL OR id != ?2)
                 LIMIT 1;",
                params![national_id, exclude_id],
                |row| row.get::<_, i64>(0),
            )
            .optional();

        match result {
            Ok(found) => found.is_some(),
            Err(err) => {
                error!(
                    "event=task_exists module=repo status=error fallback=false error={}",
                    err
                );
                false
            }
        }
    }

    fn has_data(&self) -> bool {
        match self.count() {
            Ok(count) => count > 0,
            Err(err) => {
                error!(
                    "event=task_has_data module=repo status=error fallback=false error={}",
                    err
                );
                false
            }
        }
    }

    fn count(&self) -> RepoResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM tasks;", [], |row| row.get(0))?;
        usize::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count {count}")))
    }

    fn insert_or_ignore_many(&self, records: &[TaskRecord]) -> RepoResult<usize> {
        for record in records {
            record.validate()?;
        }

        let tx = self.conn.unchecked_transaction()?;
        let mut inserted = 0;
        {
            let mut stmt =
                tx.prepare(&format!("INSERT OR IGNORE INTO tasks {TASK_INSERT_COLUMNS};"))?;
            for record in records {
                inserted += stmt.execute(&record_params(record))?;
            }
        }
        tx.commit()?;

        info!(
            "event=task_bulk_insert module=repo status=ok offered={} inserted={}",
            records.len(),
            inserted
        );
        Ok(inserted)
    }
}

fn record_params(record: &TaskRecord) -> [&dyn ToSql; 9] {
    [
        &record.national_id,
        &record.first_name,
        &record.last_name,
        &record.course,
        &record.shift,
        &record.pending_action,
        &record.created_at,
        &record.completed_at,
        &record.status,
    ]
}

impl ToSql for TaskStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<TaskRecord> {
    let status_text: String = row.get("status")?;
    let status = TaskStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{status_text}` in tasks.status"))
    })?;

    let record = TaskRecord {
        id: Some(row.get("id")?),
        national_id: row.get("national_id")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        course: row.get("course")?,
        shift: row.get("shift")?,
        pending_action: row
            .get::<_, Option<String>>("pending_action")?
            .unwrap_or_default(),
        created_at: row.get("created_at")?,
        completed_at: row
            .get::<_, Option<String>>("completed_at")?
            .unwrap_or_default(),
        status,
    };
    record.validate()?;
    Ok(record)
}

fn map_write_error(err: rusqlite::Error, national_id: &str) -> RepoError {
    if is_national_id_conflict(&err) {
        return RepoError::DuplicateKey(national_id.to_string());
    }
    err.into()
}

fn is_national_id_conflict(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(failure, message) => {
            failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                && message
                    .as_deref()
                    .map_or(true, |text| text.contains("tasks.national_id"))
        }
        _ => false,
    }
}
