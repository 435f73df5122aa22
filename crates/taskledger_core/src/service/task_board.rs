//! Task board: application state behind the presentation layer.
//!
//! # Responsibility
//! - Validate form input and forward it to the Record Store.
//! - Rebuild the pending/completed partitions after every change.
//! - Remember the active search so periodic refreshes reapply it.
//!
//! # Invariants
//! - Partitions preserve store order (`id DESC`).
//! - A blank query is the same as "load all".
//! - Store write failures always surface to the caller.

use crate::model::task::{TaskId, TaskRecord, TaskStatus};
use crate::report::TaskReport;
use crate::repo::task_repo::{RepoError, TaskRepository, UpdateOutcome};
use crate::transfer::{self, ImportOutcome, TransferError};
use crate::validation::{validate_form, FieldError, TaskForm};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub type BoardResult<T> = Result<T, BoardError>;

/// Error surfaced to the presentation layer.
#[derive(Debug)]
pub enum BoardError {
    /// Form input rejected; nothing was written.
    Validation(FieldError),
    /// National id already belongs to another record.
    DuplicateNationalId(String),
    /// Target record does not exist.
    NotFound(TaskId),
    Repo(RepoError),
    Transfer(TransferError),
}

impl Display for BoardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::DuplicateNationalId(national_id) => {
                write!(f, "a student with national id `{national_id}` already exists")
            }
            Self::NotFound(id) => write!(f, "task {id} not found"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Transfer(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BoardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Transfer(err) => Some(err),
            Self::DuplicateNationalId(_) | Self::NotFound(_) => None,
        }
    }
}

impl From<FieldError> for BoardError {
    fn from(value: FieldError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for BoardError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::DuplicateKey(national_id) => Self::DuplicateNationalId(national_id),
            RepoError::NotFound(id) => Self::NotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<TransferError> for BoardError {
    fn from(value: TransferError) -> Self {
        match value {
            TransferError::Repo(err) => err.into(),
            other => Self::Transfer(other),
        }
    }
}

/// Explicit application state passed to every handler.
pub struct TaskBoard<R: TaskRepository> {
    repo: R,
    pending: Vec<TaskRecord>,
    completed: Vec<TaskRecord>,
    last_query: Option<String>,
    status_line: String,
}

impl<R: TaskRepository> TaskBoard<R> {
    /// Creates a board with empty partitions. Call [`TaskBoard::load`] next.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            pending: Vec::new(),
            completed: Vec::new(),
            last_query: None,
            status_line: String::new(),
        }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Pending records, most recent first.
    pub fn pending(&self) -> &[TaskRecord] {
        &self.pending
    }

    /// Completed records, most recent first.
    pub fn completed(&self) -> &[TaskRecord] {
        &self.completed
    }

    pub fn last_query(&self) -> Option<&str> {
        self.last_query.as_deref()
    }

    /// Human-readable summary of the last handled action.
    pub fn status_line(&self) -> &str {
        &self.status_line
    }

    /// Loads all records (blank/`None` query) or search hits, then partitions.
    pub fn load(&mut self, query: Option<&str>) -> BoardResult<()> {
        let query = query.map(str::trim).filter(|value| !value.is_empty());
        let records = match query {
            Some(text) => self.repo.search(Some(text))?,
            None => self.repo.get_all()?,
        };

        let (completed, pending): (Vec<_>, Vec<_>) = records
            .into_iter()
            .partition(|record| record.status == TaskStatus::Completed);
        self.pending = pending;
        self.completed = completed;

        self.status_line = match query {
            Some(text) => format!(
                "Showing {} results for '{text}'",
                self.pending.len() + self.completed.len()
            ),
            None => format!(
                "Pending: {}, Completed: {}",
                self.pending.len(),
                self.completed.len()
            ),
        };
        Ok(())
    }

    /// Validates and inserts a new pending record.
    pub fn submit_new(&mut self, form: &TaskForm) -> BoardResult<TaskRecord> {
        validate_form(form)?;
        let national_id = form.national_id.trim();
        if self.repo.exists_by_national_id(national_id, None) {
            return Err(BoardError::DuplicateNationalId(national_id.to_string()));
        }

        let record = TaskRecord::new(
            national_id,
            form.first_name.trim(),
            form.last_name.trim(),
            form.course.trim(),
            form.shift.trim(),
            form.pending_action.trim(),
        );
        let stored = self.repo.insert(&record)?;
        info!(
            "event=board_add module=service status=ok id={}",
            stored.id.unwrap_or_default()
        );

        self.load(None)?;
        self.status_line = format!("Task added: {}", stored.display_name());
        Ok(stored)
    }

    /// Validates and overwrites the editable fields of an existing record.
    pub fn submit_edit(&mut self, id: TaskId, form: &TaskForm) -> BoardResult<TaskRecord> {
        validate_form(form)?;
        let mut record = self.repo.get_by_id(id)?.ok_or(BoardError::NotFound(id))?;

        let national_id = form.national_id.trim();
        if national_id != record.national_id
            && self.repo.exists_by_national_id(national_id, Some(id))
        {
            return Err(BoardError::DuplicateNationalId(national_id.to_string()));
        }

        record.national_id = national_id.to_string();
        record.first_name = form.first_name.trim().to_string();
        record.last_name = form.last_name.trim().to_string();
        record.course = form.course.trim().to_string();
        record.shift = form.shift.trim().to_string();
        record.pending_action = form.pending_action.trim().to_string();

        let outcome = self.repo.update(&record)?;
        self.load(None)?;
        self.status_line = match outcome {
            UpdateOutcome::Updated => format!("Task updated: {}", record.display_name()),
            UpdateOutcome::Unchanged => {
                warn!("event=board_edit module=service status=unchanged id={id}");
                format!("Warning: no row was updated for task {id}")
            }
        };
        Ok(record)
    }

    /// Moves a record to `target`, stamping or clearing `completed_at`.
    pub fn set_status(&mut self, id: TaskId, target: TaskStatus) -> BoardResult<TaskRecord> {
        let mut record = self.repo.get_by_id(id)?.ok_or(BoardError::NotFound(id))?;
        record.transition_to(target);
        self.repo.update(&record)?;
        info!("event=board_status module=service status=ok id={id} target={target}");

        self.load(None)?;
        self.status_line = format!("Task {id} marked as {target}");
        Ok(record)
    }

    /// Deletes a record by id.
    pub fn delete(&mut self, id: TaskId) -> BoardResult<()> {
        let name = self
            .repo
            .get_by_id(id)?
            .map(|record| record.display_name());
        self.repo.delete_by_id(id)?;

        self.load(None)?;
        self.status_line = match name {
            Some(name) => format!("Task for {name} deleted"),
            None => format!("Task {id} deleted"),
        };
        Ok(())
    }

    /// Runs a search and remembers it for later refreshes.
    pub fn search(&mut self, query: &str) -> BoardResult<()> {
        let trimmed = query.trim();
        self.last_query = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        let active = self.last_query.clone();
        self.load(active.as_deref())
    }

    /// Forgets the active search and shows every record.
    pub fn clear_search(&mut self) -> BoardResult<()> {
        self.last_query = None;
        self.load(None)?;
        self.status_line = "Search cleared; showing all records".to_string();
        Ok(())
    }

    /// Re-applies the active search, or reloads everything without one.
    pub fn refresh(&mut self) -> BoardResult<()> {
        let active = self.last_query.clone();
        self.load(active.as_deref())
    }

    /// Builds the summary report over all records.
    pub fn report(&self) -> BoardResult<TaskReport> {
        Ok(TaskReport::from_records(&self.repo.get_all()?))
    }

    /// Exports all records to `path`. Returns the number of rows written.
    pub fn export_csv(&mut self, path: impl AsRef<Path>) -> BoardResult<usize> {
        let path = path.as_ref();
        let records = self.repo.get_all()?;
        let written = transfer::export_csv_file(&records, path)?;
        self.status_line = format!("Exported {written} records to {}", path.display());
        Ok(written)
    }

    /// Runs the one-time legacy import hook, then reloads.
    pub fn migrate_legacy(&mut self, path: impl AsRef<Path>) -> BoardResult<ImportOutcome> {
        let outcome = transfer::migrate_legacy_csv(&self.repo, path)?;
        if matches!(outcome, ImportOutcome::Imported { .. }) {
            self.refresh()?;
        }
        Ok(outcome)
    }
}
