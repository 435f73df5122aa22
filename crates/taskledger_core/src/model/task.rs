//! Task record domain model.
//!
//! # Responsibility
//! - Define `TaskRecord`, its status enum and lifecycle helpers.
//! - Validate record-level invariants before persistence.
//!
//! # Invariants
//! - `id` is `None` until the store assigns one and never changes afterwards.
//! - `created_at` is set once at construction.
//! - `completed_at` is non-empty iff `status == TaskStatus::Completed`.

use crate::clock::now_stamp;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned integer identifier.
pub type TaskId = i64;

/// Lifecycle state of a task record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Action still outstanding.
    #[default]
    Pending,
    /// Action done; `completed_at` carries the completion stamp.
    Completed,
}

impl TaskStatus {
    /// Returns the persisted string form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }

    /// Parses the persisted form, also accepting legacy Spanish spellings.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "pending" | "pendiente" => Some(Self::Pending),
            "completed" | "completada" => Some(Self::Completed),
            _ => None,
        }
    }
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation errors for record-level invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// A required text field is empty or whitespace.
    BlankField(&'static str),
    /// Completed records must carry `completed_at`.
    MissingCompletedAt,
    /// Pending records must not carry `completed_at`.
    UnexpectedCompletedAt,
    /// Operation needs a store-assigned id.
    MissingId,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "{field} cannot be empty"),
            Self::MissingCompletedAt => write!(f, "completed task requires completed_at"),
            Self::UnexpectedCompletedAt => write!(f, "pending task must not have completed_at"),
            Self::MissingId => write!(f, "task has no id; insert it first"),
        }
    }
}

impl Error for TaskValidationError {}

/// One pending/completed administrative action tied to a student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    /// `None` before insert.
    pub id: Option<TaskId>,
    /// Student national id (cedula); unique across the store.
    pub national_id: String,
    pub first_name: String,
    pub last_name: String,
    pub course: String,
    pub shift: String,
    pub pending_action: String,
    pub created_at: String,
    /// Empty while pending.
    pub completed_at: String,
    pub status: TaskStatus,
}

impl TaskRecord {
    /// Creates a new pending record stamped with the current time.
    pub fn new(
        national_id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        course: impl Into<String>,
        shift: impl Into<String>,
        pending_action: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            national_id: national_id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            course: course.into(),
            shift: shift.into(),
            pending_action: pending_action.into(),
            created_at: now_stamp(),
            completed_at: String::new(),
            status: TaskStatus::Pending,
        }
    }

    /// Marks the record completed and stamps `completed_at` with now.
    ///
    /// Re-applying on an already completed record refreshes the stamp.
    pub fn mark_completed(&mut self) {
        self.status = TaskStatus::Completed;
        self.completed_at = now_stamp();
    }

    /// Reverts the record to pending and clears `completed_at`.
    pub fn mark_pending(&mut self) {
        self.status = TaskStatus::Pending;
        self.completed_at.clear();
    }

    /// Applies the transition rule for `target`.
    pub fn transition_to(&mut self, target: TaskStatus) {
        match target {
            TaskStatus::Completed => self.mark_completed(),
            TaskStatus::Pending => self.mark_pending(),
        }
    }

    /// Returns `"<first> <last>"` for status lines.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }

    /// Checks record-level invariants enforced by every store write.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        let required = [
            ("national_id", &self.national_id),
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("course", &self.course),
            ("shift", &self.shift),
            ("created_at", &self.created_at),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(TaskValidationError::BlankField(field));
            }
        }

        match (self.status, self.completed_at.trim().is_empty()) {
            (TaskStatus::Completed, true) => Err(TaskValidationError::MissingCompletedAt),
            (TaskStatus::Pending, false) => Err(TaskValidationError::UnexpectedCompletedAt),
            _ => Ok(()),
        }
    }
}
