//! Summary report over task records.

use crate::model::task::{TaskRecord, TaskStatus};
use std::collections::BTreeMap;

/// Counts by status, course and shift.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskReport {
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
    pub by_course: BTreeMap<String, usize>,
    pub by_shift: BTreeMap<String, usize>,
}

impl TaskReport {
    /// Builds a report from any record slice.
    pub fn from_records(records: &[TaskRecord]) -> Self {
        let mut report = Self {
            total: records.len(),
            ..Self::default()
        };

        for record in records {
            match record.status {
                TaskStatus::Pending => report.pending += 1,
                TaskStatus::Completed => report.completed += 1,
            }
            *report.by_course.entry(record.course.clone()).or_default() += 1;
            *report.by_shift.entry(record.shift.clone()).or_default() += 1;
        }

        report
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Whole-number share of pending records; `0` for an empty report.
    pub fn pending_percent(&self) -> usize {
        percent(self.pending, self.total)
    }

    /// Whole-number share of completed records; `0` for an empty report.
    pub fn completed_percent(&self) -> usize {
        percent(self.completed, self.total)
    }
}

fn percent(part: usize, total: usize) -> usize {
    if total == 0 {
        0
    } else {
        part * 100 / total
    }
}
