//! CSV export of task records.

use super::{TransferError, TransferResult, UTF8_BOM};
use crate::clock::normalize_stamp;
use crate::model::task::{TaskId, TaskRecord, TaskStatus};
use log::info;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Header row written by [`export_csv`].
pub const EXPORT_HEADER: &str =
    "id,nationalId,firstName,lastName,course,shift,pendingAction,createdAt,completedAt,status";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportRow<'a> {
    id: Option<TaskId>,
    national_id: &'a str,
    first_name: &'a str,
    last_name: &'a str,
    course: &'a str,
    shift: &'a str,
    pending_action: &'a str,
    created_at: String,
    completed_at: String,
    status: TaskStatus,
}

impl<'a> From<&'a TaskRecord> for ExportRow<'a> {
    fn from(record: &'a TaskRecord) -> Self {
        Self {
            id: record.id,
            national_id: &record.national_id,
            first_name: &record.first_name,
            last_name: &record.last_name,
            course: &record.course,
            shift: &record.shift,
            pending_action: &record.pending_action,
            created_at: normalize_stamp(&record.created_at),
            completed_at: normalize_stamp(&record.completed_at),
            status: record.status,
        }
    }
}

/// Writes `records` as CSV (BOM, header, one row per record).
///
/// Returns the number of rows written.
///
/// # Errors
/// - `NothingToExport` when `records` is empty; nothing is written.
pub fn export_csv<W: Write>(records: &[TaskRecord], mut writer: W) -> TransferResult<usize> {
    if records.is_empty() {
        return Err(TransferError::NothingToExport);
    }

    writer.write_all(UTF8_BOM.as_bytes())?;
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(ExportRow::from(record))?;
    }
    csv_writer.flush()?;

    Ok(records.len())
}

/// Exports `records` into a newly created (or truncated) file at `path`.
pub fn export_csv_file(records: &[TaskRecord], path: impl AsRef<Path>) -> TransferResult<usize> {
    if records.is_empty() {
        return Err(TransferError::NothingToExport);
    }

    let file = File::create(path.as_ref())?;
    let written = export_csv(records, file)?;
    info!("event=csv_export module=transfer status=ok rows={written}");
    Ok(written)
}
