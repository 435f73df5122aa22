//! One-time legacy CSV import.
//!
//! # Responsibility
//! - Parse legacy CSV files (Spanish or export headers, partial columns).
//! - Fill missing values with placeholder defaults.
//! - Seed an empty store with `INSERT OR IGNORE` semantics.
//!
//! # Invariants
//! - A non-empty store is never touched.
//! - Rows whose national id already exists (in the store or earlier in the
//!   file) are skipped silently.
//! - Imported rows satisfy `TaskRecord::validate()`.

use super::{TransferResult, UTF8_BOM};
use crate::clock::now_stamp;
use crate::model::task::{TaskRecord, TaskStatus};
use crate::repo::task_repo::TaskRepository;
use log::{info, warn};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use time::OffsetDateTime;

const DEFAULT_FIRST_NAME: &str = "Nombre no especificado";
const DEFAULT_LAST_NAME: &str = "Apellido no especificado";
const DEFAULT_COURSE: &str = "Curso no especificado";
const DEFAULT_SHIFT: &str = "Turno no especificado";
const DEFAULT_ACTION: &str = "Acción pendiente no especificada";

/// What the legacy import hook did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    SkippedMissingFile,
    SkippedStoreNotEmpty,
    /// File exists but holds no data rows.
    NoRows,
    Imported { offered: usize, inserted: usize },
}

#[derive(Debug, Default, Deserialize)]
struct LegacyRow {
    #[serde(default, rename = "nationalId", alias = "cedula")]
    national_id: Option<String>,
    #[serde(default, rename = "firstName", alias = "nombre")]
    first_name: Option<String>,
    #[serde(default, rename = "lastName", alias = "apellido")]
    last_name: Option<String>,
    #[serde(default, alias = "curso")]
    course: Option<String>,
    #[serde(default, alias = "turno")]
    shift: Option<String>,
    #[serde(default, rename = "pendingAction", alias = "accion")]
    pending_action: Option<String>,
    #[serde(default, rename = "createdAt", alias = "fecha_creacion")]
    created_at: Option<String>,
    #[serde(default, rename = "completedAt", alias = "fecha_completado")]
    completed_at: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

impl LegacyRow {
    fn into_record(self, row_index: usize) -> TaskRecord {
        let national_id = non_blank(self.national_id).unwrap_or_else(|| {
            format!(
                "missing-{}-{row_index}",
                OffsetDateTime::now_utc().unix_timestamp_nanos()
            )
        });
        let status = non_blank(self.status)
            .and_then(|value| TaskStatus::parse(&value))
            .unwrap_or_default();
        let completed_at = match status {
            TaskStatus::Completed => non_blank(self.completed_at).unwrap_or_else(now_stamp),
            TaskStatus::Pending => String::new(),
        };

        TaskRecord {
            id: None,
            national_id,
            first_name: non_blank(self.first_name).unwrap_or_else(|| DEFAULT_FIRST_NAME.into()),
            last_name: non_blank(self.last_name).unwrap_or_else(|| DEFAULT_LAST_NAME.into()),
            course: non_blank(self.course).unwrap_or_else(|| DEFAULT_COURSE.into()),
            shift: non_blank(self.shift).unwrap_or_else(|| DEFAULT_SHIFT.into()),
            pending_action: non_blank(self.pending_action)
                .unwrap_or_else(|| DEFAULT_ACTION.into()),
            created_at: non_blank(self.created_at).unwrap_or_else(now_stamp),
            completed_at,
            status,
        }
    }
}

/// Parses legacy CSV content into records ready for insertion.
///
/// Headers may use either the export names (`nationalId`, …) or the legacy
/// Spanish names (`cedula`, …). Unknown columns such as `id` are ignored and
/// short rows are tolerated.
pub fn read_legacy_records<R: Read>(mut reader: R) -> TransferResult<Vec<TaskRecord>> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;
    let content = content.strip_prefix(UTF8_BOM).unwrap_or(&content);

    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut records = Vec::new();
    for (row_index, row) in csv_reader.deserialize::<LegacyRow>().enumerate() {
        records.push(row?.into_record(row_index));
    }
    Ok(records)
}

/// Runs the one-time legacy import hook.
///
/// Does nothing when the file is absent or the store already holds data.
pub fn migrate_legacy_csv<R>(repo: &R, path: impl AsRef<Path>) -> TransferResult<ImportOutcome>
where
    R: TaskRepository + ?Sized,
{
    let path = path.as_ref();
    if !path.exists() {
        info!("event=legacy_import module=transfer status=skipped reason=missing_file");
        return Ok(ImportOutcome::SkippedMissingFile);
    }
    if repo.has_data() {
        info!("event=legacy_import module=transfer status=skipped reason=store_not_empty");
        return Ok(ImportOutcome::SkippedStoreNotEmpty);
    }

    let file = std::fs::File::open(path)?;
    let records = read_legacy_records(file)?;
    if records.is_empty() {
        warn!("event=legacy_import module=transfer status=skipped reason=no_rows");
        return Ok(ImportOutcome::NoRows);
    }

    let inserted = repo.insert_or_ignore_many(&records)?;
    info!(
        "event=legacy_import module=transfer status=ok offered={} inserted={}",
        records.len(),
        inserted
    );
    Ok(ImportOutcome::Imported {
        offered: records.len(),
        inserted,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
