//! CSV export and legacy CSV import.
//!
//! # Responsibility
//! - Write the record set as a spreadsheet-friendly CSV file.
//! - Seed an empty store from a legacy CSV file exactly once.
//!
//! # Invariants
//! - Export never mutates the store.
//! - Import only ever runs against an empty store.

use crate::repo::task_repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod export;
pub mod import;

pub use export::{export_csv, export_csv_file, EXPORT_HEADER};
pub use import::{migrate_legacy_csv, read_legacy_records, ImportOutcome};

pub(crate) const UTF8_BOM: &str = "\u{feff}";

pub type TransferResult<T> = Result<T, TransferError>;

#[derive(Debug)]
pub enum TransferError {
    Io(std::io::Error),
    Csv(csv::Error),
    Repo(RepoError),
    /// Export was asked to write an empty record set.
    NothingToExport,
}

impl Display for TransferError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "file error: {err}"),
            Self::Csv(err) => write!(f, "csv error: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::NothingToExport => write!(f, "there are no records to export"),
        }
    }
}

impl Error for TransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Csv(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::NothingToExport => None,
        }
    }
}

impl From<std::io::Error> for TransferError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<csv::Error> for TransferError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<RepoError> for TransferError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}
