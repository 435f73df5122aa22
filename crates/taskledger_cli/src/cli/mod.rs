//! Command-line surface of `taskledger`.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use taskledger_core::{TaskForm, TaskId, TaskRecord};

#[derive(Parser, Debug)]
#[command(
    name = "taskledger",
    version,
    about = "Track pending administrative actions per student",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// SQLite database file (overrides TASKLEDGER_DB)
    #[arg(long, value_name = "PATH", global = true)]
    pub db: Option<PathBuf>,

    /// Absolute directory for rolling log files (overrides TASKLEDGER_LOG_DIR)
    #[arg(long = "log-dir", value_name = "DIR", global = true)]
    pub log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error (overrides TASKLEDGER_LOG_LEVEL)
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Legacy CSV imported on startup into an empty store
    #[arg(long = "legacy-csv", value_name = "PATH", global = true)]
    pub legacy_csv: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Register a new pending action
    ///
    /// Example: taskledger add --national-id 12345678 --first-name Ana --last-name Pérez
    ///          --course "5° Grado" --shift Mañana --action "Entregar partida"
    Add(TaskFields),
    /// Change the fields of an existing record; omitted fields keep their value
    ///
    /// Example: taskledger edit 3 --course "6° Grado"
    Edit {
        id: TaskId,
        #[command(flatten)]
        fields: EditFields,
    },
    /// Mark a record as completed
    Complete { id: TaskId },
    /// Move a completed record back to pending
    Reopen { id: TaskId },
    /// Delete a record
    Delete { id: TaskId },
    /// Show every field of one record
    Show { id: TaskId },
    /// List records split into pending and completed
    List {
        #[arg(long, value_enum, default_value_t = ListFilter::All)]
        status: ListFilter,
    },
    /// Case-insensitive search across every text field
    ///
    /// Example: taskledger search grado
    Search { query: String },
    /// Export every record as CSV
    Export { path: PathBuf },
    /// Print counts by status, course and shift
    Report,
    /// Seed an empty store from a legacy CSV file
    ImportLegacy { path: Option<PathBuf> },
    /// Print the board and refresh it periodically
    ///
    /// Example: taskledger watch --interval 10 --query grado
    Watch {
        /// Seconds between refreshes (defaults to TASKLEDGER_REFRESH_SECS)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        interval: Option<u64>,
        /// Search to keep applied across refreshes
        #[arg(long)]
        query: Option<String>,
        /// Stop after this many refreshes
        #[arg(long)]
        ticks: Option<u64>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ListFilter {
    All,
    Pending,
    Completed,
}

#[derive(Args, Debug)]
pub struct TaskFields {
    #[arg(long = "national-id")]
    pub national_id: String,
    #[arg(long = "first-name")]
    pub first_name: String,
    #[arg(long = "last-name")]
    pub last_name: String,
    #[arg(long)]
    pub course: String,
    #[arg(long)]
    pub shift: String,
    #[arg(long)]
    pub action: String,
}

impl From<TaskFields> for TaskForm {
    fn from(fields: TaskFields) -> Self {
        Self {
            national_id: fields.national_id,
            first_name: fields.first_name,
            last_name: fields.last_name,
            course: fields.course,
            shift: fields.shift,
            pending_action: fields.action,
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct EditFields {
    #[arg(long = "national-id")]
    pub national_id: Option<String>,
    #[arg(long = "first-name")]
    pub first_name: Option<String>,
    #[arg(long = "last-name")]
    pub last_name: Option<String>,
    #[arg(long)]
    pub course: Option<String>,
    #[arg(long)]
    pub shift: Option<String>,
    #[arg(long)]
    pub action: Option<String>,
}

impl EditFields {
    /// Builds a full form from `current`, replacing only the supplied fields.
    pub fn apply_to(self, current: &TaskRecord) -> TaskForm {
        TaskForm {
            national_id: self.national_id.unwrap_or_else(|| current.national_id.clone()),
            first_name: self.first_name.unwrap_or_else(|| current.first_name.clone()),
            last_name: self.last_name.unwrap_or_else(|| current.last_name.clone()),
            course: self.course.unwrap_or_else(|| current.course.clone()),
            shift: self.shift.unwrap_or_else(|| current.shift.clone()),
            pending_action: self
                .action
                .unwrap_or_else(|| current.pending_action.clone()),
        }
    }
}
