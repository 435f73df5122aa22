//! Core domain logic for taskledger.
//! This crate is the single source of truth for business invariants.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod refresh;
pub mod report;
pub mod repo;
pub mod service;
pub mod transfer;
pub mod validation;

pub use config::{AppConfig, ConfigError, ConfigOverrides};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::task::{TaskId, TaskRecord, TaskStatus, TaskValidationError};
pub use refresh::{RefreshPoller, RefreshTick};
pub use report::TaskReport;
pub use repo::task_repo::{
    RepoError, RepoResult, SqliteTaskRepository, TaskRepository, UpdateOutcome,
};
pub use service::task_board::{BoardError, BoardResult, TaskBoard};
pub use transfer::{ImportOutcome, TransferError};
pub use validation::{FieldError, TaskForm};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
