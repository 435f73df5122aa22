//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the Record Store contract for task records.
//! - Isolate SQLite query details from controller orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `TaskRecord::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`, `DuplicateKey`) in
//!   addition to DB transport errors.

pub mod task_repo;
