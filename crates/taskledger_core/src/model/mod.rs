//! Domain model for student pending-action records.
//!
//! # Responsibility
//! - Define the canonical record persisted by the task store.
//! - Own status transition rules shared by every caller.
//!
//! # Invariants
//! - Every stored record is identified by a store-assigned `TaskId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod task;
