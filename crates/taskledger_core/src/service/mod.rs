//! Controller glue between the presentation layer and the store.
//!
//! # Responsibility
//! - Turn form submissions and list actions into repository calls.
//! - Keep the pending/completed view partitions in sync with the store.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Service layer remains storage-agnostic.

pub mod task_board;
