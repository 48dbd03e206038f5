//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the durable-record access contract for the progress store.
//! - Isolate SQLite and JSON encoding details from service orchestration.
//!
//! # Invariants
//! - Repository writes validate layouts before persistence.
//! - Repository APIs return semantic errors (`InvalidData`) in addition to
//!   DB transport errors.

pub mod progress_repo;
