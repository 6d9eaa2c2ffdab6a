//! Record store abstractions and implementations.
//!
//! # Responsibility
//! - Define the record store contract used by the synchronizer.
//! - Isolate SQLite query details from orchestration.
//!
//! # Invariants
//! - Store order is insertion order; edits never reorder records.
//! - Name lookups return the first match in store order.

pub mod memory_repo;
pub mod user_repo;
