//! Domain model for friend records and their resolved positions.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep display state (markers) out of the record shape.
//!
//! # Invariants
//! - Every record is identified by a stable `UserId`.
//! - Coordinates, when present, belong to the current `location` text.

pub mod geo;
pub mod user;
