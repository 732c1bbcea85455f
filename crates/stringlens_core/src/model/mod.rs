//! Domain model for stored strings and query filters.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Own the pure property computation every record is derived from.
//!
//! # Invariants
//! - Every record is identified by the content hash of its value.
//! - Records are immutable once stored; there are no partial updates.

pub mod filter;
pub mod properties;
pub mod record;
