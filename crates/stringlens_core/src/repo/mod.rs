//! Repository layer: the storage capability behind services.
//!
//! # Responsibility
//! - Define the `StringRepository` contract.
//! - Provide SQLite and in-memory implementations.
//!
//! # Invariants
//! - Repository writes validate record consistency before persistence.
//! - Repository APIs return semantic errors (`Duplicate`, `NotFound`) in
//!   addition to DB transport errors.

pub mod memory_repo;
pub mod string_repo;
