//! Query primitives: natural-language translation and filter evaluation.
//!
//! # Responsibility
//! - Turn free text into a structured `FilterSet`.
//! - Apply a `FilterSet` to a record collection.
//!
//! # Invariants
//! - Both primitives are pure; neither touches storage.

pub mod evaluator;
pub mod translator;
