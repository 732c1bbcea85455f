//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls and query primitives into use-case APIs.
//! - Map failures onto a small, distinguishable error taxonomy with
//!   HTTP-equivalent status codes.
//!
//! # Invariants
//! - Services never bypass repository validation contracts.
//! - Services hold no per-request state.

pub mod query_service;
pub mod string_service;

/// Formats a status code the way responses label errors, e.g. `409 Conflict`.
pub fn status_label(code: u16) -> String {
    let reason = match code {
        400 => "Bad Request",
        404 => "Not Found",
        409 => "Conflict",
        422 => "Unprocessable Entity",
        500 => "Internal Server Error",
        _ => "Unknown Status",
    };
    format!("{code} {reason}")
}
