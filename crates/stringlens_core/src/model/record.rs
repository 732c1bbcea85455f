//! Stored string record.
//!
//! # Responsibility
//! - Define the canonical record shape shared by storage, services and
//!   query evaluation.
//! - Validate that identity and derived properties agree with `value`.
//!
//! # Invariants
//! - `id` equals `properties.sha256_hash`, which is the SHA-256 of `value`.
//! - `properties` is always a full recomputation from `value`.
//! - `created_at` is assigned once by storage and never changes.

use crate::model::properties::{sha256_hex, StringProperties};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable record identifier: the hex content hash of the value.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type RecordId = String;

/// Returns the identifier a record holding `value` will carry.
pub fn record_id_for(value: &str) -> RecordId {
    sha256_hex(value)
}

/// Canonical stored string together with its derived properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringRecord {
    pub id: RecordId,
    /// Unique, case-sensitive text.
    pub value: String,
    pub properties: StringProperties,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

/// Consistency violations detected by [`StringRecord::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValidationError {
    /// `id` does not equal the content hash of `value`.
    IdMismatch { id: RecordId, expected: RecordId },
    /// Stored properties differ from a fresh computation.
    StaleProperties { id: RecordId },
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IdMismatch { id, expected } => {
                write!(f, "record id `{id}` does not match content hash `{expected}`")
            }
            Self::StaleProperties { id } => {
                write!(f, "record `{id}` carries properties inconsistent with its value")
            }
        }
    }
}

impl Error for RecordValidationError {}

impl StringRecord {
    /// Builds a record from a value, computing identity and properties.
    pub fn from_value(value: impl Into<String>, created_at: i64) -> Self {
        let value = value.into();
        let properties = StringProperties::compute(&value);
        Self {
            id: properties.sha256_hash.clone(),
            value,
            properties,
            created_at,
        }
    }

    /// Checks identity and derived properties against `value`.
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        let expected = StringProperties::compute(&self.value);
        if self.id != expected.sha256_hash {
            return Err(RecordValidationError::IdMismatch {
                id: self.id.clone(),
                expected: expected.sha256_hash,
            });
        }
        if self.properties != expected {
            return Err(RecordValidationError::StaleProperties {
                id: self.id.clone(),
            });
        }
        Ok(())
    }
}
