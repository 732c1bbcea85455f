//! String record use-case service.
//!
//! # Responsibility
//! - Create, look up, list and delete stored strings.
//! - Validate create request bodies before touching storage.
//!
//! # Invariants
//! - A duplicate value is rejected before any mutation.
//! - Stored properties always come from `StringProperties::compute`.
//! - Log events carry record ids and status only, never the value text.

use crate::model::properties::StringProperties;
use crate::model::record::{record_id_for, StringRecord};
use crate::repo::string_repo::{RepoError, StringRepository};
use crate::service::status_label;
use log::{info, warn};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for string record use-cases.
#[derive(Debug)]
pub enum StringServiceError {
    /// Create body is not an object with a `value` field.
    MissingValue,
    /// `value` is empty or whitespace only.
    BlankValue,
    /// `value` is present but is not a JSON string; carries the found type.
    InvalidValueType(&'static str),
    /// A record with this value already exists.
    Conflict(String),
    /// No record holds this value.
    NotFound(String),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl StringServiceError {
    /// HTTP-equivalent status code.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MissingValue | Self::BlankValue => 400,
            Self::InvalidValueType(_) => 422,
            Self::Conflict(_) => 409,
            Self::NotFound(_) => 404,
            Self::Repo(_) => 500,
        }
    }

    /// Status code with reason phrase, e.g. `409 Conflict`.
    pub fn status_label(&self) -> String {
        status_label(self.status_code())
    }

    /// Stable machine-readable code used in log events.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingValue => "missing_value",
            Self::BlankValue => "blank_value",
            Self::InvalidValueType(_) => "invalid_value_type",
            Self::Conflict(_) => "duplicate_value",
            Self::NotFound(_) => "string_not_found",
            Self::Repo(_) => "storage_failure",
        }
    }
}

impl Display for StringServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingValue => write!(f, "Invalid request body or missing 'value' field"),
            Self::BlankValue => write!(f, "'value' may not be blank"),
            Self::InvalidValueType(found) => {
                write!(f, "Invalid data type for 'value' (must be string, got {found})")
            }
            Self::Conflict(_) => write!(f, "String already exists in the system"),
            Self::NotFound(_) => write!(f, "String does not exist in the system"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StringServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for StringServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Duplicate(existing) => Self::Conflict(existing),
            RepoError::NotFound(missing) => Self::NotFound(missing),
            other => Self::Repo(other),
        }
    }
}

/// Extracts the string to store from a JSON create body.
///
/// # Errors
/// - [`StringServiceError::MissingValue`] when the body is not an object or
///   has no `value` field.
/// - [`StringServiceError::InvalidValueType`] when `value` is not a string.
/// - [`StringServiceError::BlankValue`] when `value` is empty after trimming.
pub fn parse_create_request(body: &Value) -> Result<String, StringServiceError> {
    let value = body
        .as_object()
        .and_then(|object| object.get("value"))
        .ok_or(StringServiceError::MissingValue)?;

    match value {
        Value::String(text) => {
            ensure_not_blank(text)?;
            Ok(text.clone())
        }
        other => Err(StringServiceError::InvalidValueType(json_type_name(other))),
    }
}

fn ensure_not_blank(value: &str) -> Result<(), StringServiceError> {
    if value.trim().is_empty() {
        return Err(StringServiceError::BlankValue);
    }
    Ok(())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Use-case service for the string record lifecycle.
pub struct StringService<R: StringRepository> {
    repo: R,
}

impl<R: StringRepository> StringService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Analyzes and stores a new string.
    ///
    /// # Errors
    /// - [`StringServiceError::BlankValue`] for empty or whitespace-only text.
    /// - [`StringServiceError::Conflict`] when the value is already stored;
    ///   storage is left untouched.
    pub fn create_string(&self, value: &str) -> Result<StringRecord, StringServiceError> {
        ensure_not_blank(value).inspect_err(|err| {
            warn!(
                "event=string_create module=service status=rejected error_code={}",
                err.error_code()
            );
        })?;
        if self.repo.record_exists(value)? {
            warn!(
                "event=string_create module=service status=rejected error_code=duplicate_value"
            );
            return Err(StringServiceError::Conflict(value.to_string()));
        }

        let properties = StringProperties::compute(value);
        let id = record_id_for(value);
        let record = self.repo.insert_record(value, &id, &properties)?;
        info!(
            "event=string_create module=service status=ok id={} length={}",
            record.id, record.properties.length
        );
        Ok(record)
    }

    /// Validates a JSON create body and stores its `value`.
    pub fn create_from_json(&self, body: &Value) -> Result<StringRecord, StringServiceError> {
        let value = parse_create_request(body).inspect_err(|err| {
            warn!(
                "event=string_create module=service status=rejected error_code={}",
                err.error_code()
            );
        })?;
        self.create_string(&value)
    }

    /// Gets one record by exact value.
    pub fn get_string(&self, value: &str) -> Result<StringRecord, StringServiceError> {
        self.repo
            .get_record_by_value(value)?
            .ok_or_else(|| StringServiceError::NotFound(value.to_string()))
    }

    /// Lists every stored record in storage order.
    pub fn list_strings(&self) -> Result<Vec<StringRecord>, StringServiceError> {
        Ok(self.repo.fetch_all_records()?)
    }

    /// Deletes one record by exact value.
    pub fn delete_string(&self, value: &str) -> Result<(), StringServiceError> {
        self.repo.delete_record_by_value(value)?;
        info!("event=string_delete module=service status=ok id={}", record_id_for(value));
        Ok(())
    }
}
