//! String repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Define the storage capability consumed by services.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths validate identity and properties before SQL mutations.
//! - Read paths reject persisted rows whose properties disagree with their
//!   value instead of masking them.
//! - `fetch_all_records` returns records in insertion order.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::properties::StringProperties;
use crate::model::record::{RecordValidationError, StringRecord};
use rusqlite::{ffi, params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const STRING_SELECT_SQL: &str = "SELECT
    id,
    value,
    properties,
    created_at
FROM strings";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for string persistence and lookup operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(RecordValidationError),
    Db(DbError),
    /// A record with the same value already exists.
    Duplicate(String),
    /// No record holds the given value.
    NotFound(String),
    InvalidData(String),
    Serialization(serde_json::Error),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Duplicate(_) => write!(f, "string already exists"),
            Self::NotFound(_) => write!(f, "string not found"),
            Self::InvalidData(message) => write!(f, "invalid persisted string data: {message}"),
            Self::Serialization(err) => write!(f, "properties serialization failed: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::Duplicate(_) | Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<RecordValidationError> for RepoError {
    fn from(value: RecordValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Storage capability for string records.
///
/// Services depend on this trait only, so query logic can run against
/// in-memory fixtures as well as SQLite.
pub trait StringRepository {
    /// Returns every stored record in a stable order. No filtering.
    fn fetch_all_records(&self) -> RepoResult<Vec<StringRecord>>;
    /// Whether a record with exactly this (case-sensitive) value exists.
    fn record_exists(&self, value: &str) -> RepoResult<bool>;
    /// Stores a new record and returns it with its assigned `created_at`.
    fn insert_record(
        &self,
        value: &str,
        id: &str,
        properties: &StringProperties,
    ) -> RepoResult<StringRecord>;
    fn get_record_by_value(&self, value: &str) -> RepoResult<Option<StringRecord>>;
    /// Removes the record holding `value`; `NotFound` when absent.
    fn delete_record_by_value(&self, value: &str) -> RepoResult<()>;
}

impl<R: StringRepository + ?Sized> StringRepository for &R {
    fn fetch_all_records(&self) -> RepoResult<Vec<StringRecord>> {
        (**self).fetch_all_records()
    }

    fn record_exists(&self, value: &str) -> RepoResult<bool> {
        (**self).record_exists(value)
    }

    fn insert_record(
        &self,
        value: &str,
        id: &str,
        properties: &StringProperties,
    ) -> RepoResult<StringRecord> {
        (**self).insert_record(value, id, properties)
    }

    fn get_record_by_value(&self, value: &str) -> RepoResult<Option<StringRecord>> {
        (**self).get_record_by_value(value)
    }

    fn delete_record_by_value(&self, value: &str) -> RepoResult<()> {
        (**self).delete_record_by_value(value)
    }
}

/// SQLite-backed string repository.
pub struct SqliteStringRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStringRepository<'conn> {
    /// Wraps a connection whose schema is fully migrated.
    ///
    /// # Errors
    /// - [`RepoError::InvalidData`] when the connection was not opened through
    ///   [`crate::db::open_db`] or [`crate::db::open_db_in_memory`].
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
        if version != latest_version() {
            return Err(RepoError::InvalidData(format!(
                "connection schema version {version} does not match expected {}",
                latest_version()
            )));
        }
        Ok(Self { conn })
    }

    fn get_record_by_id(&self, id: &str) -> RepoResult<Option<StringRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STRING_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_string_row(row)?));
        }
        Ok(None)
    }
}

impl StringRepository for SqliteStringRepository<'_> {
    fn fetch_all_records(&self) -> RepoResult<Vec<StringRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STRING_SELECT_SQL} ORDER BY rowid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();

        while let Some(row) = rows.next()? {
            records.push(parse_string_row(row)?);
        }

        Ok(records)
    }

    fn record_exists(&self, value: &str) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM strings WHERE value = ?1);",
            [value],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn insert_record(
        &self,
        value: &str,
        id: &str,
        properties: &StringProperties,
    ) -> RepoResult<StringRecord> {
        let candidate = StringRecord {
            id: id.to_string(),
            value: value.to_string(),
            properties: properties.clone(),
            created_at: 0,
        };
        candidate.validate()?;

        let properties_json = serde_json::to_string(properties)?;
        let inserted = self.conn.execute(
            "INSERT INTO strings (id, value, properties) VALUES (?1, ?2, ?3);",
            params![id, value, properties_json],
        );
        if let Err(err) = inserted {
            if is_unique_violation(&err) {
                return Err(RepoError::Duplicate(value.to_string()));
            }
            return Err(err.into());
        }

        self.get_record_by_id(id)?.ok_or_else(|| {
            RepoError::InvalidData("inserted string not found in read-back".to_string())
        })
    }

    fn get_record_by_value(&self, value: &str) -> RepoResult<Option<StringRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STRING_SELECT_SQL} WHERE value = ?1;"))?;
        stmt.query_row([value], |row| Ok(parse_string_row(row)))
            .optional()?
            .transpose()
    }

    fn delete_record_by_value(&self, value: &str) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM strings WHERE value = ?1;", [value])?;

        if changed == 0 {
            return Err(RepoError::NotFound(value.to_string()));
        }

        Ok(())
    }
}

fn parse_string_row(row: &Row<'_>) -> RepoResult<StringRecord> {
    let id: String = row.get("id")?;
    let properties_text: String = row.get("properties")?;
    let properties: StringProperties = serde_json::from_str(&properties_text).map_err(|err| {
        RepoError::InvalidData(format!("invalid properties JSON for string `{id}`: {err}"))
    })?;

    let record = StringRecord {
        id,
        value: row.get("value")?,
        properties,
        created_at: row.get("created_at")?,
    };
    record
        .validate()
        .map_err(|err| RepoError::InvalidData(err.to_string()))?;
    Ok(record)
}

/// Only `UNIQUE(value)` and the `id` primary key count; NOT NULL and other
/// constraint failures stay plain SQLite errors.
fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                || failure.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

#[cfg(test)]
mod tests {
    use super::is_unique_violation;
    use crate::db::open_db_in_memory;

    const INSERT_RAW: &str = "INSERT INTO strings (id, value, properties) VALUES (?1, ?2, ?3);";

    #[test]
    fn only_uniqueness_failures_count_as_duplicates() {
        let conn = open_db_in_memory().unwrap();
        conn.execute(INSERT_RAW, ["id-1", "taken", "{}"]).unwrap();

        let same_value = conn
            .execute(INSERT_RAW, ["id-2", "taken", "{}"])
            .unwrap_err();
        assert!(is_unique_violation(&same_value));

        let same_id = conn
            .execute(INSERT_RAW, ["id-1", "other", "{}"])
            .unwrap_err();
        assert!(is_unique_violation(&same_id));

        let missing_properties = conn
            .execute(
                INSERT_RAW,
                rusqlite::params!["id-3", "fresh", Option::<String>::None],
            )
            .unwrap_err();
        assert!(!is_unique_violation(&missing_properties));
    }
}
