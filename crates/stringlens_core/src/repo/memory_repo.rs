//! In-memory string repository.
//!
//! Reference implementation of [`StringRepository`] used for fixtures and
//! runs that need no persistence. Records live in a `Vec` behind a
//! `parking_lot::RwLock`, so the repository is `Sync` and can be shared
//! between threads.
//!
//! ## Limitations
//!
//! - No durability: everything is dropped with the repository.
//! - Lookups by value are linear scans.

use crate::model::properties::StringProperties;
use crate::model::record::StringRecord;
use crate::repo::string_repo::{RepoError, RepoResult, StringRepository};
use parking_lot::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// Volatile record store preserving insertion order.
#[derive(Debug, Default)]
pub struct MemoryStringRepository {
    records: RwLock<Vec<StringRecord>>,
}

impl MemoryStringRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the repository with pre-built records, kept in the given order.
    ///
    /// # Errors
    /// - [`RepoError::Validation`] when a record is internally inconsistent.
    /// - [`RepoError::Duplicate`] when two records share a value.
    pub fn with_records(records: Vec<StringRecord>) -> RepoResult<Self> {
        let repo = Self::new();
        {
            let mut guard = repo.records.write();
            for record in records {
                record.validate()?;
                if guard.iter().any(|existing| existing.value == record.value) {
                    return Err(RepoError::Duplicate(record.value));
                }
                guard.push(record);
            }
        }
        Ok(repo)
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl StringRepository for MemoryStringRepository {
    fn fetch_all_records(&self) -> RepoResult<Vec<StringRecord>> {
        Ok(self.records.read().clone())
    }

    fn record_exists(&self, value: &str) -> RepoResult<bool> {
        Ok(self.records.read().iter().any(|record| record.value == value))
    }

    fn insert_record(
        &self,
        value: &str,
        id: &str,
        properties: &StringProperties,
    ) -> RepoResult<StringRecord> {
        let record = StringRecord {
            id: id.to_string(),
            value: value.to_string(),
            properties: properties.clone(),
            created_at: now_epoch_ms(),
        };
        record.validate()?;

        let mut guard = self.records.write();
        if guard.iter().any(|existing| existing.value == value) {
            return Err(RepoError::Duplicate(value.to_string()));
        }
        guard.push(record.clone());
        Ok(record)
    }

    fn get_record_by_value(&self, value: &str) -> RepoResult<Option<StringRecord>> {
        Ok(self
            .records
            .read()
            .iter()
            .find(|record| record.value == value)
            .cloned())
    }

    fn delete_record_by_value(&self, value: &str) -> RepoResult<()> {
        let mut guard = self.records.write();
        let Some(index) = guard.iter().position(|record| record.value == value) else {
            return Err(RepoError::NotFound(value.to_string()));
        };
        guard.remove(index);
        Ok(())
    }
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
