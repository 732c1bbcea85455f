//! Filter vocabulary shared by structured and natural-language queries.
//!
//! # Responsibility
//! - Define the fixed set of filter keys and their value types.
//! - Carry per-request filter state as an explicit value.
//!
//! # Invariants
//! - Keys iterate and serialize in vocabulary order:
//!   `is_palindrome`, `word_count`, `min_length`, `max_length`,
//!   `contains_character`.
//! - A key only ever holds a value of its declared type.
//! - `contains_character` is stored lowercased.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One entry of the fixed filter vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKey {
    IsPalindrome,
    WordCount,
    MinLength,
    MaxLength,
    ContainsCharacter,
}

impl FilterKey {
    /// Every key in vocabulary order.
    pub const ALL: [FilterKey; 5] = [
        FilterKey::IsPalindrome,
        FilterKey::WordCount,
        FilterKey::MinLength,
        FilterKey::MaxLength,
        FilterKey::ContainsCharacter,
    ];

    /// Wire name of the key.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::IsPalindrome => "is_palindrome",
            Self::WordCount => "word_count",
            Self::MinLength => "min_length",
            Self::MaxLength => "max_length",
            Self::ContainsCharacter => "contains_character",
        }
    }
}

impl Display for FilterKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Concrete value for one filter key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterValue {
    Bool(bool),
    Count(usize),
    Char(char),
}

/// Returned when a value does not have the type its key declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterValueMismatch {
    pub key: FilterKey,
    pub value: FilterValue,
}

impl Display for FilterValueMismatch {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "value {:?} is not valid for filter `{}`", self.value, self.key)
    }
}

impl Error for FilterValueMismatch {}

/// Optional constraints over stored records; absent fields are unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_palindrome: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contains_character: Option<char>,
}

impl FilterSet {
    /// Creates an empty filter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    /// - Returns [`FilterValueMismatch`] when `value` has the wrong type for
    ///   `key`; the set is left unchanged.
    pub fn set(&mut self, key: FilterKey, value: FilterValue) -> Result<(), FilterValueMismatch> {
        match (key, value) {
            (FilterKey::IsPalindrome, FilterValue::Bool(flag)) => self.is_palindrome = Some(flag),
            (FilterKey::WordCount, FilterValue::Count(count)) => self.word_count = Some(count),
            (FilterKey::MinLength, FilterValue::Count(count)) => self.min_length = Some(count),
            (FilterKey::MaxLength, FilterValue::Count(count)) => self.max_length = Some(count),
            (FilterKey::ContainsCharacter, FilterValue::Char(ch)) => {
                self.contains_character = Some(fold_char(ch));
            }
            (key, value) => return Err(FilterValueMismatch { key, value }),
        }
        Ok(())
    }

    /// Returns the value stored under `key`, if any.
    pub fn get(&self, key: FilterKey) -> Option<FilterValue> {
        match key {
            FilterKey::IsPalindrome => self.is_palindrome.map(FilterValue::Bool),
            FilterKey::WordCount => self.word_count.map(FilterValue::Count),
            FilterKey::MinLength => self.min_length.map(FilterValue::Count),
            FilterKey::MaxLength => self.max_length.map(FilterValue::Count),
            FilterKey::ContainsCharacter => self.contains_character.map(FilterValue::Char),
        }
    }

    /// Present keys, in vocabulary order.
    pub fn keys(&self) -> Vec<FilterKey> {
        FilterKey::ALL
            .into_iter()
            .filter(|key| self.get(*key).is_some())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.keys().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether both length bounds are present.
    ///
    /// This is a policy contradiction regardless of whether the bounds are
    /// numerically satisfiable.
    pub fn has_length_contradiction(&self) -> bool {
        self.min_length.is_some() && self.max_length.is_some()
    }

    /// Comma-separated present key names, for log events.
    pub fn key_summary(&self) -> String {
        let keys = self.keys();
        if keys.is_empty() {
            return "none".to_string();
        }
        keys.iter()
            .map(|key| key.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Original free-text query paired with the filters derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpretedQuery {
    pub original: String,
    pub parsed_filters: FilterSet,
}

/// Lowercases `ch` when the lowercase form is a single character.
pub(crate) fn fold_char(ch: char) -> char {
    let mut lower = ch.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(single), None) => single,
        _ => ch,
    }
}
