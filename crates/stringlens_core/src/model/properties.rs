//! Derived string properties.
//!
//! # Responsibility
//! - Compute the fixed property set stored next to every string value.
//! - Provide the content hash that doubles as record identity.
//!
//! # Invariants
//! - Computation is pure and deterministic; no normalization is applied.
//! - `sha256_hash` is the lowercase hex SHA-256 of the UTF-8 value.
//! - `character_frequency_map` is ordered by character so serialized output
//!   is byte-stable.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashSet};

/// Descriptive properties derived from one string value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringProperties {
    /// Number of characters (Unicode scalar values), not bytes.
    pub length: usize,
    /// Exact, case-sensitive equality with the reversed value.
    pub is_palindrome: bool,
    /// Number of distinct characters.
    pub unique_characters: usize,
    /// Number of whitespace-delimited tokens.
    pub word_count: usize,
    pub sha256_hash: String,
    /// Occurrences of every character, whitespace and punctuation included.
    pub character_frequency_map: BTreeMap<char, usize>,
}

impl StringProperties {
    /// Computes every property for `value`.
    ///
    /// Never fails: the empty string yields length 0, a palindrome flag of
    /// `true`, zero words, zero unique characters and an empty map.
    pub fn compute(value: &str) -> Self {
        let character_frequency_map = character_frequency(value);
        Self {
            length: value.chars().count(),
            is_palindrome: is_palindrome(value),
            unique_characters: unique_characters(value),
            word_count: word_count(value),
            sha256_hash: sha256_hex(value),
            character_frequency_map,
        }
    }
}

/// Returns whether `value` reads the same reversed, including case and spaces.
pub fn is_palindrome(value: &str) -> bool {
    value.chars().eq(value.chars().rev())
}

/// Counts distinct characters without case folding.
pub fn unique_characters(value: &str) -> usize {
    value.chars().collect::<HashSet<_>>().len()
}

/// Counts tokens separated by runs of whitespace.
pub fn word_count(value: &str) -> usize {
    value.split_whitespace().count()
}

/// Lowercase hex SHA-256 digest of the UTF-8 encoding of `value`.
pub fn sha256_hex(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn character_frequency(value: &str) -> BTreeMap<char, usize> {
    let mut frequency = BTreeMap::new();
    for ch in value.chars() {
        *frequency.entry(ch).or_insert(0) += 1;
    }
    frequency
}
