//! Filter application over stored records.
//!
//! # Responsibility
//! - Apply every present filter key as an independent predicate.
//!
//! # Invariants
//! - Predicates are AND-combined; absent keys impose no constraint.
//! - Output preserves input order. No paging, sorting or limit.
//! - `contains_character` tests `value` case-insensitively; the stored
//!   frequency map is not consulted.

use crate::model::filter::{fold_char, FilterSet};
use crate::model::record::StringRecord;

/// Returns the records matching every filter in `filters`, in input order.
pub fn evaluate(filters: &FilterSet, records: &[StringRecord]) -> Vec<StringRecord> {
    records
        .iter()
        .filter(|record| matches(filters, record))
        .cloned()
        .collect()
}

/// Whether a single record satisfies every filter in `filters`.
pub fn matches(filters: &FilterSet, record: &StringRecord) -> bool {
    let props = &record.properties;

    if let Some(expected) = filters.is_palindrome {
        if props.is_palindrome != expected {
            return false;
        }
    }
    if let Some(expected) = filters.word_count {
        if props.word_count != expected {
            return false;
        }
    }
    if let Some(min) = filters.min_length {
        if props.length < min {
            return false;
        }
    }
    if let Some(max) = filters.max_length {
        if props.length > max {
            return false;
        }
    }
    if let Some(needle) = filters.contains_character {
        if !contains_ignore_case(&record.value, needle) {
            return false;
        }
    }

    true
}

fn contains_ignore_case(value: &str, needle: char) -> bool {
    let needle = fold_char(needle);
    value.chars().any(|ch| fold_char(ch) == needle)
}

#[cfg(test)]
mod tests {
    use super::{evaluate, matches};
    use crate::model::filter::FilterSet;
    use crate::model::record::StringRecord;

    fn records(values: &[&str]) -> Vec<StringRecord> {
        values
            .iter()
            .enumerate()
            .map(|(index, value)| StringRecord::from_value(*value, index as i64))
            .collect()
    }

    fn values(records: &[StringRecord]) -> Vec<&str> {
        records.iter().map(|record| record.value.as_str()).collect()
    }

    #[test]
    fn empty_filter_set_matches_everything() {
        let input = records(&["a", "bb", "c c"]);
        assert_eq!(evaluate(&FilterSet::default(), &input), input);
    }

    #[test]
    fn contains_character_is_case_insensitive_and_order_preserving() {
        let input = records(&["Zebra", "apple", "lazy", "ZZZ", "none"]);
        let filters = FilterSet {
            contains_character: Some('z'),
            ..FilterSet::default()
        };
        assert_eq!(values(&evaluate(&filters, &input)), vec!["Zebra", "lazy", "ZZZ"]);
    }

    #[test]
    fn length_bounds_are_inclusive() {
        let input = records(&["abc", "abcd", "abcde", "abcdef"]);
        let filters = FilterSet {
            min_length: Some(4),
            max_length: Some(5),
            ..FilterSet::default()
        };
        assert_eq!(values(&evaluate(&filters, &input)), vec!["abcd", "abcde"]);
    }

    #[test]
    fn predicates_are_conjunctive() {
        let input = records(&["racecar", "level up", "kayak", "noon moon"]);
        let filters = FilterSet {
            is_palindrome: Some(true),
            word_count: Some(1),
            contains_character: Some('K'),
            ..FilterSet::default()
        };
        assert_eq!(values(&evaluate(&filters, &input)), vec!["kayak"]);
    }

    #[test]
    fn non_palindrome_filter_excludes_palindromes() {
        let record = StringRecord::from_value("abba", 0);
        let filters = FilterSet {
            is_palindrome: Some(false),
            ..FilterSet::default()
        };
        assert!(!matches(&filters, &record));
    }
}
