//! Query orchestration over stored strings.
//!
//! # Responsibility
//! - Validate structured filter requests into a `FilterSet`.
//! - Translate natural-language queries and enforce the empty-result and
//!   contradiction policies.
//! - Evaluate filters against the repository snapshot and package results.
//!
//! # Invariants
//! - An empty translation is "query not understood", never "match all".
//! - A translation carrying both length bounds is rejected, never resolved.
//! - Structured parse failures surface as one validation error.
//! - Log events carry filter keys and counts only, never query text.

use crate::model::filter::{fold_char, FilterKey, FilterSet, InterpretedQuery};
use crate::model::record::StringRecord;
use crate::query::evaluator::evaluate;
use crate::query::translator::translate;
use crate::repo::string_repo::{RepoError, StringRepository};
use crate::service::status_label;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Service error for query use-cases.
#[derive(Debug)]
pub enum QueryServiceError {
    /// Missing or mistyped request field.
    Validation(String),
    /// No translator rule fired for the query text.
    UnparseableQuery(String),
    /// Translation produced both `min_length` and `max_length`.
    ConflictingFilters { query: String, filters: FilterSet },
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl QueryServiceError {
    /// HTTP-equivalent status code.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::UnparseableQuery(_) => 400,
            Self::ConflictingFilters { .. } => 422,
            Self::Repo(_) => 500,
        }
    }

    /// Status code with reason phrase, e.g. `422 Unprocessable Entity`.
    pub fn status_label(&self) -> String {
        status_label(self.status_code())
    }

    /// Stable machine-readable code used in log events.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "invalid_filter",
            Self::UnparseableQuery(_) => "unparseable_query",
            Self::ConflictingFilters { .. } => "conflicting_filters",
            Self::Repo(_) => "storage_failure",
        }
    }
}

impl Display for QueryServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "{message}"),
            Self::UnparseableQuery(_) => write!(f, "Unable to parse natural language query"),
            Self::ConflictingFilters { filters, .. } => write!(
                f,
                "Query parsed but resulted in conflicting filters: {}",
                filters.key_summary()
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for QueryServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for QueryServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Raw structured filter parameters, as received from a query string.
///
/// Every field is optional; `None` leaves the filter unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuredFilterRequest {
    pub is_palindrome: Option<String>,
    pub min_length: Option<String>,
    pub max_length: Option<String>,
    pub word_count: Option<String>,
    pub contains_character: Option<String>,
}

impl StructuredFilterRequest {
    /// Parses every provided field into a typed filter set.
    ///
    /// Booleans accept `true`, `false`, `1` or `0` (case-insensitive);
    /// integers must be non-negative decimals; `contains_character` must be
    /// exactly one character.
    ///
    /// # Errors
    /// - [`QueryServiceError::Validation`] naming the first invalid field.
    pub fn to_filter_set(&self) -> Result<FilterSet, QueryServiceError> {
        Ok(FilterSet {
            is_palindrome: self
                .is_palindrome
                .as_deref()
                .map(|raw| parse_bool(FilterKey::IsPalindrome, raw))
                .transpose()?,
            word_count: self
                .word_count
                .as_deref()
                .map(|raw| parse_count(FilterKey::WordCount, raw))
                .transpose()?,
            min_length: self
                .min_length
                .as_deref()
                .map(|raw| parse_count(FilterKey::MinLength, raw))
                .transpose()?,
            max_length: self
                .max_length
                .as_deref()
                .map(|raw| parse_count(FilterKey::MaxLength, raw))
                .transpose()?,
            contains_character: self
                .contains_character
                .as_deref()
                .map(parse_char)
                .transpose()?,
        })
    }
}

/// Response for structured filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructuredQueryResponse {
    pub data: Vec<StringRecord>,
    pub count: usize,
    pub filters_applied: FilterSet,
}

/// Response for natural-language filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NaturalLanguageResponse {
    pub data: Vec<StringRecord>,
    pub count: usize,
    pub interpreted_query: InterpretedQuery,
}

/// Composes translation, evaluation and storage reads.
pub struct QueryService<R: StringRepository> {
    repo: R,
}

impl<R: StringRepository> QueryService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Filters stored strings by explicit parameters.
    pub fn handle_structured(
        &self,
        request: &StructuredFilterRequest,
    ) -> Result<StructuredQueryResponse, QueryServiceError> {
        let started_at = Instant::now();
        let filters = request.to_filter_set().inspect_err(|err| {
            warn!(
                "event=query_structured module=service status=rejected error_code={}",
                err.error_code()
            );
        })?;

        let data = self.matching(&filters)?;
        info!(
            "event=query_structured module=service status=ok keys={} matches={} duration_ms={}",
            filters.key_summary(),
            data.len(),
            started_at.elapsed().as_millis()
        );
        Ok(StructuredQueryResponse {
            count: data.len(),
            data,
            filters_applied: filters,
        })
    }

    /// Filters stored strings by a free-text query.
    ///
    /// # Errors
    /// - [`QueryServiceError::Validation`] for blank text.
    /// - [`QueryServiceError::UnparseableQuery`] when no rule fires.
    /// - [`QueryServiceError::ConflictingFilters`] when both length bounds
    ///   were derived.
    pub fn handle_natural_language(
        &self,
        text: &str,
    ) -> Result<NaturalLanguageResponse, QueryServiceError> {
        let started_at = Instant::now();
        let filters = interpret(text).inspect_err(|err| {
            warn!(
                "event=query_natural module=service status=rejected error_code={}",
                err.error_code()
            );
        })?;

        let data = self.matching(&filters)?;
        info!(
            "event=query_natural module=service status=ok keys={} matches={} duration_ms={}",
            filters.key_summary(),
            data.len(),
            started_at.elapsed().as_millis()
        );
        Ok(NaturalLanguageResponse {
            count: data.len(),
            data,
            interpreted_query: InterpretedQuery {
                original: text.to_string(),
                parsed_filters: filters,
            },
        })
    }

    fn matching(&self, filters: &FilterSet) -> Result<Vec<StringRecord>, QueryServiceError> {
        let records = self.repo.fetch_all_records()?;
        Ok(evaluate(filters, &records))
    }
}

/// Translates `text` and applies the empty-result and contradiction policies.
pub fn interpret(text: &str) -> Result<FilterSet, QueryServiceError> {
    if text.trim().is_empty() {
        return Err(QueryServiceError::Validation(
            "Missing required 'query' parameter".to_string(),
        ));
    }

    let filters = translate(text);
    if filters.is_empty() {
        return Err(QueryServiceError::UnparseableQuery(text.to_string()));
    }
    if filters.has_length_contradiction() {
        return Err(QueryServiceError::ConflictingFilters {
            query: text.to_string(),
            filters,
        });
    }
    Ok(filters)
}

fn invalid(key: FilterKey, expected: &str) -> QueryServiceError {
    QueryServiceError::Validation(format!(
        "Invalid query parameter values or types: `{key}` must be {expected}"
    ))
}

fn parse_bool(key: FilterKey, raw: &str) -> Result<bool, QueryServiceError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(invalid(key, "a boolean")),
    }
}

fn parse_count(key: FilterKey, raw: &str) -> Result<usize, QueryServiceError> {
    raw.trim()
        .parse::<usize>()
        .map_err(|_| invalid(key, "a non-negative integer"))
}

fn parse_char(raw: &str) -> Result<char, QueryServiceError> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Ok(fold_char(ch)),
        _ => Err(invalid(FilterKey::ContainsCharacter, "a single character")),
    }
}

#[cfg(test)]
mod tests {
    use super::{interpret, QueryServiceError, StructuredFilterRequest};

    #[test]
    fn structured_request_parses_all_fields() {
        let request = StructuredFilterRequest {
            is_palindrome: Some("True".to_string()),
            min_length: Some(" 3".to_string()),
            max_length: Some("9".to_string()),
            word_count: Some("1".to_string()),
            contains_character: Some("A".to_string()),
        };
        let filters = request.to_filter_set().unwrap();
        assert_eq!(filters.is_palindrome, Some(true));
        assert_eq!(filters.min_length, Some(3));
        assert_eq!(filters.max_length, Some(9));
        assert_eq!(filters.word_count, Some(1));
        assert_eq!(filters.contains_character, Some('a'));
    }

    #[test]
    fn structured_request_rejects_bad_values_with_single_error() {
        let request = StructuredFilterRequest {
            is_palindrome: Some("yes".to_string()),
            min_length: Some("-1".to_string()),
            ..StructuredFilterRequest::default()
        };
        let err = request.to_filter_set().unwrap_err();
        assert!(matches!(err, QueryServiceError::Validation(ref message) if message.contains("is_palindrome")));
        assert_eq!(err.status_code(), 400);

        let request = StructuredFilterRequest {
            contains_character: Some("ab".to_string()),
            ..StructuredFilterRequest::default()
        };
        assert!(request.to_filter_set().is_err());
        let request = StructuredFilterRequest {
            contains_character: Some(String::new()),
            ..StructuredFilterRequest::default()
        };
        assert!(request.to_filter_set().is_err());
    }

    #[test]
    fn structured_request_deserializes_from_query_map() {
        let request: StructuredFilterRequest =
            serde_json::from_str(r#"{"word_count":"2"}"#).unwrap();
        assert_eq!(request.word_count.as_deref(), Some("2"));
        assert!(request.min_length.is_none());
    }

    #[test]
    fn interpret_applies_policies() {
        assert!(matches!(
            interpret("   "),
            Err(QueryServiceError::Validation(_))
        ));
        assert!(matches!(
            interpret("asdkjh qwe"),
            Err(QueryServiceError::UnparseableQuery(_))
        ));
        let err = interpret("strings longer than 5 and shorter than 10 characters").unwrap_err();
        assert!(matches!(err, QueryServiceError::ConflictingFilters { .. }));
        assert_eq!(err.status_label(), "422 Unprocessable Entity");
        assert_eq!(
            interpret("palindromes").unwrap().is_palindrome,
            Some(true)
        );
    }
}
