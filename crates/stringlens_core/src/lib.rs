//! Core domain logic for StringLens.
//! This crate is the single source of truth for string analysis and query
//! invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::filter::{FilterKey, FilterSet, FilterValue, InterpretedQuery};
pub use model::properties::StringProperties;
pub use model::record::{record_id_for, RecordId, StringRecord};
pub use query::evaluator::{evaluate, matches};
pub use query::translator::{explain, rule_names, translate, RuleMatch};
pub use repo::memory_repo::MemoryStringRepository;
pub use repo::string_repo::{RepoError, RepoResult, SqliteStringRepository, StringRepository};
pub use service::query_service::{
    NaturalLanguageResponse, QueryService, QueryServiceError, StructuredFilterRequest,
    StructuredQueryResponse,
};
pub use service::string_service::{parse_create_request, StringService, StringServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
