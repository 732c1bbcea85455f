//! Command-line front end for the string store.
//!
//! # Responsibility
//! - Wire configuration, logging, SQLite storage and core services into
//!   subcommands.
//! - Print responses as pretty JSON; print errors with their status label.

use clap::{Args, Parser, Subcommand};
use log::info;
use serde_json::json;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::process::ExitCode;
use stringlens_core::db::{open_db, DbError};
use stringlens_core::{
    core_version, init_logging, ConfigError, CoreConfig, LogLevel, LoggingError, QueryService,
    QueryServiceError, RepoError, SqliteStringRepository, StringService, StringServiceError,
    StructuredFilterRequest,
};

#[derive(Debug, Parser)]
#[command(
    name = "stringlens",
    disable_help_subcommand = true,
    about = "Analyze, store and query strings",
    long_about = "Store strings with precomputed properties and retrieve them by structured filters or natural-language queries.",
    after_help = "Settings resolve in order from explicit flags, STRINGLENS_* environment variables, then defaults."
)]
struct Cli {
    #[arg(long, global = true, value_name = "PATH", help = "SQLite database file")]
    db: Option<PathBuf>,
    #[arg(
        long = "log-level",
        global = true,
        value_name = "LEVEL",
        help = "One of trace|debug|info|warn|error"
    )]
    log_level: Option<String>,
    #[arg(
        long = "log-dir",
        global = true,
        value_name = "DIR",
        help = "Absolute directory for rolling log files"
    )]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Analyze and store a string.
    Create {
        #[arg(required_unless_present = "body", help = "String to store")]
        value: Option<String>,
        #[arg(
            long,
            conflicts_with = "value",
            value_name = "JSON",
            help = "Raw request body, e.g. '{\"value\": \"level\"}'"
        )]
        body: Option<String>,
    },
    /// Show one stored string.
    Get { value: String },
    /// Delete one stored string.
    Delete { value: String },
    /// List stored strings matching structured filters.
    List(ListArgs),
    /// Filter stored strings with a natural-language query.
    Query {
        #[arg(required = true, num_args = 1.., help = "Query text, e.g. palindromic strings")]
        text: Vec<String>,
    },
    /// Print the core version.
    Version,
}

#[derive(Debug, Args)]
struct ListArgs {
    #[arg(long = "is-palindrome", value_name = "BOOL")]
    is_palindrome: Option<String>,
    #[arg(long = "min-length", value_name = "N")]
    min_length: Option<String>,
    #[arg(long = "max-length", value_name = "N")]
    max_length: Option<String>,
    #[arg(long = "word-count", value_name = "N")]
    word_count: Option<String>,
    #[arg(long = "contains-character", value_name = "CHAR")]
    contains_character: Option<String>,
}

impl From<ListArgs> for StructuredFilterRequest {
    fn from(args: ListArgs) -> Self {
        Self {
            is_palindrome: args.is_palindrome,
            min_length: args.min_length,
            max_length: args.max_length,
            word_count: args.word_count,
            contains_character: args.contains_character,
        }
    }
}

#[derive(Debug)]
enum CliError {
    Config(ConfigError),
    Logging(LoggingError),
    Db(DbError),
    Repo(RepoError),
    Strings(StringServiceError),
    Query(QueryServiceError),
    Json(serde_json::Error),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "configuration error: {err}"),
            Self::Logging(err) => write!(f, "logging error: {err}"),
            Self::Db(err) => write!(f, "database error: {err}"),
            Self::Repo(err) => write!(f, "storage error: {err}"),
            Self::Strings(err) => write!(f, "{}: {err}", err.status_label()),
            Self::Query(err) => write!(f, "{}: {err}", err.status_label()),
            Self::Json(err) => write!(f, "invalid JSON: {err}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Logging(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Strings(err) => Some(err),
            Self::Query(err) => Some(err),
            Self::Json(err) => Some(err),
        }
    }
}

macro_rules! impl_from {
    ($($source:ty => $variant:ident),* $(,)?) => {
        $(impl From<$source> for CliError {
            fn from(value: $source) -> Self {
                Self::$variant(value)
            }
        })*
    };
}

impl_from! {
    ConfigError => Config,
    LoggingError => Logging,
    DbError => Db,
    RepoError => Repo,
    StringServiceError => Strings,
    QueryServiceError => Query,
    serde_json::Error => Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<String, CliError> {
    let config = resolve_config(&cli)?;
    if let Some(log_dir) = config.log_dir.as_deref() {
        init_logging(config.log_level, log_dir)?;
    }

    if let Command::Version = cli.command {
        return Ok(version_line());
    }

    let conn = open_db(&config.db_path)?;
    let repo = SqliteStringRepository::try_new(&conn)?;
    info!(
        "event=cli_command module=cli status=start command={}",
        command_name(&cli.command)
    );
    execute(cli.command, &repo)
}

fn execute(command: Command, repo: &SqliteStringRepository<'_>) -> Result<String, CliError> {
    let output = match command {
        Command::Create { value, body } => {
            let service = StringService::new(repo);
            let record = match (value, body) {
                (_, Some(body)) => {
                    let body = serde_json::from_str::<serde_json::Value>(&body)?;
                    service.create_from_json(&body)?
                }
                (Some(value), None) => service.create_string(&value)?,
                (None, None) => service.create_from_json(&serde_json::Value::Null)?,
            };
            serde_json::to_string_pretty(&record)?
        }
        Command::Get { value } => {
            serde_json::to_string_pretty(&StringService::new(repo).get_string(&value)?)?
        }
        Command::Delete { value } => {
            StringService::new(repo).delete_string(&value)?;
            serde_json::to_string_pretty(&json!({ "deleted": value }))?
        }
        Command::List(args) => {
            let request = StructuredFilterRequest::from(args);
            serde_json::to_string_pretty(&QueryService::new(repo).handle_structured(&request)?)?
        }
        Command::Query { text } => {
            let text = text.join(" ");
            serde_json::to_string_pretty(&QueryService::new(repo).handle_natural_language(&text)?)?
        }
        Command::Version => version_line(),
    };
    Ok(output)
}

fn version_line() -> String {
    format!("stringlens_core version={}", core_version())
}

fn resolve_config(cli: &Cli) -> Result<CoreConfig, CliError> {
    let mut config = CoreConfig::from_env()?;
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.parse::<LogLevel>()?;
    }
    if let Some(dir) = &cli.log_dir {
        config.log_dir = Some(dir.clone());
    }
    Ok(config)
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Create { .. } => "create",
        Command::Get { .. } => "get",
        Command::Delete { .. } => "delete",
        Command::List(_) => "list",
        Command::Query { .. } => "query",
        Command::Version => "version",
    }
}

#[cfg(test)]
mod tests {
    use super::{run, Cli, CliError};
    use clap::Parser;
    use serde_json::Value;
    use std::path::Path;
    use stringlens_core::{QueryServiceError, StringServiceError};

    fn exec(db: &Path, args: &[&str]) -> Result<String, CliError> {
        let db = db.to_str().expect("temp path should be valid UTF-8");
        let mut argv = vec!["stringlens", "--db", db];
        argv.extend_from_slice(args);
        run(Cli::try_parse_from(argv).expect("arguments should parse"))
    }

    #[test]
    fn query_requires_text() {
        assert!(Cli::try_parse_from(["stringlens", "query"]).is_err());
    }

    #[test]
    fn create_rejects_value_and_body_together() {
        assert!(Cli::try_parse_from(["stringlens", "create", "x", "--body", "{}"]).is_err());
    }

    #[test]
    fn create_then_query_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("cli.db");

        exec(&db, &["create", "racecar"]).unwrap();
        exec(&db, &["create", "hello world"]).unwrap();
        exec(&db, &["create", "--body", r#"{"value": "kayak"}"#]).unwrap();

        let output = exec(&db, &["query", "single", "word", "palindromes"]).unwrap();
        let response: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(response["count"], 2);
        assert_eq!(response["data"][0]["value"], "racecar");
        assert_eq!(response["data"][1]["value"], "kayak");
        assert_eq!(
            response["interpreted_query"]["parsed_filters"],
            serde_json::json!({ "is_palindrome": true, "word_count": 1 })
        );

        let output = exec(&db, &["list", "--contains-character", "W"]).unwrap();
        let response: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(response["count"], 1);
        assert_eq!(response["filters_applied"]["contains_character"], "w");
    }

    #[test]
    fn errors_carry_status_labels() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("cli.db");

        exec(&db, &["create", "dup"]).unwrap();
        let err = exec(&db, &["create", "dup"]).unwrap_err();
        assert!(matches!(err, CliError::Strings(StringServiceError::Conflict(_))));
        assert!(err.to_string().starts_with("409 Conflict"));

        let err = exec(&db, &["create", "--body", r#"{"value": 7}"#]).unwrap_err();
        assert!(err.to_string().starts_with("422 Unprocessable Entity"));

        let err = exec(&db, &["query", "asdkjh", "qwe"]).unwrap_err();
        assert!(matches!(err, CliError::Query(QueryServiceError::UnparseableQuery(_))));

        let err = exec(&db, &["get", "missing"]).unwrap_err();
        assert!(err.to_string().starts_with("404 Not Found"));
    }

    #[test]
    fn blank_values_are_not_stored() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("cli.db");

        let err = exec(&db, &["create", "   "]).unwrap_err();
        assert!(matches!(err, CliError::Strings(StringServiceError::BlankValue)));
        assert!(err.to_string().starts_with("400 Bad Request"));

        let err = exec(&db, &["create", "--body", r#"{"value": ""}"#]).unwrap_err();
        assert!(err.to_string().starts_with("400 Bad Request"));

        let output = exec(&db, &["list"]).unwrap();
        let response: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(response["count"], 0);
    }
}
