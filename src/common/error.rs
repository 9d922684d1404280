use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::core::types::DataType;

/// Every failure an operation can report.
///
/// No operation mutates state before it has fully validated its input, so
/// receiving one of these means the registry and the table documents are
/// exactly as they were before the call.
#[derive(Debug, Error, Diagnostic)]
pub enum DatabaseError {
    #[error("table `{0}` does not exist")]
    #[diagnostic(code(skiff::unknown_table), help("run `list_tables` to see known tables"))]
    UnknownTable(String),

    #[error("table `{0}` already exists")]
    #[diagnostic(code(skiff::duplicate_table))]
    DuplicateTable(String),

    #[error("invalid table name `{0}`")]
    #[diagnostic(
        code(skiff::invalid_table_name),
        help("table names must start with a letter or `_` and contain only letters, digits and `_`")
    )]
    InvalidTableName(String),

    #[error("invalid column spec `{spec}`: {reason}")]
    #[diagnostic(code(skiff::invalid_column_spec), help("column specs look like `name:type`"))]
    InvalidColumnSpec { spec: String, reason: String },

    #[error("unsupported type `{0}`")]
    #[diagnostic(
        code(skiff::unsupported_type),
        help("supported types are string, integer and boolean")
    )]
    UnsupportedType(String),

    #[error("column `{0}` is declared more than once")]
    #[diagnostic(code(skiff::duplicate_column))]
    DuplicateColumn(String),

    #[error("column {} not found in table `{table}`", format_columns(.columns))]
    #[diagnostic(code(skiff::unknown_column))]
    UnknownColumn { table: String, columns: Vec<String> },

    #[error("value {value} does not match column `{column}`: expected {expected}, found {found}")]
    #[diagnostic(code(skiff::type_mismatch))]
    TypeMismatch {
        column: String,
        value: String,
        expected: DataType,
        found: DataType,
    },

    #[error("table `{table}` takes exactly {expected} value(s), got {found}")]
    #[diagnostic(code(skiff::arity_mismatch), help("the `id` column is assigned automatically"))]
    ArityMismatch {
        table: String,
        expected: usize,
        found: usize,
    },

    #[error("column `{0}` cannot be updated")]
    #[diagnostic(code(skiff::read_only_column), help("ids are assigned on insert and never change"))]
    ReadOnlyColumn(String),

    #[error("invalid command: {0}")]
    #[diagnostic(code(skiff::invalid_command), help("type `help` for the list of commands"))]
    InvalidCommand(String),

    #[error("I/O error on {}", .path.display())]
    #[diagnostic(code(skiff::backend_io))]
    BackendIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("document {} is corrupt: {reason}", .path.display())]
    #[diagnostic(code(skiff::corrupt_document))]
    CorruptDocument { path: PathBuf, reason: String },

    #[error("stored data for table `{table}` no longer fits its schema: {reason}")]
    #[diagnostic(code(skiff::document_mismatch))]
    DocumentMismatch { table: String, reason: String },

    #[error("invalid configuration in {}", .path.display())]
    #[diagnostic(code(skiff::config))]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl DatabaseError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::BackendIo {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn corrupt(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::CorruptDocument {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

fn format_columns(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| format!("`{c}`"))
        .collect::<Vec<_>>()
        .join(" and ")
}

/// Conditions worth telling the user about that do not fail the operation.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum Warning {
    #[error("no rows in `{table}` where {column} = {value}; table not changed")]
    #[diagnostic(code(skiff::no_match), severity(Warning))]
    NoMatch {
        table: String,
        column: String,
        value: String,
    },

    #[error("{count} rows matched; {policy}")]
    #[diagnostic(code(skiff::multiple_match), severity(Warning))]
    MultipleMatch { count: usize, policy: MatchPolicy },

    #[error("no data file found for table `{0}`; removing it from the registry only")]
    #[diagnostic(code(skiff::missing_table_file), severity(Warning))]
    MissingTableFile(String),
}

/// What a mutation did with a predicate that matched several rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum MatchPolicy {
    #[strum(to_string = "only the first one is updated")]
    FirstOnly,
    #[strum(to_string = "all of them are deleted")]
    All,
}
