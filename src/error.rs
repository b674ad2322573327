//! Error types shared by every part of the engine.

use std::io;

use thiserror::Error;

/// Result type for engine operations.
pub type DbResult<T> = Result<T, DbError>;

/// Errors that can occur while defining, loading or combining tables.
///
/// None of them is fatal to a session: the failing operation is aborted
/// and the stored tables are left as they were.
#[derive(Debug, Error)]
pub enum DbError {
    /// A table name that is not defined in the database.
    #[error("no such table: {0}")]
    NoSuchTable(String),

    /// A column index or header name that does not resolve in a table.
    #[error("column out of range: {0}")]
    ColumnOutOfRange(String),

    /// A row index past the end of a table.
    #[error("row out of range: {index} (table has {len} rows)")]
    RowOutOfRange { index: usize, len: usize },

    /// A load was aborted; the previously stored table is untouched.
    #[error("unable to load {table}: {reason}")]
    Load { table: String, reason: String },

    /// A field or literal that should be an integer is not one.
    #[error("invalid integer: {0:?}")]
    InvalidNumber(String),

    /// A column type tag other than `int` or `string`.
    #[error("unknown column type: {0:?}")]
    UnknownType(String),

    /// A comparator outside `<`, `<=`, `==`, `>=`, `>`.
    #[error("unknown comparator: {0:?}")]
    UnknownComparator(String),

    /// A command line that does not follow the command grammar.
    #[error("syntax error: {0}")]
    Syntax(String),

    /// I/O error while reading or writing a table file.
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl DbError {
    pub(crate) fn column(reference: impl ToString) -> Self {
        Self::ColumnOutOfRange(reference.to_string())
    }

    pub(crate) fn load(table: &str, reason: impl Into<String>) -> Self {
        Self::Load {
            table: table.to_string(),
            reason: reason.into(),
        }
    }
}
