//! Error types for Quarry.

use alloc::string::String;
use core::fmt;

/// Result type alias for Quarry operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types for plan construction and query execution.
///
/// None of these are recovered internally: any of them aborts the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Table is not part of the catalog.
    UnknownTable {
        name: String,
    },
    /// Column is not part of the table's schema.
    UnknownColumn {
        table: String,
        column: String,
    },
    /// A row is missing a field, or a field is not an integer where one is required.
    MalformedRow {
        message: String,
    },
    /// Storage, catalog or output could not be opened, read or written.
    Io {
        path: String,
        message: String,
    },
    /// Expression shape the evaluator does not handle.
    UnsupportedExpression {
        message: String,
    },
    /// Catalog constructed with conflicting definitions.
    ConfigConflict {
        message: String,
    },
    /// Query text rejected by the SQL front end.
    Syntax {
        message: String,
        position: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnknownTable { name } => {
                write!(f, "Unknown table: {}", name)
            }
            Error::UnknownColumn { table, column } => {
                write!(f, "Unknown column {} in table {}", column, table)
            }
            Error::MalformedRow { message } => {
                write!(f, "Malformed row: {}", message)
            }
            Error::Io { path, message } => {
                write!(f, "I/O error on {}: {}", path, message)
            }
            Error::UnsupportedExpression { message } => {
                write!(f, "Unsupported expression: {}", message)
            }
            Error::ConfigConflict { message } => {
                write!(f, "Configuration conflict: {}", message)
            }
            Error::Syntax { message, position } => {
                write!(f, "Syntax error at offset {}: {}", position, message)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl Error {
    /// Creates an unknown table error.
    pub fn unknown_table(name: impl Into<String>) -> Self {
        Error::UnknownTable { name: name.into() }
    }

    /// Creates an unknown column error.
    pub fn unknown_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Error::UnknownColumn {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Creates a malformed row error.
    pub fn malformed_row(message: impl Into<String>) -> Self {
        Error::MalformedRow {
            message: message.into(),
        }
    }

    /// Creates an I/O error for the given path.
    pub fn io(path: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Io {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates an unsupported expression error.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Error::UnsupportedExpression {
            message: message.into(),
        }
    }

    /// Creates a configuration conflict error.
    pub fn config_conflict(message: impl Into<String>) -> Self {
        Error::ConfigConflict {
            message: message.into(),
        }
    }

    /// Creates a syntax error at the given byte offset.
    pub fn syntax(message: impl Into<String>, position: usize) -> Self {
        Error::Syntax {
            message: message.into(),
            position,
        }
    }
}
