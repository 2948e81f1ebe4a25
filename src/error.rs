//! Error types for the bibrecord crate

use std::fmt;
use thiserror::Error;

/// Result type for bibrecord operations
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for bibrecord
#[derive(Error, Debug)]
pub enum Error {
    /// Parse error with location information
    #[error("Parse error at line {line}, column {column}: {message}")]
    ParseError {
        /// Line number (1-indexed)
        line: usize,
        /// Column number (1-indexed)
        column: usize,
        /// Error message
        message: String,
        /// Optional source snippet
        snippet: Option<String>,
    },

    /// Input contained nothing to parse
    #[error("No bibliography provided")]
    EmptyInput,

    /// An empty path was given where a file was expected
    #[error("No filename provided")]
    EmptyPath,

    /// Input parsed fine but contained no entry
    #[error("No BibTeX entry found in input")]
    NoEntry,

    /// Undefined string variable
    #[error("Undefined string variable '{0}'")]
    UndefinedVariable(String),

    /// Circular reference in string variables
    #[error("Circular reference detected in string variables: {0}")]
    CircularReference(String),

    /// Entry type without a record type
    #[error("Unknown record type '{0}'")]
    UnknownRecordType(String),

    /// Entry of one type read into a record of another
    #[error("Cannot read {found} entry into {expected} record")]
    EntryTypeMismatch {
        /// Record type that was expected
        expected: String,
        /// Entry type that was found
        found: String,
    },

    /// Missing required field
    #[error("Missing required field '{field}' in {entry_type} entry")]
    MissingRequiredField {
        /// The entry type
        entry_type: String,
        /// The missing field
        field: String,
    },

    /// Duplicate entry key
    #[error("Duplicate key '{0}'")]
    DuplicateKey(String),

    /// No record stored under the key
    #[error("No record with key '{0}'")]
    KeyNotFound(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Written output was not valid UTF-8
    #[error("Invalid UTF-8 in output: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Generic parse error from winnow
    #[error("Parse error: {0}")]
    WinnowError(String),

    /// JSON serialization error
    #[cfg(feature = "serde")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Source location of a parse error
    #[must_use]
    pub const fn location(&self) -> Option<Location> {
        match self {
            Self::ParseError { line, column, .. } => Some(Location {
                line: *line,
                column: *column,
            }),
            _ => None,
        }
    }
}

/// Convert winnow errors to our error type
impl From<winnow::error::ContextError> for Error {
    fn from(err: winnow::error::ContextError) -> Self {
        Self::WinnowError(err.to_string())
    }
}

/// Location information for errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
