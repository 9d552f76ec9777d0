//! Error types for the data-loader crate.

use thiserror::Error;

/// Errors that can occur while loading, parsing or indexing interaction data
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Line in a data file couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Number of fields in a line is outside the accepted range
    #[error("Expected {expected} fields but found {found} in line {line}")]
    FieldCountMismatch {
        expected: String,
        found: usize,
        line: usize,
    },

    /// The same (actor, target) pair appeared twice under `DuplicatePolicy::Reject`
    #[error("Duplicate interaction for actor {actor} and target {target}")]
    DuplicateInteraction { actor: String, target: String },

    /// Data validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
