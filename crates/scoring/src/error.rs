//! Error types for the scoring crate.
//!
//! Absence of data is never an error here: empty pools, empty vectors and
//! cold-start actors all produce zero scores or empty lists. Errors are
//! reserved for contract violations by the caller.

use data_loader::DataLoadError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoringError {
    /// A caller-supplied parameter is outside its valid domain
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A scoring config file could not be read or parsed
    #[error("Failed to load config {path}: {reason}")]
    Config { path: String, reason: String },

    /// Loading the underlying data failed
    #[error(transparent)]
    Data(#[from] DataLoadError),
}

pub type Result<T> = std::result::Result<T, ScoringError>;
