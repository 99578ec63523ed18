//! Error types for Trait Bank Core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TraitBankError {
    #[error("Unknown namespace: {0}")]
    UnknownNamespace(String),

    #[error("Query execution error: {0}")]
    QueryExecution(String),

    #[error("Batch insert failure: graph {graph}, batch {batch}, status {status}: {message}")]
    BatchInsertFailure {
        graph: String,
        batch: usize,
        status: u16,
        message: String,
    },

    #[error("Batch {first_batch} out of range: load has {total_batches} batches")]
    BatchOutOfRange { first_batch: usize, total_batches: usize },

    #[error("Missing required option: {0}")]
    MissingRequiredOption(&'static str),

    #[error("Unsupported search: {0}")]
    Unsupported(String),

    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Regex error: {0}")]
    RegexError(String),
}

/// Failure reported by one of the bulk lookup collaborators
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LookupError {
    #[error("{collaborator} unavailable: {message}")]
    Unavailable {
        collaborator: &'static str,
        message: String,
    },

    #[error("{collaborator} returned invalid record: {message}")]
    InvalidRecord {
        collaborator: &'static str,
        message: String,
    },
}

impl From<regex::Error> for TraitBankError {
    fn from(err: regex::Error) -> Self {
        TraitBankError::RegexError(err.to_string())
    }
}

impl From<reqwest::Error> for TraitBankError {
    fn from(err: reqwest::Error) -> Self {
        TraitBankError::QueryExecution(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TraitBankError>;
