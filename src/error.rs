/// Error types for ClubTable
///
/// Failures fall into three groups: external data that does not fit the
/// entity schema, a record source that could not complete a request, and
/// invalid configuration. `ViewError` wraps all of them for controller calls.

use crate::column::ColumnType;
use thiserror::Error;

/// A payload from the record source did not match the entity schema.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SchemaError {
    #[error("expected a JSON array of records")]
    NotAnArray,

    #[error("row {index}: expected a JSON object")]
    NotAnObject { index: usize },

    #[error("row {index}: missing required field '{field}'")]
    MissingField { index: usize, field: String },

    #[error("row {index}: field '{field}' expected {expected:?}, found {found}")]
    TypeMismatch {
        index: usize,
        field: String,
        expected: ColumnType,
        found: String,
    },

    #[error("row {index}: key field '{field}' must be an integer or a string")]
    InvalidKey { index: usize, field: String },
}

/// A request to the record source did not complete.
#[derive(Debug, Error)]
pub enum SourceError {
    #[cfg(feature = "http")]
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("{operation} is not supported for {entity}")]
    Unsupported {
        operation: &'static str,
        entity: String,
    },

    #[error("record source unavailable: {0}")]
    Unavailable(String),

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Invalid configuration value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a positive integer, got '{value}'")]
    InvalidNumber { name: String, value: String },

    #[error("{name} must not be empty")]
    Empty { name: String },
}

/// Any failure surfaced by a table controller.
#[derive(Debug, Error)]
pub enum ViewError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("no deletion is awaiting confirmation")]
    NothingPending,
}
