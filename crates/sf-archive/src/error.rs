//! Error types for archive reading and writing.

use thiserror::Error;

pub type ArchiveResult<T> = Result<T, ArchiveError>;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing field '{field}' in group '{group}'")]
    MissingField { field: String, group: String },

    #[error("Expected field '{expected}' but found '{found}' in group '{group}'")]
    UnexpectedField {
        expected: String,
        found: String,
        group: String,
    },

    #[error("Field '{field}' in group '{group}' is not {expected}")]
    TypeMismatch {
        field: String,
        group: String,
        expected: &'static str,
    },

    #[error("Field '{field}' in group '{group}' has {found} values, expected {expected}")]
    Length {
        field: String,
        group: String,
        expected: usize,
        found: usize,
    },

    #[error("Parse error in group '{group}': {message}")]
    Parse { group: String, message: String },

    #[error("Field '{field}' in group '{group}' is not finite and cannot be stored")]
    NonFinite { field: String, group: String },

    #[error("Invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("Unbalanced groups at '{group}'")]
    Unbalanced { group: String },

    #[error("Unknown archive format '{name}' (expected text, binary or json)")]
    UnknownFormat { name: String },
}
