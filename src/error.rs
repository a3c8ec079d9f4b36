// src/error.rs
use pathq_jpath::JPathError;
use thiserror::Error;

/// Errors surfaced by the `pathq` command-line tool.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Query failed: {0}")]
    Query(#[from] JPathError),

    #[error("Invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
