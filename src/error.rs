use thiserror::Error;

/// Errors that can occur while scanning a capture or writing output.
#[derive(Error, Debug)]
pub enum TikharError {
    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error while writing output.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV serialization error while writing output.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Invalid command-line arguments.
    #[error("{0}")]
    InvalidArgs(String),

    /// A retained feed payload is missing a required field.
    #[error("feed payload missing expected field: {0}")]
    MissingField(String),

    /// A retained feed payload carries a value of the wrong shape.
    #[error("invalid field value: {0}")]
    InvalidField(String),
}

/// Convenience result type for tikhar operations.
pub type Result<T> = std::result::Result<T, TikharError>;
