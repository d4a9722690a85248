//! Error types for the record store

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid collection type name: {0}")]
    InvalidTypeName(String),

    #[error("Row shape mismatch: expected a JSON object, got {0}")]
    ShapeMismatch(&'static str),
}

impl StoreError {
    /// Whether this error came from query evaluation (as opposed to I/O).
    ///
    /// Evaluation failures are swallowed into empty results by the
    /// collection API; I/O failures propagate to the caller.
    pub fn is_evaluation(&self) -> bool {
        matches!(self, StoreError::ShapeMismatch(_))
    }
}
