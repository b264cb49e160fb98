use thiserror::Error;

#[derive(Debug, Error)]
pub enum TenorError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for TenorError {
    fn from(e: serde_json::Error) -> Self {
        TenorError::SerializationError(e.to_string())
    }
}
