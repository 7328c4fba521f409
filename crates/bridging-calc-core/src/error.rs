use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgingError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for BridgingError {
    fn from(e: serde_json::Error) -> Self {
        BridgingError::SerializationError(e.to_string())
    }
}
