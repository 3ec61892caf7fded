use thiserror::Error;

#[derive(Debug, Error)]
pub enum MoatscopeError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl MoatscopeError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        MoatscopeError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for MoatscopeError {
    fn from(e: serde_json::Error) -> Self {
        MoatscopeError::SerializationError(e.to_string())
    }
}
