use thiserror::Error;

#[derive(Debug, Error)]
pub enum InvestIdeasError {
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Financial impossibility: {0}")]
    FinancialImpossibility(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl InvestIdeasError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        InvestIdeasError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for InvestIdeasError {
    fn from(e: serde_json::Error) -> Self {
        InvestIdeasError::SerializationError(e.to_string())
    }
}

impl From<std::io::Error> for InvestIdeasError {
    fn from(e: std::io::Error) -> Self {
        InvestIdeasError::Storage(e.to_string())
    }
}
