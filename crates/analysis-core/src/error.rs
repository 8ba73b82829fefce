use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl AnalysisError {
    /// Whether a fallback provider should be tried after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AnalysisError::ApiError(_) | AnalysisError::InvalidData(_))
    }

    /// The message without the variant prefix.
    pub fn detail(&self) -> &str {
        match self {
            AnalysisError::InsufficientData(m)
            | AnalysisError::InvalidData(m)
            | AnalysisError::CalculationError(m)
            | AnalysisError::ApiError(m)
            | AnalysisError::NotFound(m)
            | AnalysisError::CacheError(m)
            | AnalysisError::Unknown(m) => m,
        }
    }
}
