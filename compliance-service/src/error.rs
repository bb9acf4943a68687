use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComplianceError {
    #[error("No reference data available: {0}")]
    NoReferenceData(String),

    #[error("Reference data fetch failed: {0}")]
    ReferenceFetch(String),

    #[error("Reference data parse failed: {0}")]
    ReferenceParse(String),

    #[error("Invalid screening input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for ComplianceError {
    fn from(err: reqwest::Error) -> Self {
        ComplianceError::ReferenceFetch(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ComplianceError>;
