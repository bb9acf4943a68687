//! Error types for the evidence model

use thiserror::Error;

/// Result type for evidence model operations
pub type Result<T> = std::result::Result<T, Error>;

/// Evidence model errors
#[derive(Error, Debug)]
pub enum Error {
    /// Tier name not recognised
    #[error("Unknown tier: {0}")]
    UnknownTier(String),

    /// Target could not be built from the given input
    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    /// Profile could not be parsed
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
