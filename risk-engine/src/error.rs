//! Error types for risk engine

use thiserror::Error;

/// Risk engine error
#[derive(Debug, Error)]
pub enum Error {
    /// Target rejected before any probe ran
    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Collector setup failed
    #[error("Collector error: {0}")]
    Collector(#[from] collector::Error),

    /// Screening setup failed
    #[error("Screening error: {0}")]
    Screening(#[from] compliance_service::ComplianceError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
