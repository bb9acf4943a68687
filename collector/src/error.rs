//! Error types for the collector

use thiserror::Error;

/// Result type for collector operations
pub type Result<T> = std::result::Result<T, Error>;

/// Collector errors
///
/// Probe failures are never reported here; they become error records.
#[derive(Error, Debug)]
pub enum Error {
    /// Probe name registered twice
    #[error("Duplicate probe: {0}")]
    DuplicateProbe(String),

    /// Probe name not in the registry
    #[error("Unknown probe: {0}")]
    UnknownProbe(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Metrics registration error
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
