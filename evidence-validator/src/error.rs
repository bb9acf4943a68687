//! Error types for the validator

use thiserror::Error;

/// Result type for validator operations
pub type Result<T> = std::result::Result<T, Error>;

/// Validator errors
///
/// Payload problems are reported in verdicts, not here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Domain input rejected
    #[error("Invalid domain: {0}")]
    InvalidDomain(String),
}
