//! KYB Risk Engine
//!
//! Runs an assessment end to end: collect evidence tier by tier, validate
//! it, screen the company against sanctions lists, and aggregate everything
//! into an [`AssessmentSummary`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod aggregator;
pub mod compliance;
pub mod config;
pub mod engine;
pub mod error;
pub mod interpret;
pub mod telemetry;
pub mod types;

pub use aggregator::Aggregator;
pub use config::{Config, LogConfig};
pub use engine::{AssessmentEngine, SCREENING_PROBE};
pub use error::{Error, Result};
pub use types::*;
