//! Evidence Validator
//!
//! Scores each probe payload against a rule table for its source kind and
//! checks related fields across sources once a run has finished.
//!
//! # Scoring
//!
//! Confidence starts at 1.0 and loses 0.3 per structural error and 0.1 per
//! warning, floored at 0.0. Any structural error makes the payload invalid
//! and caps confidence at 0.3.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod cross;
pub mod domain;
pub mod error;
pub mod rules;
pub mod validator;
pub mod verdict;

// Re-exports
pub use cross::{cross_validate, ConflictKind, CrossValidationNote, RecommendedAction};
pub use domain::validate_domain;
pub use error::{Error, Result};
pub use validator::{validate, validate_record, validate_run, ValidationSummary};
pub use verdict::{RuleReport, Severity, ValidationIssue, ValidationVerdict};
