//! KYB Evidence Core
//!
//! Shared data model for evidence collection, validation, screening and
//! aggregation.
//!
//! # Invariants
//!
//! - Evidence Records are created once per probe invocation and never mutated
//! - A record is either a success carrying a payload or an error carrying a
//!   classified failure, never both
//! - Tiers order strictly: critical → high → medium → optional

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod error;
pub mod profile;
pub mod types;

// Re-exports
pub use error::{Error, Result};
pub use profile::IndustryProfile;
pub use types::{
    EvidenceMap, EvidenceOutcome, EvidenceRecord, EvidenceStatus, Payload, ProbeDescriptor,
    ProbeError, ProbeErrorKind, QualityClass, SourceKind, Target, Tier,
    COMPLIANCE_RELEVANT_PROBES,
};
