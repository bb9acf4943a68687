//! Evidence Collector
//!
//! Runs named probes against a target, tier by tier, and turns every
//! invocation into exactly one [`EvidenceRecord`](evidence_core::EvidenceRecord).
//!
//! # Guarantees
//!
//! - Tiers execute strictly in priority order, never overlapping
//! - Within a tier at most `max_workers` probes run at once
//! - Panics, timeouts and malformed results become error records;
//!   nothing a probe does can fail the run
//!
//! # Cancellation
//!
//! A timed-out async probe is aborted at its next await point. A blocking
//! probe cannot be interrupted: its thread runs to completion and the
//! result is discarded.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod config;
pub mod error;
pub mod failures;
pub mod metrics;
pub mod probe;
pub mod registry;
pub mod scheduler;

// Re-exports
pub use config::Config;
pub use error::{Error, Result};
pub use failures::{FailureTracker, ProbeStats};
pub use metrics::CollectorMetrics;
pub use probe::{BlockingProbe, FnProbe, Probe, ProbeResult};
pub use registry::{ProbeRegistry, ScheduledProbe, TierPlan};
pub use scheduler::{extract_ip_address, Scheduler, IP_FIELDS, IP_FOLLOW_UP_GROUP};
