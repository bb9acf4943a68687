//! Core types for risk engine

use chrono::{DateTime, Utc};
use compliance_service::{RiskLevel, ScreeningVerdict};
use evidence_core::{EvidenceMap, QualityClass, Target};
use evidence_validator::{CrossValidationNote, ValidationSummary, ValidationVerdict};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Sanctions screening status block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceStatus {
    /// Screening ran against reference data
    pub ofac_screening_completed: bool,

    /// Screening risk level
    pub sanctions_risk: RiskLevel,

    /// Screened and found nothing
    pub ofac_compliant: bool,

    /// A human must screen the entity
    pub requires_manual_review: bool,

    /// Reference data was past its TTL
    pub reference_data_degraded: bool,
}

/// Profile context for the summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryInsights {
    /// Profile name
    pub industry: String,

    /// Enough sources succeeded
    pub requirements_met: bool,

    /// Profile risk weighting
    pub risk_multiplier: f64,

    /// Multiplier above the high-risk threshold
    pub high_risk_industry: bool,

    /// Compliance tags of the profile
    pub compliance_focus: Vec<String>,

    /// Tags satisfied by this run's evidence
    pub satisfied_focus: Vec<String>,

    /// Evidence that strengthens the industry classification
    #[serde(default)]
    pub confidence_boosters: Vec<String>,

    /// Traits such as `employee_scale_<n>` or `security_focused`
    #[serde(default)]
    pub industry_indicators: Vec<String>,
}

/// Terminal artifact of one assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentSummary {
    /// Records in the run
    pub total_count: usize,

    /// Successful records
    pub successful_count: usize,

    /// Error records
    pub failed_count: usize,

    /// Mean confidence over valid successful records
    pub overall_confidence: f64,

    /// Quality class of `overall_confidence`
    pub quality_class: QualityClass,

    /// Mean record quality score
    pub data_quality_score: f64,

    /// Fraction of compliance focus tags satisfied
    pub compliance_score: f64,

    /// `successful_count` reached the profile minimum
    pub requirements_met: bool,

    /// Sanctions screening outcome
    pub screening_verdict: ScreeningVerdict,

    /// Human-readable findings, capped
    pub key_findings: Vec<String>,

    /// Human-readable risks, capped
    pub risk_indicators: Vec<String>,

    /// Sanctions status block
    pub compliance_status: ComplianceStatus,

    /// Profile context
    pub industry_insights: IndustryInsights,

    /// Cross-source conflicts
    pub cross_validation_notes: Vec<CrossValidationNote>,

    /// Creation time
    pub generated_at: DateTime<Utc>,
}

/// Everything one assessment produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentReport {
    /// Run ID
    pub run_id: Uuid,

    /// Assessed entity
    pub target: Target,

    /// Evidence records by probe name
    pub records: EvidenceMap,

    /// Validation of the records
    pub validation: ValidationSummary,

    /// Aggregated summary
    pub summary: AssessmentSummary,

    /// Run start
    pub started_at: DateTime<Utc>,

    /// Run end
    pub completed_at: DateTime<Utc>,
}

impl AssessmentReport {
    /// Verdict per probe
    pub fn verdicts(&self) -> &BTreeMap<String, ValidationVerdict> {
        &self.validation.verdicts
    }

    /// Wall-clock duration in seconds
    pub fn duration_seconds(&self) -> f64 {
        (self.completed_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}
