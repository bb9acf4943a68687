//! Payload validation and run summaries

use crate::cross::{cross_validate, CrossValidationNote};
use crate::rules::table_for;
use crate::verdict::{round2, RuleReport, ValidationVerdict};
use evidence_core::{EvidenceMap, EvidenceRecord, Payload, QualityClass, SourceKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Below this, a source or a run counts as low confidence
pub const MEDIUM_CONFIDENCE: f64 = 0.5;

/// Fewer validated sources than this triggers a collect-more recommendation
pub const MIN_SOURCES_FOR_VALIDATION: usize = 2;

/// Validate a payload against the rule table for `source`
pub fn validate(payload: &Payload, source: &SourceKind) -> ValidationVerdict {
    if let Some(message) = payload.reported_error() {
        return ValidationVerdict::rejected("PROBE_ERROR", format!("Probe reported error: {}", message));
    }

    let table = table_for(source);
    let mut report = RuleReport::new();
    table.apply(payload, &mut report);

    let verdict = ValidationVerdict::from_report(report);
    debug!(
        source = %source,
        table = table.name,
        confidence = verdict.confidence,
        errors = verdict.errors.len(),
        warnings = verdict.warnings.len(),
        "Validated payload"
    );
    verdict
}

/// Validate one record; error records are rejected outright
pub fn validate_record(record: &EvidenceRecord) -> ValidationVerdict {
    match (record.payload(), record.error()) {
        (Some(payload), _) => validate(payload, payload.kind()),
        (None, Some(error)) => ValidationVerdict::rejected(
            "PROBE_FAILED",
            format!("Probe failed ({}): {}", error.kind, error.message),
        ),
        (None, None) => ValidationVerdict::rejected("PROBE_FAILED", "No payload".to_string()),
    }
}

/// Validation of a whole run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationSummary {
    /// Verdict per probe
    pub verdicts: BTreeMap<String, ValidationVerdict>,

    /// Mean confidence over valid verdicts (0 when none are valid)
    pub overall_confidence: f64,

    /// Quality class of the overall confidence
    pub quality_class: QualityClass,

    /// Number of valid verdicts
    pub sources_validated: usize,

    /// Cross-source conflicts
    pub notes: Vec<CrossValidationNote>,

    /// Suggested follow-up actions
    pub recommended_actions: Vec<String>,
}

impl ValidationSummary {
    /// Verdict for one probe
    pub fn verdict(&self, probe: &str) -> Option<&ValidationVerdict> {
        self.verdicts.get(probe)
    }
}

/// Validate every record, cross-validate, and recommend follow-ups
pub fn validate_run(records: &EvidenceMap) -> ValidationSummary {
    let verdicts: BTreeMap<String, ValidationVerdict> = records
        .iter()
        .map(|(name, record)| (name.clone(), validate_record(record)))
        .collect();

    let valid: Vec<f64> = verdicts
        .values()
        .filter(|v| v.is_valid)
        .map(|v| v.confidence)
        .collect();
    let overall_confidence = if valid.is_empty() {
        0.0
    } else {
        round2(valid.iter().sum::<f64>() / valid.len() as f64)
    };

    let notes = cross_validate(records);
    let recommended_actions = recommendations(&verdicts, overall_confidence, valid.len(), &notes);

    ValidationSummary {
        quality_class: QualityClass::from_confidence(overall_confidence),
        sources_validated: valid.len(),
        verdicts,
        overall_confidence,
        notes,
        recommended_actions,
    }
}

fn recommendations(
    verdicts: &BTreeMap<String, ValidationVerdict>,
    overall_confidence: f64,
    sources_validated: usize,
    notes: &[CrossValidationNote],
) -> Vec<String> {
    let mut actions = Vec::new();

    if overall_confidence < MEDIUM_CONFIDENCE {
        actions.push("Consider re-running probes to improve data quality".to_string());
    }

    let failed: Vec<&str> = verdicts
        .iter()
        .filter(|(_, v)| !v.is_valid)
        .map(|(k, _)| k.as_str())
        .collect();
    if !failed.is_empty() {
        actions.push(format!("Review failed sources: {}", failed.join(", ")));
    }

    let low: Vec<&str> = verdicts
        .iter()
        .filter(|(_, v)| v.confidence < MEDIUM_CONFIDENCE)
        .map(|(k, _)| k.as_str())
        .collect();
    if !low.is_empty() {
        actions.push(format!("Validate low-confidence sources: {}", low.join(", ")));
    }

    if !notes.is_empty() {
        actions.push("Investigate cross-validation conflicts".to_string());
    }

    if sources_validated < MIN_SOURCES_FOR_VALIDATION {
        actions.push("Collect data from additional sources for better validation".to_string());
    }

    actions
}
