//! Validation verdicts

use evidence_core::QualityClass;
use serde::{Deserialize, Serialize};

/// Issue severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Structural problem; invalidates the payload
    Error,
    /// Semantic problem; lowers confidence only
    Warning,
}

/// Validation issue detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Machine-readable code (e.g. `TYPE_MISMATCH`)
    pub code: String,

    /// Severity
    pub severity: Severity,

    /// Dotted path of the offending field (empty for payload-level issues)
    pub field_path: String,

    /// Human-readable message
    pub message: String,
}

/// Issues collected while applying a rule table
#[derive(Debug, Clone, Default)]
pub struct RuleReport {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl RuleReport {
    /// Empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a structural error
    pub fn add_error(&mut self, code: &str, field_path: &str, message: String) {
        self.errors.push(ValidationIssue {
            code: code.to_string(),
            severity: Severity::Error,
            field_path: field_path.to_string(),
            message,
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, code: &str, field_path: &str, message: String) {
        self.warnings.push(ValidationIssue {
            code: code.to_string(),
            severity: Severity::Warning,
            field_path: field_path.to_string(),
            message,
        });
    }

    /// Add an issue at the given severity
    pub fn add(&mut self, severity: Severity, code: &str, field_path: &str, message: String) {
        match severity {
            Severity::Error => self.add_error(code, field_path, message),
            Severity::Warning => self.add_warning(code, field_path, message),
        }
    }

    /// Structural errors so far
    pub fn errors(&self) -> &[ValidationIssue] {
        &self.errors
    }

    /// Warnings so far
    pub fn warnings(&self) -> &[ValidationIssue] {
        &self.warnings
    }
}

/// Outcome of validating one payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationVerdict {
    /// False once any structural error is found
    pub is_valid: bool,

    /// Confidence in [0, 1], rounded to two places
    pub confidence: f64,

    /// Quality class derived from confidence
    pub quality_class: QualityClass,

    /// Structural errors
    pub errors: Vec<ValidationIssue>,

    /// Warnings
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationVerdict {
    /// Score a finished report
    pub fn from_report(report: RuleReport) -> Self {
        let is_valid = report.errors.is_empty();
        let confidence = confidence_score(report.errors.len(), report.warnings.len(), is_valid);
        Self {
            is_valid,
            confidence,
            quality_class: QualityClass::from_confidence(confidence),
            errors: report.errors,
            warnings: report.warnings,
        }
    }

    /// Verdict for a payload that cannot be scored at all
    pub fn rejected(code: &str, message: String) -> Self {
        let mut report = RuleReport::new();
        report.add_error(code, "", message);
        Self {
            is_valid: false,
            confidence: 0.0,
            quality_class: QualityClass::Poor,
            errors: report.errors,
            warnings: report.warnings,
        }
    }
}

/// 1.0 minus 0.3 per error and 0.1 per warning, floored at 0, capped at 0.3 when invalid
pub fn confidence_score(errors: usize, warnings: usize, is_valid: bool) -> f64 {
    let raw = 1.0 - 0.3 * errors as f64 - 0.1 * warnings as f64;
    let mut confidence = raw.max(0.0);
    if !is_valid {
        confidence = confidence.min(0.3);
    }
    round2(confidence)
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
