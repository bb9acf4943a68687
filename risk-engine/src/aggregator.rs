//! Assessment aggregation

use crate::compliance::compliance_score;
use crate::config::Config;
use crate::interpret;
use crate::types::{AssessmentSummary, ComplianceStatus, IndustryInsights};
use chrono::Utc;
use compliance_service::{RiskLevel, ScreeningVerdict};
use evidence_core::{EvidenceMap, IndustryProfile, QualityClass};
use evidence_validator::ValidationSummary;
use tracing::{debug, info};

/// Aggregator
#[derive(Debug, Clone)]
pub struct Aggregator {
    max_key_findings: usize,
    max_risk_indicators: usize,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl Aggregator {
    /// Create aggregator with the configured caps
    pub fn new(config: &Config) -> Self {
        Self {
            max_key_findings: config.max_key_findings,
            max_risk_indicators: config.max_risk_indicators,
        }
    }

    /// Combine records, verdicts and the screening verdict into a summary
    ///
    /// Never fails: shortfalls and screening errors are reported as data.
    pub fn aggregate(
        &self,
        records: &EvidenceMap,
        validation: &ValidationSummary,
        screening: &ScreeningVerdict,
        profile: &IndustryProfile,
    ) -> AssessmentSummary {
        let total_count = records.len();
        let successful_count = records.values().filter(|r| r.is_success()).count();
        let failed_count = total_count - successful_count;

        let confidences: Vec<f64> = records
            .iter()
            .filter(|(_, record)| record.is_success())
            .filter_map(|(name, _)| validation.verdict(name))
            .filter(|verdict| verdict.is_valid)
            .map(|verdict| verdict.confidence)
            .collect();
        let overall_confidence = mean(&confidences);

        let qualities: Vec<f64> = records.values().map(|r| r.quality_class().score()).collect();
        let data_quality_score = mean(&qualities);

        let (compliance_score, satisfied_focus) = compliance_score(profile, records, screening);
        let requirements_met = successful_count >= profile.required_minimum_sources;

        let mut key_findings = interpret::screening_findings(screening);
        let mut risks = interpret::screening_risks(screening);
        for record in records.values() {
            if let Some(payload) = record.payload() {
                key_findings.extend(interpret::findings(payload, &profile.name));
                risks.extend(interpret::risks(payload, &profile.name));
            }
        }
        debug!(
            findings = key_findings.len(),
            risks = risks.len(),
            "Interpretation complete"
        );
        key_findings.truncate(self.max_key_findings);
        let mut risk_indicators = interpret::weight_risks(risks, profile);
        risk_indicators.truncate(self.max_risk_indicators);

        let compliance_status = ComplianceStatus {
            ofac_screening_completed: screening.risk_level != RiskLevel::Error,
            sanctions_risk: screening.risk_level,
            ofac_compliant: screening.compliance_assessment.ofac_compliant,
            requires_manual_review: screening.compliance_assessment.requires_manual_review,
            reference_data_degraded: screening.is_degraded(),
        };

        let (confidence_boosters, industry_indicators) = interpret::industry_signals(records);
        let industry_insights = IndustryInsights {
            industry: profile.name.clone(),
            requirements_met,
            risk_multiplier: profile.risk_multiplier,
            high_risk_industry: profile.is_high_risk_industry(),
            compliance_focus: profile.compliance_focus.clone(),
            satisfied_focus,
            confidence_boosters,
            industry_indicators,
        };

        info!(
            successful = successful_count,
            failed = failed_count,
            confidence = overall_confidence,
            sanctions_risk = %screening.risk_level,
            requirements_met,
            "Assessment aggregated"
        );

        AssessmentSummary {
            total_count,
            successful_count,
            failed_count,
            overall_confidence,
            quality_class: QualityClass::from_confidence(overall_confidence),
            data_quality_score,
            compliance_score,
            requirements_met,
            screening_verdict: screening.clone(),
            key_findings,
            risk_indicators,
            compliance_status,
            industry_insights,
            cross_validation_notes: validation.notes.clone(),
            generated_at: Utc::now(),
        }
    }
}

/// Mean rounded to two places; 0 for no values
fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    (mean * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use compliance_service::{CacheStatus, ComplianceAssessment};
    use evidence_core::{EvidenceRecord, Payload, ProbeError, Tier};
    use evidence_validator::validate_run;
    use serde_json::{json, Value};
    use std::time::Duration;

    fn success(records: &mut EvidenceMap, name: &str, value: Value) {
        let fields = value.as_object().cloned().unwrap_or_default();
        records.insert(
            name.to_string(),
            EvidenceRecord::success(name, Tier::High, Payload::for_probe(name, fields), Duration::ZERO),
        );
    }

    fn failure(records: &mut EvidenceMap, name: &str) {
        records.insert(
            name.to_string(),
            EvidenceRecord::failure(
                name,
                Tier::High,
                ProbeError::timeout(Duration::from_secs(30)),
                Duration::from_secs(30),
                true,
            ),
        );
    }

    fn verdict(level: RiskLevel, matches: usize) -> ScreeningVerdict {
        let mut v = ScreeningVerdict::unavailable("Acme", Some("acme.com"), CacheStatus::Fresh, "");
        v.risk_level = level;
        v.total_matches = matches;
        v.recommendation = level.recommendation().to_string();
        v.compliance_assessment = ComplianceAssessment::for_risk(level);
        v.error = None;
        v
    }

    #[test]
    fn test_failed_records_excluded_from_confidence() {
        let mut records = EvidenceMap::new();
        success(&mut records, "https_check", json!({"has_https": true, "protocol": "HTTPS"}));
        success(&mut records, "privacy_terms", json!({"privacy_policy_present": "yes"}));
        failure(&mut records, "whois_data");

        let validation = validate_run(&records);
        let summary = Aggregator::default().aggregate(
            &records,
            &validation,
            &verdict(RiskLevel::Clear, 0),
            &IndustryProfile::default(),
        );

        assert_eq!(summary.total_count, 3);
        assert_eq!(summary.successful_count, 2);
        assert_eq!(summary.failed_count, 1);
        // 1.0 and 0.9 from one type warning
        assert_eq!(summary.overall_confidence, 0.95);
        assert_eq!(summary.quality_class, QualityClass::High);
        assert!(!summary.requirements_met);
        assert_eq!(summary.key_findings[0], "OFAC sanctions screening clear - full compliance");
    }

    #[test]
    fn test_caps_and_prefix() {
        let mut records = EvidenceMap::new();
        success(&mut records, "https_check", json!({"has_https": false, "protocol": "HTTP"}));
        success(&mut records, "privacy_terms", json!({"privacy_policy_present": false}));
        success(
            &mut records,
            "google_safe_browsing",
            json!({"Current Status": "Some pages on this website are unsafe"}),
        );

        let aggregator = Aggregator::new(&Config {
            max_risk_indicators: 2,
            ..Config::default()
        });
        let summary = aggregator.aggregate(
            &records,
            &validate_run(&records),
            &verdict(RiskLevel::HighRisk, 1),
            &IndustryProfile::preset("fintech_financial"),
        );

        assert_eq!(summary.risk_indicators.len(), 2);
        assert_eq!(
            summary.risk_indicators[0],
            "[HIGH RISK INDUSTRY] CRITICAL: HIGH RISK OFAC sanctions matches - immediate escalation required"
        );
        assert!(summary
            .risk_indicators
            .iter()
            .all(|r| r.starts_with(interpret::HIGH_RISK_INDUSTRY_PREFIX)));
        assert!(summary.compliance_status.ofac_screening_completed);
        assert!(!summary.compliance_status.ofac_compliant);
    }

    #[test]
    fn test_screening_error_surfaces() {
        let records = EvidenceMap::new();
        let error = ScreeningVerdict::unavailable("Acme", None, CacheStatus::Unavailable, "fetch failed");
        let summary = Aggregator::default().aggregate(
            &records,
            &validate_run(&records),
            &error,
            &IndustryProfile::default(),
        );

        assert_eq!(summary.total_count, 0);
        assert_eq!(summary.overall_confidence, 0.0);
        assert_eq!(summary.quality_class, QualityClass::Poor);
        assert!(!summary.compliance_status.ofac_screening_completed);
        assert!(summary.compliance_status.requires_manual_review);
        assert_eq!(
            summary.risk_indicators,
            vec!["OFAC screening could not be completed - manual review required"]
        );
        assert!(summary.key_findings.is_empty());
    }

    #[test]
    fn test_data_quality_score() {
        let mut records = EvidenceMap::new();
        success(
            &mut records,
            "whois_data",
            json!({"domain_name": "acme.com", "registrar": "R", "creation_date": "2001-01-01",
                   "expiration_date": "2030-01-01", "name_servers": ["ns1"]}),
        );
        failure(&mut records, "ipvoid");

        let summary = Aggregator::default().aggregate(
            &records,
            &validate_run(&records),
            &verdict(RiskLevel::Clear, 0),
            &IndustryProfile::default(),
        );
        // high (1.0) and poor (0.0)
        assert_eq!(summary.data_quality_score, 0.5);
    }
}
