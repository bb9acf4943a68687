//! Compliance focus tags
//!
//! A tag is satisfied only by present, error-free evidence that reports a
//! positive indicator. Unknown tags are never satisfied.

use crate::interpret::{flagged_unsafe, ssl_grade, STRONG_SSL_GRADES};
use compliance_service::{RiskLevel, ScreeningVerdict};
use evidence_core::{EvidenceMap, IndustryProfile, Payload};

/// Whether this run's evidence satisfies one tag
pub fn tag_satisfied(tag: &str, records: &EvidenceMap, screening: &ScreeningVerdict) -> bool {
    let https = || payload(records, "https_check").and_then(|p| p.bool_field("has_https")) == Some(true);
    let privacy = || {
        payload(records, "privacy_terms").and_then(|p| p.bool_field("privacy_policy_present"))
            == Some(true)
    };

    match tag {
        "sanctions_screening" => screening.risk_level != RiskLevel::Error,
        "aml_compliance" => screening.compliance_assessment.ofac_compliant,
        "data_protection" | "privacy_compliance" | "privacy_policies" => privacy(),
        "security_certifications" => payload(records, "ssl_org_report")
            .and_then(ssl_grade)
            .map_or(false, |g| STRONG_SSL_GRADES.contains(&g)),
        "data_security" | "payment_security" => https(),
        "consumer_protection" => {
            payload(records, "privacy_terms").and_then(|p| p.bool_field("terms_of_service_present"))
                == Some(true)
        }
        "user_safety" => payload(records, "google_safe_browsing")
            .and_then(|p| p.str_field("Current Status"))
            .map_or(false, |status| !flagged_unsafe(status)),
        "business_verification" => payload(records, "whois_data").map_or(false, |p| {
            ["domain_name", "registrar", "creation_date"]
                .iter()
                .any(|f| p.get(f).map_or(false, |v| !v.is_null()))
        }),
        "basic_compliance" => https() && privacy(),
        _ => false,
    }
}

/// Satisfied tags and the satisfied fraction, rounded to two places
pub fn compliance_score(
    profile: &IndustryProfile,
    records: &EvidenceMap,
    screening: &ScreeningVerdict,
) -> (f64, Vec<String>) {
    let satisfied: Vec<String> = profile
        .compliance_focus
        .iter()
        .filter(|tag| tag_satisfied(tag, records, screening))
        .cloned()
        .collect();
    let denominator = profile.compliance_focus.len().max(1) as f64;
    let score = (satisfied.len() as f64 / denominator * 100.0).round() / 100.0;
    (score, satisfied)
}

fn payload<'a>(records: &'a EvidenceMap, probe: &str) -> Option<&'a Payload> {
    records.get(probe).and_then(|r| r.payload())
}
