//! Per-source interpretation rules
//!
//! A fixed mapping from source kind and payload shape to human-readable
//! findings and risk strings.

use compliance_service::{CacheStatus, RiskLevel, ScreeningVerdict};
use evidence_core::{EvidenceMap, IndustryProfile, Payload, SourceKind};
use serde_json::Value;

/// Prefix for risks in industries weighted above the high-risk threshold
pub const HIGH_RISK_INDUSTRY_PREFIX: &str = "[HIGH RISK INDUSTRY] ";

const HTTPS_CRITICAL_INDUSTRIES: [&str; 2] = ["fintech_financial", "healthcare"];
const PRIVACY_REGULATED_INDUSTRIES: [&str; 3] = ["fintech_financial", "healthcare", "ecommerce_retail"];
pub(crate) const STRONG_SSL_GRADES: [&str; 3] = ["A+", "A", "A-"];

/// Findings for one successful payload
pub fn findings(payload: &Payload, industry: &str) -> Vec<String> {
    let mut out = Vec::new();
    match payload.kind() {
        SourceKind::HttpsCheck => {
            if payload.bool_field("has_https") == Some(true) {
                out.push("HTTPS encryption implemented (industry requirement)".to_string());
            } else {
                out.push(format!("Missing HTTPS encryption (critical for {})", industry));
            }
        }
        SourceKind::SocialPresence => {
            let linkedin = payload
                .get_path(&["social_presence", "linkedin", "presence"])
                .and_then(Value::as_bool)
                .unwrap_or(false);
            if linkedin {
                let employees = payload
                    .get("employee_count")
                    .map(display)
                    .unwrap_or_else(|| "unknown".to_string());
                out.push(format!(
                    "Professional LinkedIn presence with {} employees",
                    employees
                ));
            }
        }
        SourceKind::PrivacyTerms => {
            let privacy = payload.bool_field("privacy_policy_present") == Some(true);
            let terms = payload.bool_field("terms_of_service_present") == Some(true);
            match (privacy, terms) {
                (true, true) => out.push(format!(
                    "Complete legal documentation (critical for {})",
                    industry
                )),
                (true, false) => {
                    out.push("Privacy policy present but missing terms of service".to_string())
                }
                _ => out.push(format!(
                    "Missing privacy policy (regulatory requirement for {})",
                    industry
                )),
            }
        }
        SourceKind::SslOrgReport => {
            if let Some(grade) = ssl_grade(payload) {
                let label = match grade {
                    "A+" | "A" => "Excellent",
                    "A-" | "B" => "Good",
                    _ => "Poor",
                };
                out.push(format!("{} SSL security grade: {}", label, grade));
            }
        }
        _ => {}
    }
    out
}

/// Risk strings for one successful payload, before the industry prefix
pub fn risks(payload: &Payload, industry: &str) -> Vec<String> {
    let mut out = Vec::new();
    match payload.kind() {
        SourceKind::HttpsCheck if payload.bool_field("has_https") != Some(true) => {
            if HTTPS_CRITICAL_INDUSTRIES.contains(&industry) {
                out.push("CRITICAL: No HTTPS encryption in regulated industry".to_string());
            } else {
                out.push("No HTTPS encryption - security risk".to_string());
            }
        }
        SourceKind::GoogleSafeBrowsing => {
            if payload.str_field("Current Status").map_or(false, flagged_unsafe) {
                out.push("CRITICAL: Flagged as unsafe by Google Safe Browsing".to_string());
            }
        }
        SourceKind::PrivacyTerms if payload.bool_field("privacy_policy_present") != Some(true) => {
            if PRIVACY_REGULATED_INDUSTRIES.contains(&industry) {
                out.push("REGULATORY RISK: No privacy policy in regulated industry".to_string());
            } else {
                out.push("No privacy policy found".to_string());
            }
        }
        _ => {}
    }
    out
}

/// Findings from the screening verdict
pub fn screening_findings(verdict: &ScreeningVerdict) -> Vec<String> {
    let mut out = Vec::new();
    if verdict.risk_level == RiskLevel::Clear && verdict.total_matches == 0 {
        out.push("OFAC sanctions screening clear - full compliance".to_string());
    } else if verdict.total_matches > 0 {
        out.push(format!(
            "OFAC screening: {} potential matches require immediate review",
            verdict.total_matches
        ));
    }
    if verdict.cache_status == CacheStatus::StaleDegraded {
        out.push("OFAC screening used reference data past its refresh window".to_string());
    }
    out
}

/// Risk strings from the screening verdict, before the industry prefix
pub fn screening_risks(verdict: &ScreeningVerdict) -> Vec<String> {
    match verdict.risk_level {
        RiskLevel::HighRisk => vec![
            "CRITICAL: HIGH RISK OFAC sanctions matches - immediate escalation required".to_string(),
        ],
        RiskLevel::MediumRisk => vec![
            "MEDIUM RISK: OFAC potential matches - enhanced due diligence required".to_string(),
        ],
        RiskLevel::Error => {
            vec!["OFAC screening could not be completed - manual review required".to_string()]
        }
        _ if verdict.total_matches > 0 => vec![format!(
            "OFAC screening flagged {} potential matches for review",
            verdict.total_matches
        )],
        _ => Vec::new(),
    }
}

/// Apply the high-risk industry prefix when the profile calls for it
pub fn weight_risks(risks: Vec<String>, profile: &IndustryProfile) -> Vec<String> {
    if profile.is_high_risk_industry() {
        risks
            .into_iter()
            .map(|r| format!("{}{}", HIGH_RISK_INDUSTRY_PREFIX, r))
            .collect()
    } else {
        risks
    }
}

/// Confidence boosters and industry indicators from successful evidence
pub fn industry_signals(records: &EvidenceMap) -> (Vec<String>, Vec<String>) {
    let payload = |probe: &str| records.get(probe).and_then(|r| r.payload());
    let mut boosters = Vec::new();
    let mut indicators = Vec::new();

    let employees = payload("social_presence")
        .and_then(|p| p.get("employee_count"))
        .filter(|v| !v.is_null())
        .map(display)
        .filter(|count| count != "unknown");
    if let Some(count) = employees {
        boosters.push("employee_data_available".to_string());
        indicators.push(format!("employee_scale_{}", count));
    }

    if payload("privacy_terms").and_then(|p| p.bool_field("privacy_policy_present")) == Some(true) {
        boosters.push("privacy_policy_present".to_string());
    }

    if payload("ssl_org_report")
        .and_then(ssl_grade)
        .map_or(false, |g| STRONG_SSL_GRADES.contains(&g))
    {
        boosters.push("high_security_grade".to_string());
        indicators.push("security_focused".to_string());
    }

    (boosters, indicators)
}

/// "No unsafe content found" is clean; other unsafe or malicious wording is not
pub fn flagged_unsafe(status: &str) -> bool {
    let status = status.to_lowercase();
    if status.contains("no unsafe content") {
        return false;
    }
    status.contains("unsafe") || status.contains("malicious")
}

pub(crate) fn ssl_grade(payload: &Payload) -> Option<&str> {
    payload
        .get_path(&["report_summary", "ssl_grade"])
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|g| !g.is_empty() && *g != "unknown")
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
