//! Cross-source consistency checks
//!
//! Runs once per run over the successful records. Conflicts are advisory
//! notes; they never change a verdict.

use evidence_core::types::bare_domain;
use evidence_core::{EvidenceMap, Payload, SourceKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// What disagreed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// Sources describe different domains
    DomainMismatch,
    /// Sources report different IP addresses
    IpConflict,
    /// One source says malicious, another says clean
    SecurityConflict,
}

/// Suggested follow-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    /// Collect the involved sources again
    Recollect,
    /// A human should look at it
    ManualReview,
}

/// Advisory cross-validation note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossValidationNote {
    /// Conflict kind
    pub kind: ConflictKind,

    /// Human-readable description
    pub message: String,

    /// Probe names involved
    pub sources: Vec<String>,

    /// Suggested follow-up
    pub recommended_action: RecommendedAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum SecurityVerdict {
    Malicious,
    Clean,
}

/// Compare related fields across successful records
pub fn cross_validate(records: &EvidenceMap) -> Vec<CrossValidationNote> {
    let payloads: Vec<(&str, &Payload)> = records
        .iter()
        .filter_map(|(name, record)| record.payload().map(|p| (name.as_str(), p)))
        .collect();

    let mut notes = Vec::new();

    let domains = collect(&payloads, domain_values);
    if domains.len() > 1 {
        notes.push(note(
            ConflictKind::DomainMismatch,
            format!(
                "Multiple domains found in data: {}",
                domains.keys().cloned().collect::<Vec<_>>().join(", ")
            ),
            &domains,
            RecommendedAction::ManualReview,
        ));
    }

    let ips = collect(&payloads, |p| {
        p.str_field("ip_address")
            .map(str::trim)
            .filter(|ip| !ip.is_empty() && *ip != "unknown")
            .map(str::to_string)
            .into_iter()
            .collect::<Vec<String>>()
    });
    if ips.len() > 1 {
        notes.push(note(
            ConflictKind::IpConflict,
            format!(
                "Multiple IP addresses found: {}",
                ips.keys().cloned().collect::<Vec<_>>().join(", ")
            ),
            &ips,
            RecommendedAction::Recollect,
        ));
    }

    let verdicts = collect(&payloads, |p| security_verdict(p).into_iter().collect::<Vec<_>>());
    if verdicts.len() > 1 {
        let detail: Vec<String> = verdicts
            .iter()
            .flat_map(|(v, sources)| sources.iter().map(move |s| format!("{}={:?}", s, v)))
            .collect();
        notes.push(note(
            ConflictKind::SecurityConflict,
            format!("Conflicting security statuses: {}", detail.join(", ")),
            &verdicts,
            RecommendedAction::ManualReview,
        ));
    }

    for n in &notes {
        warn!(kind = ?n.kind, sources = ?n.sources, "Cross-validation conflict: {}", n.message);
    }
    notes
}

/// Group source names by the distinct values they report
fn collect<K: Ord>(
    payloads: &[(&str, &Payload)],
    extract: impl Fn(&Payload) -> Vec<K>,
) -> BTreeMap<K, BTreeSet<String>> {
    let mut grouped: BTreeMap<K, BTreeSet<String>> = BTreeMap::new();
    for &(name, payload) in payloads {
        for value in extract(payload) {
            grouped.entry(value).or_default().insert(name.to_string());
        }
    }
    grouped
}

fn note<K>(
    kind: ConflictKind,
    message: String,
    grouped: &BTreeMap<K, BTreeSet<String>>,
    recommended_action: RecommendedAction,
) -> CrossValidationNote {
    let sources: BTreeSet<String> = grouped.values().flatten().cloned().collect();
    CrossValidationNote {
        kind,
        message,
        sources: sources.into_iter().collect(),
        recommended_action,
    }
}

/// Domain-like values of top-level `*domain*` keys, normalized
fn domain_values(payload: &Payload) -> Vec<String> {
    payload
        .fields()
        .iter()
        .filter(|(key, _)| key.to_lowercase().contains("domain"))
        .filter_map(|(_, value)| value.as_str())
        .filter(|value| value.contains('.'))
        .map(bare_domain)
        .filter(|d| !d.is_empty())
        .collect()
}

fn security_verdict(payload: &Payload) -> Option<SecurityVerdict> {
    match payload.kind() {
        SourceKind::GoogleSafeBrowsing => payload.str_field("Current Status").and_then(classify_status),
        SourceKind::NordVpnMalicious => payload
            .get("is_malicious_nordvpn")
            .and_then(Value::as_bool)
            .map(|m| if m { SecurityVerdict::Malicious } else { SecurityVerdict::Clean }),
        SourceKind::SslTrustBlacklist => payload.str_field("Results").and_then(classify_status),
        _ => None,
    }
}

fn classify_status(status: &str) -> Option<SecurityVerdict> {
    let status = status.to_lowercase();
    if status.contains("no unsafe content")
        || status.contains("not blacklisted")
        || status.contains("not listed")
    {
        Some(SecurityVerdict::Clean)
    } else if status.contains("unsafe")
        || status.contains("malicious")
        || status.contains("blacklisted")
        || status.contains("listed")
    {
        Some(SecurityVerdict::Malicious)
    } else if status.contains("safe") || status.contains("clean") {
        Some(SecurityVerdict::Clean)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evidence_core::{EvidenceRecord, Tier};
    use serde_json::json;
    use std::time::Duration;

    fn insert(records: &mut EvidenceMap, name: &str, value: Value) {
        let fields = match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        };
        records.insert(
            name.to_string(),
            EvidenceRecord::success(
                name,
                Tier::High,
                Payload::for_probe(name, fields),
                Duration::ZERO,
            ),
        );
    }

    #[test]
    fn test_consistent_sources() {
        let mut records = EvidenceMap::new();
        insert(&mut records, "whois_data", json!({"domain_name": "SHOPIFY.COM"}));
        insert(&mut records, "https_check", json!({"domain": "https://www.shopify.com/"}));
        insert(&mut records, "ipvoid", json!({"ip_address": "1.2.3.4"}));
        insert(&mut records, "ipvoid_ip", json!({"ip_address": "1.2.3.4"}));
        assert!(cross_validate(&records).is_empty());
    }

    #[test]
    fn test_ip_conflict() {
        let mut records = EvidenceMap::new();
        insert(&mut records, "ipvoid", json!({"ip_address": "1.2.3.4"}));
        insert(&mut records, "whois_data", json!({"ip_address": "5.6.7.8"}));
        let notes = cross_validate(&records);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, ConflictKind::IpConflict);
        assert_eq!(notes[0].recommended_action, RecommendedAction::Recollect);
        assert_eq!(notes[0].sources, vec!["ipvoid", "whois_data"]);
    }

    #[test]
    fn test_security_conflict() {
        let mut records = EvidenceMap::new();
        insert(
            &mut records,
            "google_safe_browsing",
            json!({"Current Status": "No unsafe content found"}),
        );
        insert(&mut records, "nordvpn_malicious", json!({"is_malicious_nordvpn": true}));
        let notes = cross_validate(&records);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, ConflictKind::SecurityConflict);
        assert_eq!(notes[0].recommended_action, RecommendedAction::ManualReview);
    }

    #[test]
    fn test_agreeing_clean_verdicts() {
        let mut records = EvidenceMap::new();
        insert(&mut records, "google_safe_browsing", json!({"Current Status": "Safe"}));
        insert(&mut records, "nordvpn_malicious", json!({"is_malicious_nordvpn": false}));
        insert(
            &mut records,
            "ssltrust_blacklist",
            json!({"Status": "Finished", "Results": "Not Blacklisted"}),
        );
        assert!(cross_validate(&records).is_empty());
    }
}
