//! Per-source rule tables
//!
//! Each known source kind has a static table of presence rules, field
//! checks and custom checks. Unknown sources use the generic table.
//! Field checks skip values that are `null` or the string `"unknown"`.

use crate::verdict::{RuleReport, Severity};
use evidence_core::{Payload, SourceKind};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use std::net::Ipv4Addr;

lazy_static! {
    static ref DATE_PATTERNS: Vec<Regex> = [
        r"\d{4}-\d{2}-\d{2}",
        r"\d{2}/\d{2}/\d{4}",
        r"\d{2}-\d{2}-\d{4}",
        r"\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect();
    static ref COUNTRY_CODE: Regex = Regex::new(r"^[A-Z]{2}$").unwrap();
}

/// SSL Labs grade set
pub const SSL_GRADES: [&str; 10] = ["A+", "A", "A-", "B", "C", "D", "E", "F", "T", "M"];

/// Substrings that identify a recognised safe-browsing status
pub const SECURITY_STATUSES: [&str; 5] = [
    "safe",
    "unsafe",
    "unknown",
    "no unsafe content found",
    "malicious",
];

const ERROR_INDICATORS: [&str; 4] = ["error", "failed", "timeout", "exception"];

/// Field-level check
#[derive(Debug, Clone, Copy)]
pub enum Check {
    /// JSON boolean (strings like `"true"` fail)
    Boolean,
    /// String from a fixed set
    OneOf(&'static [&'static str]),
    /// String containing one of the given substrings, case-insensitive
    ContainsAny(&'static [&'static str]),
    /// Dotted-quad IPv4 address
    Ipv4,
    /// String containing an ISO-like or slashed date
    Date,
    /// Number ≥ 0
    NonNegative,
    /// Non-negative integer, or a string of digits
    Count,
    /// Number within inclusive bounds
    Range(f64, f64),
}

impl Check {
    /// Code reported when the check fails
    pub fn code(&self) -> &'static str {
        match self {
            Check::Boolean | Check::NonNegative | Check::Count => "TYPE_MISMATCH",
            Check::OneOf(_) | Check::ContainsAny(_) => "UNEXPECTED_VALUE",
            Check::Ipv4 | Check::Date => "INVALID_FORMAT",
            Check::Range(..) => "OUT_OF_RANGE",
        }
    }

    /// Apply the check, returning a failure message
    pub fn apply(&self, field: &str, value: &Value) -> Option<String> {
        match self {
            Check::Boolean => (!value.is_boolean()).then(|| format!("{} should be boolean", field)),
            Check::OneOf(allowed) => match value.as_str() {
                Some(s) if allowed.contains(&s) => None,
                _ => Some(format!("Unexpected {} value: {}", field, display(value))),
            },
            Check::ContainsAny(needles) => {
                let text = value.as_str().unwrap_or_default().to_lowercase();
                (!needles.iter().any(|n| text.contains(n)))
                    .then(|| format!("Unexpected {} value: {}", field, display(value)))
            }
            Check::Ipv4 => match value.as_str().map(|s| s.parse::<Ipv4Addr>()) {
                Some(Ok(_)) => None,
                _ => Some(format!("Invalid IP address format: {}", display(value))),
            },
            Check::Date => {
                let text = display(value);
                (!DATE_PATTERNS.iter().any(|re| re.is_match(&text)))
                    .then(|| format!("Invalid date format in {}", field))
            }
            Check::NonNegative => match value.as_f64() {
                None => Some(format!("{} should be numeric", field)),
                Some(n) if n < 0.0 => Some(format!("Negative value in {}", field)),
                Some(_) => None,
            },
            Check::Count => {
                let ok = value.is_u64()
                    || value
                        .as_str()
                        .map(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()))
                        .unwrap_or(false);
                (!ok).then(|| format!("{} is not numeric", field))
            }
            Check::Range(lo, hi) => match value.as_f64() {
                Some(n) if n >= *lo && n <= *hi => None,
                _ => Some(format!(
                    "{} should be between {} and {}, got {}",
                    field,
                    lo,
                    hi,
                    display(value)
                )),
            },
        }
    }
}

/// A check bound to a field path
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    /// Path from the payload root
    pub path: &'static [&'static str],

    /// Check to apply
    pub check: Check,

    /// Severity on failure
    pub severity: Severity,
}

/// Hand-written check for shapes a field rule cannot express
pub type CustomRule = fn(&Payload, &mut RuleReport);

/// Rules for one source kind
#[derive(Debug)]
pub struct RuleTable {
    /// Table name
    pub name: &'static str,

    /// Fields that each raise a warning when missing
    pub required: &'static [&'static str],

    /// Fields of which more than half missing raises one warning
    pub expected: &'static [&'static str],

    /// Field checks
    pub fields: &'static [FieldRule],

    /// Custom checks
    pub custom: &'static [CustomRule],
}

impl RuleTable {
    /// Apply every rule in the table to the payload
    pub fn apply(&self, payload: &Payload, report: &mut RuleReport) {
        for field in self.required {
            if payload.get(field).is_none() {
                report.add_warning("MISSING_FIELD", field, format!("Missing field: {}", field));
            }
        }

        let missing: Vec<&str> = self
            .expected
            .iter()
            .copied()
            .filter(|f| payload.get(f).is_none())
            .collect();
        if missing.len() * 2 > self.expected.len() {
            report.add_warning(
                "MISSING_FIELDS",
                "",
                format!("Many missing {} fields: {:?}", self.name, missing),
            );
        }

        for rule in self.fields.iter().chain(COMMON_FIELDS.iter()) {
            let Some(value) = payload.get_path(rule.path) else {
                continue;
            };
            if is_unknown(value) {
                continue;
            }
            let path = rule.path.join(".");
            if let Some(message) = rule.check.apply(&path, value) {
                report.add(rule.severity, rule.check.code(), &path, message);
            }
        }

        for custom in self.custom {
            custom(payload, report);
        }
    }
}

/// Rule table for a source kind
pub fn table_for(kind: &SourceKind) -> &'static RuleTable {
    match kind {
        SourceKind::HttpsCheck => &HTTPS_CHECK,
        SourceKind::WhoisData => &WHOIS_DATA,
        SourceKind::PrivacyTerms => &PRIVACY_TERMS,
        SourceKind::SslOrgReport => &SSL_ORG_REPORT,
        SourceKind::SocialPresence => &SOCIAL_PRESENCE,
        SourceKind::GoogleSafeBrowsing => &GOOGLE_SAFE_BROWSING,
        SourceKind::TrancoRanking => &TRANCO_RANKING,
        SourceKind::IpVoid => &IPVOID,
        SourceKind::TrafficVolume => &TRAFFIC_VOLUME,
        SourceKind::NordVpnMalicious => &NORDVPN_MALICIOUS,
        SourceKind::SslTrustBlacklist => &SSLTRUST_BLACKLIST,
        SourceKind::Other(_) => &GENERIC,
    }
}

const fn warn(path: &'static [&'static str], check: Check) -> FieldRule {
    FieldRule {
        path,
        check,
        severity: Severity::Warning,
    }
}

const fn error(path: &'static [&'static str], check: Check) -> FieldRule {
    FieldRule {
        path,
        check,
        severity: Severity::Error,
    }
}

/// Checked on every table
static COMMON_FIELDS: [FieldRule; 1] = [warn(&["score"], Check::Range(0.0, 10.0))];

static HTTPS_CHECK: RuleTable = RuleTable {
    name: "https_check",
    required: &["has_https", "protocol"],
    expected: &[],
    fields: &[
        error(&["has_https"], Check::Boolean),
        warn(&["protocol"], Check::OneOf(&["HTTP", "HTTPS", "None"])),
    ],
    custom: &[],
};

static WHOIS_DATA: RuleTable = RuleTable {
    name: "WHOIS",
    required: &[],
    expected: &["domain_name", "registrar", "creation_date", "expiration_date"],
    fields: &[
        warn(&["creation_date"], Check::Date),
        warn(&["expiration_date"], Check::Date),
        warn(&["updated_date"], Check::Date),
    ],
    custom: &[],
};

static SSL_ORG_REPORT: RuleTable = RuleTable {
    name: "ssl_org_report",
    required: &[],
    expected: &[],
    fields: &[warn(&["report_summary", "ssl_grade"], Check::OneOf(&SSL_GRADES))],
    custom: &[],
};

static SOCIAL_PRESENCE: RuleTable = RuleTable {
    name: "social_presence",
    required: &[],
    expected: &[],
    fields: &[warn(&["employee_count"], Check::Count)],
    custom: &[check_social_platforms],
};

static GOOGLE_SAFE_BROWSING: RuleTable = RuleTable {
    name: "google_safe_browsing",
    required: &[],
    expected: &[],
    fields: &[warn(&["Current Status"], Check::ContainsAny(&SECURITY_STATUSES))],
    custom: &[],
};

static IPVOID: RuleTable = RuleTable {
    name: "ipvoid",
    required: &[],
    expected: &[],
    fields: &[error(&["ip_address"], Check::Ipv4)],
    custom: &[check_country_code, check_detections],
};

static TRAFFIC_VOLUME: RuleTable = RuleTable {
    name: "traffic_volume",
    required: &[],
    expected: &[],
    fields: &[
        warn(&["last_month_traffic"], Check::NonNegative),
        warn(&["previous_month_traffic"], Check::NonNegative),
        warn(&["year_ago_traffic"], Check::NonNegative),
    ],
    custom: &[],
};

static PRIVACY_TERMS: RuleTable = RuleTable {
    name: "privacy_terms",
    required: &[],
    expected: &[],
    fields: &[
        warn(&["privacy_policy_present"], Check::Boolean),
        warn(&["terms_of_service_present"], Check::Boolean),
        warn(&["is_accessible"], Check::Boolean),
        warn(&["ssl_valid"], Check::Boolean),
    ],
    custom: &[],
};

static TRANCO_RANKING: RuleTable = RuleTable {
    name: "tranco_ranking",
    required: &["Tranco Rank"],
    expected: &[],
    fields: &[warn(&["Tranco Rank"], Check::Count)],
    custom: &[],
};

static NORDVPN_MALICIOUS: RuleTable = RuleTable {
    name: "nordvpn_malicious",
    required: &["is_malicious_nordvpn"],
    expected: &[],
    fields: &[error(&["is_malicious_nordvpn"], Check::Boolean)],
    custom: &[],
};

static SSLTRUST_BLACKLIST: RuleTable = RuleTable {
    name: "ssltrust_blacklist",
    required: &["Status", "Results"],
    expected: &[],
    fields: &[],
    custom: &[],
};

static GENERIC: RuleTable = RuleTable {
    name: "generic",
    required: &[],
    expected: &[],
    fields: &[],
    custom: &[check_error_indicators, check_sparse_fields],
};

fn check_social_platforms(payload: &Payload, report: &mut RuleReport) {
    let Some(platforms) = payload.get("social_presence").and_then(Value::as_object) else {
        return;
    };
    for (platform, info) in platforms {
        let well_formed = info.as_object().map_or(false, |o| o.contains_key("presence"));
        if !well_formed {
            report.add_warning(
                "INVALID_FORMAT",
                &format!("social_presence.{}", platform),
                format!("Invalid format for {} data", platform),
            );
        }
    }
}

fn check_country_code(payload: &Payload, report: &mut RuleReport) {
    let Some(raw) = payload.str_field("country_code") else {
        return;
    };
    // "Germany (DE)" carries the code in parentheses
    let code = raw
        .split_once('(')
        .and_then(|(_, rest)| rest.split_once(')'))
        .map(|(inner, _)| inner)
        .unwrap_or(raw)
        .trim();
    if code == "unknown" {
        return;
    }
    if !COUNTRY_CODE.is_match(code) {
        report.add_warning(
            "INVALID_FORMAT",
            "country_code",
            format!("Invalid country code format: {}", code),
        );
    }
}

fn check_detections(payload: &Payload, report: &mut RuleReport) {
    let Some(detections) = payload.get("detections_count").and_then(Value::as_object) else {
        return;
    };
    let (Some(detected), Some(checks)) = (detections.get("detected"), detections.get("checks"))
    else {
        return;
    };
    match (detected.as_i64(), checks.as_i64()) {
        (Some(detected), Some(checks)) if detected > checks => report.add_warning(
            "OUT_OF_RANGE",
            "detections_count",
            "Detected count exceeds total checks".to_string(),
        ),
        (Some(_), Some(_)) => {}
        _ => report.add_warning(
            "TYPE_MISMATCH",
            "detections_count",
            "Detection counts should be integers".to_string(),
        ),
    }
}

fn check_error_indicators(payload: &Payload, report: &mut RuleReport) {
    for (key, value) in payload.fields() {
        let key_lower = key.to_lowercase();
        let value_lower = display(value).to_lowercase();
        if ERROR_INDICATORS
            .iter()
            .any(|i| key_lower.contains(i) || value_lower.contains(i))
        {
            report.add_warning(
                "ERROR_INDICATOR",
                key,
                format!("Potential error indicator in {}: {}", key, display(value)),
            );
        }
    }
}

fn check_sparse_fields(payload: &Payload, report: &mut RuleReport) {
    let fields = payload.fields();
    let empty: Vec<&str> = fields
        .iter()
        .filter(|(_, v)| is_empty_value(v))
        .map(|(k, _)| k.as_str())
        .collect();
    if empty.len() * 2 > fields.len() {
        report.add_warning("SPARSE_DATA", "", format!("Many empty fields: {:?}", empty));
    }
}

/// `false` and `0` count as data
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

fn is_unknown(value: &Value) -> bool {
    value.is_null() || value.as_str() == Some("unknown")
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
