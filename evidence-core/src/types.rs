//! Core types for evidence collection

use crate::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Evidence records keyed by probe name
pub type EvidenceMap = BTreeMap<String, EvidenceRecord>;

/// Probes whose successful output feeds compliance decisions
pub const COMPLIANCE_RELEVANT_PROBES: [&str; 6] = [
    "ofac_sanctions",
    "privacy_terms",
    "ssl_org_report",
    "google_safe_browsing",
    "whois_data",
    "ipvoid",
];

/// Second-level labels that form a compound public suffix (e.g. `co.uk`)
const COMPOUND_SUFFIX_LABELS: [&str; 7] = ["co", "com", "org", "net", "gov", "ac", "edu"];

/// Priority tier (declaration order is execution order)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Must-have evidence
    Critical,
    /// Strongly preferred evidence
    High,
    /// Supporting evidence
    Medium,
    /// Nice-to-have evidence
    #[serde(alias = "enhanced")]
    Optional,
}

impl Tier {
    /// All tiers in priority order
    pub const ALL: [Tier; 4] = [Tier::Critical, Tier::High, Tier::Medium, Tier::Optional];

    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Critical => "critical",
            Tier::High => "high",
            Tier::Medium => "medium",
            Tier::Optional => "optional",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "critical" => Ok(Tier::Critical),
            "high" => Ok(Tier::High),
            "medium" => Ok(Tier::Medium),
            "optional" | "enhanced" => Ok(Tier::Optional),
            other => Err(Error::UnknownTier(other.to_string())),
        }
    }
}

/// Static description of a probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeDescriptor {
    /// Probe name (unique within a run)
    pub name: String,

    /// Priority tier
    pub tier: Tier,

    /// Maximum execution time
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
}

impl ProbeDescriptor {
    /// Create new descriptor
    pub fn new(name: impl Into<String>, tier: Tier, timeout: Duration) -> Self {
        Self {
            name: name.into(),
            tier,
            timeout,
        }
    }
}

/// Business entity under assessment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Bare domain (no scheme, no `www.`)
    pub domain: String,

    /// Company name used for screening
    pub company_name: String,

    /// Resolved IP address, set for IP follow-up probes
    pub ip_address: Option<String>,
}

impl Target {
    /// Build a target from a domain or URL, deriving the company name from the domain label
    pub fn from_domain(input: &str) -> Self {
        let domain = bare_domain(input);
        let company_name = capitalize(domain_label(&domain));
        Self {
            domain,
            company_name,
            ip_address: None,
        }
    }

    /// Override the derived company name
    pub fn with_company_name(mut self, company_name: impl Into<String>) -> Self {
        self.company_name = company_name.into();
        self
    }

    /// Copy of this target pinned to an IP address
    pub fn with_ip(&self, ip_address: impl Into<String>) -> Self {
        Self {
            ip_address: Some(ip_address.into()),
            ..self.clone()
        }
    }

    /// Registrable label of the domain (`acme` for `www.acme.co.uk`)
    pub fn domain_label(&self) -> &str {
        domain_label(&self.domain)
    }
}

/// Strip scheme, path, port and a leading `www.` from a domain or URL
pub fn bare_domain(input: &str) -> String {
    let trimmed = input.trim().to_ascii_lowercase();
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(&trimmed);
    let host = without_scheme
        .split(|c| c == '/' || c == '?' || c == '#')
        .next()
        .unwrap_or_default();
    let host = host.split(':').next().unwrap_or_default();
    let host = host.strip_prefix("www.").unwrap_or(host);
    host.trim_end_matches('.').to_string()
}

/// Label before the top-level domain, skipping compound suffixes like `co.uk`
pub fn domain_label(domain: &str) -> &str {
    let labels: Vec<&str> = domain.split('.').filter(|l| !l.is_empty()).collect();
    match labels.len() {
        0 => "",
        1 => labels[0],
        n => {
            let tld = labels[n - 1];
            let second = labels[n - 2];
            if n >= 3 && tld.len() == 2 && COMPOUND_SUFFIX_LABELS.contains(&second) {
                labels[n - 3]
            } else {
                second
            }
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Known probe source kinds, each validated by its own rule table
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SourceKind {
    /// HTTPS availability check
    HttpsCheck,
    /// WHOIS registration record
    WhoisData,
    /// Privacy policy / terms of service presence
    PrivacyTerms,
    /// SSL certificate grade report
    SslOrgReport,
    /// Social media and LinkedIn presence
    SocialPresence,
    /// Google Safe Browsing status
    GoogleSafeBrowsing,
    /// Tranco popularity ranking
    TrancoRanking,
    /// IPVoid IP reputation
    IpVoid,
    /// Traffic volume estimates
    TrafficVolume,
    /// NordVPN malicious-domain check
    NordVpnMalicious,
    /// SSLTrust blacklist check
    SslTrustBlacklist,
    /// Unrecognised probe, validated generically
    Other(String),
}

impl SourceKind {
    /// Classify a probe by name (`<name>_ip` follow-ups map to their base kind)
    pub fn from_probe_name(name: &str) -> Self {
        let base = name.strip_suffix("_ip").unwrap_or(name);
        match base {
            "https_check" => SourceKind::HttpsCheck,
            "whois_data" | "godaddy_whois" => SourceKind::WhoisData,
            "privacy_terms" => SourceKind::PrivacyTerms,
            "ssl_org_report" => SourceKind::SslOrgReport,
            "social_presence" => SourceKind::SocialPresence,
            "google_safe_browsing" => SourceKind::GoogleSafeBrowsing,
            "tranco_ranking" => SourceKind::TrancoRanking,
            "ipvoid" => SourceKind::IpVoid,
            "traffic_volume" => SourceKind::TrafficVolume,
            "nordvpn_malicious" => SourceKind::NordVpnMalicious,
            "ssltrust_blacklist" => SourceKind::SslTrustBlacklist,
            _ => SourceKind::Other(name.to_string()),
        }
    }

    /// Canonical name
    pub fn as_str(&self) -> &str {
        match self {
            SourceKind::HttpsCheck => "https_check",
            SourceKind::WhoisData => "whois_data",
            SourceKind::PrivacyTerms => "privacy_terms",
            SourceKind::SslOrgReport => "ssl_org_report",
            SourceKind::SocialPresence => "social_presence",
            SourceKind::GoogleSafeBrowsing => "google_safe_browsing",
            SourceKind::TrancoRanking => "tranco_ranking",
            SourceKind::IpVoid => "ipvoid",
            SourceKind::TrafficVolume => "traffic_volume",
            SourceKind::NordVpnMalicious => "nordvpn_malicious",
            SourceKind::SslTrustBlacklist => "ssltrust_blacklist",
            SourceKind::Other(name) => name,
        }
    }
}

impl From<String> for SourceKind {
    fn from(value: String) -> Self {
        SourceKind::from_probe_name(&value)
    }
}

impl From<SourceKind> for String {
    fn from(value: SourceKind) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured probe output, tagged with the source kind that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    kind: SourceKind,
    fields: Map<String, Value>,
}

impl Payload {
    /// Create payload for an explicit kind
    pub fn new(kind: SourceKind, fields: Map<String, Value>) -> Self {
        Self { kind, fields }
    }

    /// Create payload, classifying the kind from the probe name
    pub fn for_probe(probe_name: &str, fields: Map<String, Value>) -> Self {
        Self::new(SourceKind::from_probe_name(probe_name), fields)
    }

    /// Source kind
    pub fn kind(&self) -> &SourceKind {
        &self.kind
    }

    /// Raw fields
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Top-level field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Nested field (`["report_summary", "ssl_grade"]`)
    pub fn get_path(&self, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        rest.iter()
            .try_fold(self.fields.get(*first)?, |value, key| value.get(*key))
    }

    /// Boolean field; strings like `"true"` do not count
    pub fn bool_field(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    /// String field
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Non-null `error` field reported by the probe itself
    pub fn reported_error(&self) -> Option<String> {
        match self.fields.get("error") {
            None | Some(Value::Null) => None,
            Some(Value::String(msg)) => Some(msg.clone()),
            Some(other) => Some(other.to_string()),
        }
    }

    /// Fields carrying data (excludes `_`-prefixed metadata and `error`)
    pub fn meaningful_field_count(&self) -> usize {
        self.fields
            .keys()
            .filter(|k| !k.starts_with('_') && k.as_str() != "error")
            .count()
    }
}

/// Probe failure classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeErrorKind {
    /// Exceeded its declared timeout
    Timeout,
    /// Raised, panicked or self-reported an error
    Exception,
    /// Returned nothing or a non-object value
    InvalidResult,
}

impl ProbeErrorKind {
    /// Wire name (`error_type` tag)
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeErrorKind::Timeout => "timeout",
            ProbeErrorKind::Exception => "exception",
            ProbeErrorKind::InvalidResult => "invalid_result",
        }
    }

    /// Failure that may clear up on a later run
    pub fn is_transient(&self) -> bool {
        matches!(self, ProbeErrorKind::Timeout | ProbeErrorKind::Exception)
    }
}

impl fmt::Display for ProbeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Probe error, returned by probes and recorded on error Evidence Records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ProbeError {
    /// Classification (`error_type`)
    #[serde(rename = "error_type")]
    pub kind: ProbeErrorKind,

    /// Human-readable detail
    pub message: String,
}

impl ProbeError {
    /// Timed-out probe
    pub fn timeout(limit: Duration) -> Self {
        Self {
            kind: ProbeErrorKind::Timeout,
            message: format!("probe exceeded timeout of {:.1}s", limit.as_secs_f64()),
        }
    }

    /// Probe raised an error
    pub fn exception(message: impl Into<String>) -> Self {
        Self {
            kind: ProbeErrorKind::Exception,
            message: message.into(),
        }
    }

    /// Probe returned unusable output
    pub fn invalid_result(message: impl Into<String>) -> Self {
        Self {
            kind: ProbeErrorKind::InvalidResult,
            message: message.into(),
        }
    }
}

/// Record status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvidenceStatus {
    /// Probe produced a payload
    Success,
    /// Probe failed
    Error,
}

/// Result of one probe invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum EvidenceOutcome {
    /// Payload collected
    Success {
        /// Probe output
        payload: Payload,
    },
    /// Probe failed
    Error {
        /// Failure detail
        error: ProbeError,
    },
}

/// Data quality class
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityClass {
    /// Unusable
    Poor,
    /// Weak
    Low,
    /// Usable with caution
    Medium,
    /// Reliable
    High,
}

impl QualityClass {
    /// Classify a confidence score (≥0.8 high, ≥0.5 medium, ≥0.2 low)
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.8 {
            QualityClass::High
        } else if confidence >= 0.5 {
            QualityClass::Medium
        } else if confidence >= 0.2 {
            QualityClass::Low
        } else {
            QualityClass::Poor
        }
    }

    /// Classify a payload by how many meaningful fields it carries
    pub fn from_field_count(count: usize) -> Self {
        match count {
            n if n >= 5 => QualityClass::High,
            n if n >= 3 => QualityClass::Medium,
            _ => QualityClass::Low,
        }
    }

    /// Numeric score used when averaging quality
    pub fn score(&self) -> f64 {
        match self {
            QualityClass::High => 1.0,
            QualityClass::Medium => 0.6,
            QualityClass::Low => 0.3,
            QualityClass::Poor => 0.0,
        }
    }

    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityClass::High => "high",
            QualityClass::Medium => "medium",
            QualityClass::Low => "low",
            QualityClass::Poor => "poor",
        }
    }
}

/// Normalized wrapper around one probe invocation
///
/// Fields are private: a record is built once by [`EvidenceRecord::success`]
/// or [`EvidenceRecord::failure`] and read through accessors afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceRecord {
    probe_name: String,
    tier: Tier,
    #[serde(flatten)]
    outcome: EvidenceOutcome,
    #[serde(rename = "execution_time_seconds", with = "duration_secs")]
    execution_time: Duration,
    timestamp: DateTime<Utc>,
    quality_class: QualityClass,
    compliance_relevant: bool,
    retry_recommended: bool,
}

impl EvidenceRecord {
    /// Successful invocation
    pub fn success(
        probe_name: impl Into<String>,
        tier: Tier,
        payload: Payload,
        execution_time: Duration,
    ) -> Self {
        let probe_name = probe_name.into();
        let quality_class = QualityClass::from_field_count(payload.meaningful_field_count());
        let compliance_relevant = COMPLIANCE_RELEVANT_PROBES.contains(&probe_name.as_str());
        Self {
            probe_name,
            tier,
            outcome: EvidenceOutcome::Success { payload },
            execution_time,
            timestamp: Utc::now(),
            quality_class,
            compliance_relevant,
            retry_recommended: false,
        }
    }

    /// Failed invocation
    pub fn failure(
        probe_name: impl Into<String>,
        tier: Tier,
        error: ProbeError,
        execution_time: Duration,
        retry_recommended: bool,
    ) -> Self {
        Self {
            probe_name: probe_name.into(),
            tier,
            outcome: EvidenceOutcome::Error { error },
            execution_time,
            timestamp: Utc::now(),
            quality_class: QualityClass::Poor,
            compliance_relevant: false,
            retry_recommended,
        }
    }

    /// Probe name
    pub fn probe_name(&self) -> &str {
        &self.probe_name
    }

    /// Tier the probe ran in
    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// Outcome
    pub fn outcome(&self) -> &EvidenceOutcome {
        &self.outcome
    }

    /// Status
    pub fn status(&self) -> EvidenceStatus {
        match self.outcome {
            EvidenceOutcome::Success { .. } => EvidenceStatus::Success,
            EvidenceOutcome::Error { .. } => EvidenceStatus::Error,
        }
    }

    /// True for successful records
    pub fn is_success(&self) -> bool {
        self.status() == EvidenceStatus::Success
    }

    /// Payload of a successful record
    pub fn payload(&self) -> Option<&Payload> {
        match &self.outcome {
            EvidenceOutcome::Success { payload } => Some(payload),
            EvidenceOutcome::Error { .. } => None,
        }
    }

    /// Failure of an error record
    pub fn error(&self) -> Option<&ProbeError> {
        match &self.outcome {
            EvidenceOutcome::Success { .. } => None,
            EvidenceOutcome::Error { error } => Some(error),
        }
    }

    /// Wall-clock execution time
    pub fn execution_time(&self) -> Duration {
        self.execution_time
    }

    /// Completion timestamp
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Record-level quality class
    pub fn quality_class(&self) -> QualityClass {
        self.quality_class
    }

    /// Feeds compliance decisions
    pub fn compliance_relevant(&self) -> bool {
        self.compliance_relevant
    }

    /// Advisory: a later re-run is worthwhile (never acted on automatically)
    pub fn retry_recommended(&self) -> bool {
        self.retry_recommended
    }
}

/// Serde helper: `Duration` as fractional seconds
pub mod duration_secs {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    /// Serialize as seconds
    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    /// Deserialize from seconds
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        if !secs.is_finite() || secs < 0.0 {
            return Err(de::Error::custom(format!("invalid duration: {}", secs)));
        }
        Ok(Duration::from_secs_f64(secs))
    }
}
