use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Sanctioned entity from a reference list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEntity {
    pub uid: String,
    pub primary_name: String,
    pub alt_names: Vec<String>,
    pub programs: Vec<String>,
    pub list_type: String,
}

impl ReferenceEntity {
    pub fn new(uid: impl Into<String>, primary_name: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            primary_name: primary_name.into(),
            alt_names: Vec::new(),
            programs: Vec::new(),
            list_type: "SDN".to_string(),
        }
    }

    pub fn with_alt_name(mut self, name: impl Into<String>) -> Self {
        self.alt_names.push(name.into());
        self
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.programs.push(program.into());
        self
    }
}

/// Immutable snapshot of a reference list, stamped with its fetch time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceDataset {
    pub entities: Vec<ReferenceEntity>,
    pub fetched_at: DateTime<Utc>,
    pub source: String,
}

impl ReferenceDataset {
    pub fn new(entities: Vec<ReferenceEntity>, source: impl Into<String>) -> Self {
        Self::fetched_at(entities, source, Utc::now())
    }

    pub fn fetched_at(
        entities: Vec<ReferenceEntity>,
        source: impl Into<String>,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            entities,
            fetched_at,
            source: source.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn alternate_count(&self) -> usize {
        self.entities.iter().map(|e| e.alt_names.len()).sum()
    }

    /// Older than `ttl` at `now`
    pub fn is_stale(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        match chrono::Duration::from_std(ttl) {
            Ok(ttl) => now - self.fetched_at > ttl,
            Err(_) => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Fuzzy,
    Partial,
    Exact,
}

/// Which name of the entity matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    PrimaryName,
    AlternateName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub search_term: String,
    pub matched_entity_uid: String,
    pub matched_name: String,
    pub match_type: MatchType,
    pub source: MatchSource,
    pub programs: Vec<String>,
}

/// Domain label correlated with an entity primary name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainMatch {
    pub domain_label: String,
    pub matched_entity_uid: String,
    pub matched_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Clear,
    LowRisk,
    MediumRisk,
    HighRisk,
    Error,
}

impl RiskLevel {
    /// Position in CLEAR < LOW_RISK < MEDIUM_RISK < HIGH_RISK; ERROR is unranked
    pub fn severity(&self) -> Option<u8> {
        match self {
            RiskLevel::Clear => Some(0),
            RiskLevel::LowRisk => Some(1),
            RiskLevel::MediumRisk => Some(2),
            RiskLevel::HighRisk => Some(3),
            RiskLevel::Error => None,
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            RiskLevel::Clear => "Proceed with standard due diligence procedures",
            RiskLevel::LowRisk => "Conduct enhanced due diligence and document findings",
            RiskLevel::MediumRisk => "Require additional documentation and senior approval",
            RiskLevel::HighRisk => "Prohibit transaction - immediate escalation required",
            RiskLevel::Error => "Manual OFAC screening required - automated check failed",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Clear => "CLEAR",
            RiskLevel::LowRisk => "LOW_RISK",
            RiskLevel::MediumRisk => "MEDIUM_RISK",
            RiskLevel::HighRisk => "HIGH_RISK",
            RiskLevel::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the reference data behind a verdict was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheStatus {
    /// Cached data within its TTL
    Fresh,
    /// Fetched during this call
    Refreshed,
    /// Refresh failed; data is past its TTL
    StaleDegraded,
    /// Nothing cached and refresh failed
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceAssessment {
    pub ofac_compliant: bool,
    pub requires_enhanced_due_diligence: bool,
    pub immediate_escalation_required: bool,
    pub requires_manual_review: bool,
}

impl ComplianceAssessment {
    pub fn for_risk(level: RiskLevel) -> Self {
        Self {
            ofac_compliant: level == RiskLevel::Clear,
            requires_enhanced_due_diligence: matches!(
                level,
                RiskLevel::HighRisk | RiskLevel::MediumRisk
            ),
            immediate_escalation_required: level == RiskLevel::HighRisk,
            requires_manual_review: level == RiskLevel::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningVerdict {
    pub screening_id: Uuid,
    pub company_name: String,
    pub domain: Option<String>,
    pub search_terms: Vec<String>,
    pub risk_level: RiskLevel,
    pub total_matches: usize,
    pub exact_matches: usize,
    pub partial_matches: usize,
    pub fuzzy_matches: usize,
    pub match_records: Vec<MatchRecord>,
    pub domain_matches: Vec<DomainMatch>,
    pub recommendation: String,
    pub compliance_assessment: ComplianceAssessment,
    pub cache_status: CacheStatus,
    pub reference_fetched_at: Option<DateTime<Utc>>,
    pub entities_screened: usize,
    pub error: Option<String>,
    pub screened_at: DateTime<Utc>,
}

impl ScreeningVerdict {
    /// Verdict for a call that could not screen at all
    pub fn unavailable(
        company_name: &str,
        domain: Option<&str>,
        cache_status: CacheStatus,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            screening_id: Uuid::new_v4(),
            company_name: company_name.to_string(),
            domain: domain.map(str::to_string),
            search_terms: Vec::new(),
            risk_level: RiskLevel::Error,
            total_matches: 0,
            exact_matches: 0,
            partial_matches: 0,
            fuzzy_matches: 0,
            match_records: Vec::new(),
            domain_matches: Vec::new(),
            recommendation: RiskLevel::Error.recommendation().to_string(),
            compliance_assessment: ComplianceAssessment::for_risk(RiskLevel::Error),
            cache_status,
            reference_fetched_at: None,
            entities_screened: 0,
            error: Some(reason.into()),
            screened_at: Utc::now(),
        }
    }

    /// Reference data was past its TTL
    pub fn is_degraded(&self) -> bool {
        self.cache_status == CacheStatus::StaleDegraded
    }
}
