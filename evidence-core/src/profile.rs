//! Industry profiles
//!
//! A profile decides which probes run in which tier, how many successful
//! sources an assessment needs, and how strongly risk is weighted.

use crate::{Error, Result, Tier};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::warn;

/// Name of the fallback profile
pub const DEFAULT_PROFILE: &str = "default";

/// Industry-specific assessment profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryProfile {
    /// Profile name (e.g. `fintech_financial`)
    pub name: String,

    /// Probe names per tier, in submission order
    #[serde(default)]
    pub tiers: BTreeMap<Tier, Vec<String>>,

    /// Compliance tags this industry cares about
    #[serde(default)]
    pub compliance_focus: Vec<String>,

    /// Successful sources needed for `requirements_met`
    #[serde(default = "default_required_sources")]
    pub required_minimum_sources: usize,

    /// Risk weighting (>1.2 marks a high-risk industry)
    #[serde(default = "default_risk_multiplier")]
    pub risk_multiplier: f64,
}

fn default_required_sources() -> usize {
    5
}

fn default_risk_multiplier() -> f64 {
    1.0
}

impl IndustryProfile {
    /// Names of the built-in presets
    pub const PRESETS: [&'static str; 6] = [
        "fintech_financial",
        "ecommerce_retail",
        "software_saas",
        "healthcare",
        "media_social",
        DEFAULT_PROFILE,
    ];

    /// Built-in preset by name; unknown names fall back to `default`
    pub fn preset(name: &str) -> Self {
        let mut tiers = base_tiers();
        let (focus, required, multiplier): (&[&str], usize, f64) = match name {
            "fintech_financial" => {
                insert_front(&mut tiers, Tier::High, "ssl_org_report");
                (
                    &["sanctions_screening", "financial_licenses", "aml_compliance"],
                    8,
                    1.3,
                )
            }
            "ecommerce_retail" => {
                insert_front(&mut tiers, Tier::High, "tranco_ranking");
                (
                    &["consumer_protection", "payment_security", "privacy_compliance"],
                    6,
                    1.1,
                )
            }
            "software_saas" => {
                tiers
                    .entry(Tier::Critical)
                    .or_default()
                    .insert(1, "ssl_org_report".to_string());
                (
                    &["data_protection", "security_certifications", "privacy_policies"],
                    7,
                    1.0,
                )
            }
            "healthcare" => {
                let critical = tiers.entry(Tier::Critical).or_default();
                critical.push("ssl_org_report".to_string());
                critical.push("ipvoid".to_string());
                (
                    &["hipaa_compliance", "data_security", "medical_licenses"],
                    9,
                    1.4,
                )
            }
            "media_social" => {
                insert_front(&mut tiers, Tier::High, "social_presence");
                (
                    &["content_moderation", "privacy_policies", "user_safety"],
                    6,
                    1.2,
                )
            }
            _ => {
                if name != DEFAULT_PROFILE {
                    warn!(profile = %name, "Unknown industry profile, using default");
                }
                return Self::with_base(
                    DEFAULT_PROFILE,
                    tiers,
                    &["basic_compliance", "business_verification"],
                    5,
                    1.0,
                );
            }
        };
        Self::with_base(name, tiers, focus, required, multiplier)
    }

    fn with_base(
        name: &str,
        tiers: BTreeMap<Tier, Vec<String>>,
        focus: &[&str],
        required_minimum_sources: usize,
        risk_multiplier: f64,
    ) -> Self {
        Self {
            name: name.to_string(),
            tiers,
            compliance_focus: focus.iter().map(|s| s.to_string()).collect(),
            required_minimum_sources,
            risk_multiplier,
        }
    }

    /// Load a custom profile from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse a custom profile from TOML
    pub fn from_toml(content: &str) -> Result<Self> {
        let profile: Self =
            toml::from_str(content).map_err(|e| Error::InvalidProfile(e.to_string()))?;
        if !profile.risk_multiplier.is_finite() || profile.risk_multiplier <= 0.0 {
            return Err(Error::InvalidProfile(format!(
                "risk_multiplier must be positive, got {}",
                profile.risk_multiplier
            )));
        }
        Ok(profile)
    }

    /// Tiers in execution order with duplicate probes removed.
    ///
    /// A probe listed in several tiers runs once, in the highest-priority
    /// tier that names it. Empty tiers are dropped.
    pub fn probe_plan(&self) -> Vec<(Tier, Vec<String>)> {
        let mut seen = HashSet::new();
        self.tiers
            .iter()
            .filter_map(|(tier, names)| {
                let unique: Vec<String> = names
                    .iter()
                    .filter(|n| seen.insert(n.as_str()))
                    .cloned()
                    .collect();
                (!unique.is_empty()).then_some((*tier, unique))
            })
            .collect()
    }

    /// True when the profile weights risk above the high-risk threshold
    pub fn is_high_risk_industry(&self) -> bool {
        self.risk_multiplier > 1.2
    }

    /// True when any tier names the probe
    pub fn includes(&self, probe_name: &str) -> bool {
        self.tiers.values().any(|names| names.iter().any(|n| n == probe_name))
    }
}

impl Default for IndustryProfile {
    fn default() -> Self {
        Self::preset(DEFAULT_PROFILE)
    }
}

fn base_tiers() -> BTreeMap<Tier, Vec<String>> {
    let to_vec = |names: &[&str]| names.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    let mut tiers = BTreeMap::new();
    tiers.insert(
        Tier::Critical,
        to_vec(&["https_check", "privacy_terms", "whois_data", "ofac_sanctions"]),
    );
    tiers.insert(
        Tier::High,
        to_vec(&[
            "google_safe_browsing",
            "ssl_org_report",
            "social_presence",
            "tranco_ranking",
        ]),
    );
    tiers.insert(Tier::Medium, to_vec(&["ipvoid"]));
    tiers.insert(Tier::Optional, Vec::new());
    tiers
}

fn insert_front(tiers: &mut BTreeMap<Tier, Vec<String>>, tier: Tier, probe: &str) {
    tiers.entry(tier).or_default().insert(0, probe.to_string());
}
