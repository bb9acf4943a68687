//! Screening configuration

use crate::error::{ComplianceError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Published OFAC Specially Designated Nationals list
pub const DEFAULT_SDN_URL: &str = "https://www.treasury.gov/ofac/downloads/sdn.xml";

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Screening engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Reference data time-to-live in seconds
    pub cache_ttl_secs: u64,

    /// Shorter side of a partial match must be at least this long
    pub min_partial_length: usize,

    /// Word overlap needed for a fuzzy match
    pub fuzzy_overlap_threshold: f64,

    /// Partial matches above this count escalate to MEDIUM_RISK
    pub medium_risk_partial_threshold: usize,

    /// Legal-entity suffixes stripped from company names
    pub legal_suffixes: Vec<String>,

    /// SDN XML download URL
    pub sdn_url: String,

    /// Download timeout in seconds
    pub request_timeout_secs: u64,

    /// User-Agent header for the download
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 24 * 60 * 60,
            min_partial_length: 4,
            fuzzy_overlap_threshold: 0.5,
            medium_risk_partial_threshold: 2,
            legal_suffixes: ["inc", "llc", "corp", "corporation", "company", "co", "ltd", "limited"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            sdn_url: DEFAULT_SDN_URL.to_string(),
            request_timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ComplianceError::Config(format!("Failed to read {}: {}", path.as_ref().display(), e))
        })?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| ComplianceError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Apply `KYB_*` environment overrides in place
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var("KYB_OFAC_SDN_URL") {
            self.sdn_url = url;
        }

        if let Some(ttl) = env_parse("KYB_SANCTIONS_CACHE_TTL_SECS")? {
            self.cache_ttl_secs = ttl;
        }

        if let Some(length) = env_parse("KYB_MIN_PARTIAL_LENGTH")? {
            self.min_partial_length = length;
        }

        if let Some(threshold) = env_parse("KYB_FUZZY_OVERLAP_THRESHOLD")? {
            self.fuzzy_overlap_threshold = threshold;
        }

        self.validate()
    }

    /// Reject unusable values
    pub fn validate(&self) -> Result<()> {
        if !(self.fuzzy_overlap_threshold > 0.0 && self.fuzzy_overlap_threshold <= 1.0) {
            return Err(ComplianceError::Config(format!(
                "fuzzy_overlap_threshold must be in (0, 1], got {}",
                self.fuzzy_overlap_threshold
            )));
        }
        if self.min_partial_length == 0 {
            return Err(ComplianceError::Config("min_partial_length must be at least 1".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ComplianceError::Config("request_timeout_secs must be at least 1".into()));
        }
        Ok(())
    }

    /// Reference data time-to-live
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Download timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ComplianceError::Config(format!("Invalid value for {}: {}", key, raw))),
        Err(_) => Ok(None),
    }
}
