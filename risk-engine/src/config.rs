//! Configuration for risk engine

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Risk engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service name used in logs
    pub service_name: String,

    /// Probe scheduling
    pub collector: collector::Config,

    /// Sanctions screening
    pub screening: compliance_service::Config,

    /// Cap on summary findings
    pub max_key_findings: usize,

    /// Cap on summary risk indicators
    pub max_risk_indicators: usize,

    /// Logging
    pub log: LogConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter used when `RUST_LOG` is unset
    pub level: String,

    /// Emit JSON lines instead of compact text
    pub json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "kyb-risk".to_string(),
            collector: collector::Config::default(),
            screening: compliance_service::Config::default(),
            max_key_findings: 10,
            max_risk_indicators: 5,
            log: LogConfig::default(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Config {
    /// Load from file, then apply environment overrides
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.apply_env()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Apply `KYB_*` overrides here and in the nested sections
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(level) = std::env::var("KYB_LOG_LEVEL") {
            self.log.level = level;
        }

        if let Ok(raw) = std::env::var("KYB_LOG_JSON") {
            self.log.json = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => return Err(Error::Config(format!("Invalid value for KYB_LOG_JSON: {}", raw))),
            };
        }

        self.collector.apply_env()?;
        self.screening.apply_env()?;
        self.validate()
    }

    /// Reject unusable values
    pub fn validate(&self) -> Result<()> {
        self.collector.validate()?;
        self.screening.validate()?;
        if self.max_key_findings == 0 || self.max_risk_indicators == 0 {
            return Err(Error::Config("summary caps must be at least 1".into()));
        }
        Ok(())
    }
}
