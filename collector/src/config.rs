//! Configuration for the collector

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Collector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Concurrent probes per tier
    pub max_workers: usize,

    /// Pause between tiers in milliseconds (0 disables)
    pub inter_tier_delay_ms: u64,

    /// Timeout for probes registered without their own
    pub default_probe_timeout_secs: u64,

    /// Failures after which a probe is no longer retry-recommended
    pub retry_failure_limit: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_workers: 3,
            inter_tier_delay_ms: 1000,
            default_probe_timeout_secs: 30,
            retry_failure_limit: 5,
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Apply `KYB_*` environment overrides in place
    pub fn apply_env(&mut self) -> crate::Result<()> {
        if let Some(workers) = env_parse("KYB_MAX_WORKERS")? {
            self.max_workers = workers;
        }

        if let Some(delay) = env_parse("KYB_TIER_DELAY_MS")? {
            self.inter_tier_delay_ms = delay;
        }

        if let Some(timeout) = env_parse("KYB_PROBE_TIMEOUT_SECS")? {
            self.default_probe_timeout_secs = timeout;
        }

        self.validate()
    }

    /// Reject unusable values
    pub fn validate(&self) -> crate::Result<()> {
        if self.max_workers == 0 {
            return Err(crate::Error::Config("max_workers must be at least 1".into()));
        }
        if self.default_probe_timeout_secs == 0 {
            return Err(crate::Error::Config(
                "default_probe_timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Inter-tier delay
    pub fn inter_tier_delay(&self) -> Duration {
        Duration::from_millis(self.inter_tier_delay_ms)
    }

    /// Default probe timeout
    pub fn default_probe_timeout(&self) -> Duration {
        Duration::from_secs(self.default_probe_timeout_secs)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> crate::Result<Option<T>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| crate::Error::Config(format!("Invalid value for {}: {}", key, raw))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.max_workers, 3);
        assert_eq!(config.inter_tier_delay(), Duration::from_secs(1));
        assert_eq!(config.default_probe_timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str("max_workers = 2").unwrap();
        assert_eq!(config.max_workers, 2);
        assert_eq!(config.retry_failure_limit, 5);
    }

    #[test]
    fn test_zero_workers_rejected() {
        let config = Config {
            max_workers: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
