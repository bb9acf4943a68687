//! Probe registry and per-run tier plans

use crate::{Error, Probe, Result};
use evidence_core::{IndustryProfile, ProbeDescriptor, Tier};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// A probe bound to its descriptor for one run
#[derive(Clone)]
pub struct ScheduledProbe {
    /// Name, tier and timeout
    pub descriptor: ProbeDescriptor,

    /// Implementation
    pub probe: Arc<dyn Probe>,
}

impl fmt::Debug for ScheduledProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledProbe")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// Probes to run together in one tier
#[derive(Debug, Clone)]
pub struct TierPlan {
    /// Tier
    pub tier: Tier,

    /// Probes in submission order
    pub probes: Vec<ScheduledProbe>,
}

#[derive(Clone)]
struct Entry {
    probe: Arc<dyn Probe>,
    timeout: Duration,
}

/// Named probes available to the collector
///
/// Tier membership is decided per run by an [`IndustryProfile`]; the
/// registry only knows names, implementations and timeouts.
pub struct ProbeRegistry {
    probes: BTreeMap<String, Entry>,
    ip_probes: BTreeMap<String, Entry>,
    default_timeout: Duration,
}

impl ProbeRegistry {
    /// Create empty registry
    pub fn new(default_timeout: Duration) -> Self {
        Self {
            probes: BTreeMap::new(),
            ip_probes: BTreeMap::new(),
            default_timeout,
        }
    }

    /// Register a domain probe with the default timeout
    pub fn register(&mut self, name: impl Into<String>, probe: Arc<dyn Probe>) -> Result<()> {
        let timeout = self.default_timeout;
        self.register_with_timeout(name, probe, timeout)
    }

    /// Register a domain probe with its own timeout
    pub fn register_with_timeout(
        &mut self,
        name: impl Into<String>,
        probe: Arc<dyn Probe>,
        timeout: Duration,
    ) -> Result<()> {
        insert(&mut self.probes, name.into(), Entry { probe, timeout })
    }

    /// Register a probe that runs against a resolved IP address
    pub fn register_ip_probe(&mut self, name: impl Into<String>, probe: Arc<dyn Probe>) -> Result<()> {
        let timeout = self.default_timeout;
        insert(&mut self.ip_probes, name.into(), Entry { probe, timeout })
    }

    /// Bind a registered probe to a tier
    pub fn schedule(&self, name: &str, tier: Tier) -> Result<ScheduledProbe> {
        let entry = self
            .probes
            .get(name)
            .ok_or_else(|| Error::UnknownProbe(name.to_string()))?;
        Ok(ScheduledProbe {
            descriptor: ProbeDescriptor::new(name, tier, entry.timeout),
            probe: Arc::clone(&entry.probe),
        })
    }

    /// Build the tier plan for a profile
    ///
    /// Profile names without a registered probe are skipped with a warning.
    pub fn plan(&self, profile: &IndustryProfile) -> Vec<TierPlan> {
        profile
            .probe_plan()
            .into_iter()
            .filter_map(|(tier, names)| {
                let probes: Vec<ScheduledProbe> = names
                    .iter()
                    .filter_map(|name| match self.schedule(name, tier) {
                        Ok(scheduled) => Some(scheduled),
                        Err(e) => {
                            warn!(profile = %profile.name, tier = %tier, "Skipping probe: {}", e);
                            None
                        }
                    })
                    .collect();
                debug!(tier = %tier, count = probes.len(), "Planned tier");
                (!probes.is_empty()).then_some(TierPlan { tier, probes })
            })
            .collect()
    }

    /// IP follow-up probes, keyed `<name>_ip`
    pub fn ip_follow_up(&self) -> Vec<ScheduledProbe> {
        self.ip_probes
            .iter()
            .map(|(name, entry)| ScheduledProbe {
                descriptor: ProbeDescriptor::new(format!("{}_ip", name), Tier::Optional, entry.timeout),
                probe: Arc::clone(&entry.probe),
            })
            .collect()
    }

    /// Registered domain probe names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.probes.keys().map(String::as_str)
    }

    /// True if a domain probe is registered under this name
    pub fn contains(&self, name: &str) -> bool {
        self.probes.contains_key(name)
    }

    /// Number of domain probes
    pub fn len(&self) -> usize {
        self.probes.len()
    }

    /// True if no domain probes are registered
    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }
}

fn insert(map: &mut BTreeMap<String, Entry>, name: String, entry: Entry) -> Result<()> {
    if map.contains_key(&name) {
        return Err(Error::DuplicateProbe(name));
    }
    map.insert(name, entry);
    Ok(())
}

impl fmt::Debug for ProbeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProbeRegistry")
            .field("probes", &self.probes.keys().collect::<Vec<_>>())
            .field("ip_probes", &self.ip_probes.keys().collect::<Vec<_>>())
            .field("default_timeout", &self.default_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FnProbe;
    use serde_json::json;

    fn noop() -> Arc<dyn Probe> {
        Arc::new(FnProbe::new(|_| async { Ok(json!({})) }))
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = ProbeRegistry::new(Duration::from_secs(30));
        registry.register("https_check", noop()).unwrap();
        assert!(matches!(
            registry.register("https_check", noop()),
            Err(Error::DuplicateProbe(_))
        ));
    }

    #[test]
    fn test_plan_skips_unregistered() {
        let mut registry = ProbeRegistry::new(Duration::from_secs(30));
        registry.register("https_check", noop()).unwrap();
        registry
            .register_with_timeout("ipvoid", noop(), Duration::from_secs(5))
            .unwrap();

        let plan = registry.plan(&IndustryProfile::default());
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].tier, Tier::Critical);
        assert_eq!(plan[0].probes[0].descriptor.name, "https_check");
        assert_eq!(plan[1].tier, Tier::Medium);
        assert_eq!(plan[1].probes[0].descriptor.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_unknown_probe() {
        let registry = ProbeRegistry::new(Duration::from_secs(30));
        assert!(matches!(
            registry.schedule("whois_data", Tier::Critical),
            Err(Error::UnknownProbe(_))
        ));
    }

    #[test]
    fn test_ip_follow_up_names() {
        let mut registry = ProbeRegistry::new(Duration::from_secs(30));
        registry.register_ip_probe("ipvoid", noop()).unwrap();
        let follow_up = registry.ip_follow_up();
        assert_eq!(follow_up[0].descriptor.name, "ipvoid_ip");
    }
}
