//! Cross-run probe failure history

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use evidence_core::ProbeErrorKind;
use serde::{Deserialize, Serialize};

/// Outcome counts for one probe
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeStats {
    /// Successful invocations
    pub successes: u64,

    /// Timed-out invocations
    pub timeouts: u64,

    /// Invocations that raised, panicked or self-reported an error
    pub exceptions: u64,

    /// Invocations that returned unusable output
    pub invalid_results: u64,

    /// Most recent failure
    pub last_failure_at: Option<DateTime<Utc>>,
}

impl ProbeStats {
    /// Failures of any kind
    pub fn total_failures(&self) -> u64 {
        self.timeouts + self.exceptions + self.invalid_results
    }
}

/// Failure history shared by every run of one scheduler
///
/// The retry flag it produces is advisory; nothing in the collector
/// re-runs a probe.
#[derive(Debug)]
pub struct FailureTracker {
    stats: DashMap<String, ProbeStats>,
    failure_limit: u32,
}

impl FailureTracker {
    /// Create tracker; probes failing more than `failure_limit` times lose the retry flag
    pub fn new(failure_limit: u32) -> Self {
        Self {
            stats: DashMap::new(),
            failure_limit,
        }
    }

    /// Record a success
    pub fn record_success(&self, probe: &str) {
        self.stats.entry(probe.to_string()).or_default().successes += 1;
    }

    /// Record a failure and return whether a re-run is recommended
    pub fn record_failure(&self, probe: &str, kind: ProbeErrorKind) -> bool {
        let mut entry = self.stats.entry(probe.to_string()).or_default();
        match kind {
            ProbeErrorKind::Timeout => entry.timeouts += 1,
            ProbeErrorKind::Exception => entry.exceptions += 1,
            ProbeErrorKind::InvalidResult => entry.invalid_results += 1,
        }
        entry.last_failure_at = Some(Utc::now());
        kind.is_transient() && entry.total_failures() <= u64::from(self.failure_limit)
    }

    /// Stats for one probe
    pub fn get(&self, probe: &str) -> Option<ProbeStats> {
        self.stats.get(probe).map(|s| s.value().clone())
    }

    /// Snapshot of all stats, sorted by probe name
    pub fn stats(&self) -> Vec<(String, ProbeStats)> {
        let mut all: Vec<_> = self
            .stats
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }

    /// Forget all history
    pub fn reset(&self) {
        self.stats.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_failures_until_limit() {
        let tracker = FailureTracker::new(2);
        assert!(tracker.record_failure("whois_data", ProbeErrorKind::Timeout));
        assert!(tracker.record_failure("whois_data", ProbeErrorKind::Exception));
        assert!(!tracker.record_failure("whois_data", ProbeErrorKind::Timeout));

        let stats = tracker.get("whois_data").unwrap();
        assert_eq!(stats.total_failures(), 3);
        assert!(stats.last_failure_at.is_some());
    }

    #[test]
    fn test_invalid_result_never_retried() {
        let tracker = FailureTracker::new(5);
        assert!(!tracker.record_failure("ipvoid", ProbeErrorKind::InvalidResult));
    }

    #[test]
    fn test_reset() {
        let tracker = FailureTracker::new(5);
        tracker.record_success("https_check");
        tracker.record_failure("ipvoid", ProbeErrorKind::Timeout);
        assert_eq!(tracker.stats().len(), 2);
        assert_eq!(tracker.stats()[0].0, "https_check");

        tracker.reset();
        assert!(tracker.stats().is_empty());
    }
}
