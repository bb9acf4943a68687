//! Tiered probe scheduler
//!
//! Tiers run one after another. Inside a tier, probes share a bounded
//! worker budget and finish in any order; the merged map does not depend
//! on completion order.

use crate::{CollectorMetrics, Config, FailureTracker, ProbeResult, ScheduledProbe, TierPlan};
use evidence_core::{EvidenceMap, EvidenceRecord, Payload, ProbeError, Target};
use futures::stream::{self, StreamExt};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinError;
use tracing::{debug, info, warn};

/// Group name used for IP follow-up probes
pub const IP_FOLLOW_UP_GROUP: &str = "ip_follow_up";

/// Payload fields that may carry a resolved IP address
pub const IP_FIELDS: [&str; 4] = ["ip_address", "IP", "server_ip", "resolved_ip"];

/// Collector scheduler
#[derive(Debug)]
pub struct Scheduler {
    config: Config,
    failures: Arc<FailureTracker>,
    metrics: Option<Arc<CollectorMetrics>>,
}

impl Scheduler {
    /// Create new scheduler
    pub fn new(config: Config) -> Self {
        let failures = Arc::new(FailureTracker::new(config.retry_failure_limit));
        Self {
            config,
            failures,
            metrics: None,
        }
    }

    /// Attach metrics
    pub fn with_metrics(mut self, metrics: Arc<CollectorMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Failure history across runs
    pub fn failures(&self) -> &FailureTracker {
        &self.failures
    }

    /// Run one tier of probes concurrently
    ///
    /// Returns exactly one record per probe. Never fails.
    pub async fn execute_tier(
        &self,
        probes: &[ScheduledProbe],
        target: &Target,
        tier_name: &str,
    ) -> EvidenceMap {
        let started = Instant::now();
        let target = Arc::new(target.clone());
        info!(tier = %tier_name, probes = probes.len(), domain = %target.domain, "Executing tier");

        let records: Vec<EvidenceRecord> = stream::iter(probes)
            .map(|scheduled| self.invoke(scheduled, Arc::clone(&target)))
            .buffer_unordered(self.config.max_workers.max(1))
            .collect()
            .await;

        let mut results = EvidenceMap::new();
        for record in records {
            results.insert(record.probe_name().to_string(), record);
        }

        let elapsed = started.elapsed();
        if let Some(metrics) = &self.metrics {
            metrics.observe_tier(tier_name, elapsed);
        }
        let failed = results.values().filter(|r| !r.is_success()).count();
        info!(
            tier = %tier_name,
            succeeded = results.len() - failed,
            failed,
            elapsed_ms = elapsed.as_millis() as u64,
            "Tier completed"
        );

        results
    }

    /// Run every tier in order, pausing between tiers
    pub async fn run_all(&self, plan: &[TierPlan], target: &Target) -> EvidenceMap {
        let mut merged = EvidenceMap::new();
        let delay = self.config.inter_tier_delay();

        for (index, tier_plan) in plan.iter().enumerate() {
            let records = self
                .execute_tier(&tier_plan.probes, target, tier_plan.tier.as_str())
                .await;
            merged.extend(records);

            if index + 1 < plan.len() && !delay.is_zero() {
                debug!(delay_ms = delay.as_millis() as u64, "Inter-tier delay");
                tokio::time::sleep(delay).await;
            }
        }

        merged
    }

    async fn invoke(&self, scheduled: &ScheduledProbe, target: Arc<Target>) -> EvidenceRecord {
        let descriptor = &scheduled.descriptor;
        let name = descriptor.name.as_str();
        let started = Instant::now();

        let probe = Arc::clone(&scheduled.probe);
        let mut handle = tokio::spawn(async move { probe.run(&target).await });

        let outcome = match tokio::time::timeout(descriptor.timeout, &mut handle).await {
            Ok(Ok(result)) => classify(result),
            Ok(Err(e)) => Err(ProbeError::exception(join_error_message(e))),
            Err(_) => {
                handle.abort();
                Err(ProbeError::timeout(descriptor.timeout))
            }
        };
        let elapsed = started.elapsed();

        let record = match outcome {
            Ok(fields) => {
                self.failures.record_success(name);
                debug!(probe = %name, elapsed_ms = elapsed.as_millis() as u64, "Probe succeeded");
                EvidenceRecord::success(
                    name,
                    descriptor.tier,
                    Payload::for_probe(name, fields),
                    elapsed,
                )
            }
            Err(error) => {
                let retry = self.failures.record_failure(name, error.kind);
                warn!(
                    probe = %name,
                    error_type = %error.kind,
                    retry_recommended = retry,
                    "Probe failed: {}",
                    error.message
                );
                EvidenceRecord::failure(name, descriptor.tier, error, elapsed, retry)
            }
        };

        if let Some(metrics) = &self.metrics {
            let status = record
                .error()
                .map(|e| e.kind.as_str())
                .unwrap_or("success");
            metrics.observe_probe(name, status, elapsed);
        }

        record
    }
}

/// Map raw probe output onto a payload or a classified failure
fn classify(result: ProbeResult) -> Result<Map<String, Value>, ProbeError> {
    match result? {
        Value::Object(fields) => match fields.get("error") {
            None | Some(Value::Null) => Ok(fields),
            Some(Value::String(msg)) => Err(ProbeError::exception(msg.clone())),
            Some(other) => Err(ProbeError::exception(other.to_string())),
        },
        Value::Null => Err(ProbeError::invalid_result("probe returned no data")),
        other => Err(ProbeError::invalid_result(format!(
            "expected an object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Describe a failed task, including the panic message when there is one
pub(crate) fn join_error_message(error: JoinError) -> String {
    if error.is_panic() {
        let panic = error.into_panic();
        let detail = panic
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| panic.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        format!("probe panicked: {}", detail)
    } else {
        format!("probe task cancelled: {}", error)
    }
}

/// First IP address reported by a successful record, scanning in key order
pub fn extract_ip_address(records: &EvidenceMap) -> Option<String> {
    records.values().filter_map(EvidenceRecord::payload).find_map(|payload| {
        IP_FIELDS
            .iter()
            .filter_map(|field| payload.str_field(field))
            .map(str::trim)
            .find(|ip| !ip.is_empty())
            .map(str::to_string)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use evidence_core::{ProbeDescriptor, ProbeErrorKind, Tier};
    use serde_json::json;
    use std::time::Duration;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_classify() {
        assert!(classify(Ok(json!({"has_https": true}))).is_ok());
        assert_eq!(
            classify(Ok(Value::Null)).unwrap_err().kind,
            ProbeErrorKind::InvalidResult
        );
        assert_eq!(
            classify(Ok(json!([1, 2]))).unwrap_err().kind,
            ProbeErrorKind::InvalidResult
        );
        let self_reported = classify(Ok(json!({"error": "rate limited"}))).unwrap_err();
        assert_eq!(self_reported.kind, ProbeErrorKind::Exception);
        assert_eq!(self_reported.message, "rate limited");
        assert!(classify(Ok(json!({"error": null, "x": 1}))).is_ok());
        assert_eq!(
            classify(Err(ProbeError::timeout(Duration::from_secs(1))))
                .unwrap_err()
                .kind,
            ProbeErrorKind::Timeout
        );
    }

    #[test]
    fn test_extract_ip_address() {
        let mut records = EvidenceMap::new();
        records.insert(
            "https_check".into(),
            EvidenceRecord::success(
                "https_check",
                Tier::Critical,
                Payload::for_probe("https_check", object(json!({"has_https": true}))),
                Duration::ZERO,
            ),
        );
        assert_eq!(extract_ip_address(&records), None);

        records.insert(
            "whois_data".into(),
            EvidenceRecord::success(
                "whois_data",
                Tier::Critical,
                Payload::for_probe("whois_data", object(json!({"server_ip": "93.184.216.34"}))),
                Duration::ZERO,
            ),
        );
        assert_eq!(extract_ip_address(&records).as_deref(), Some("93.184.216.34"));
    }

    #[tokio::test]
    async fn test_empty_tier() {
        let scheduler = Scheduler::new(Config::default());
        let records = scheduler
            .execute_tier(&[], &Target::from_domain("acme.com"), "critical")
            .await;
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_metrics_recorded() {
        let metrics = Arc::new(CollectorMetrics::new().unwrap());
        let scheduler = Scheduler::new(Config::default()).with_metrics(Arc::clone(&metrics));
        let probes = vec![ScheduledProbe {
            descriptor: ProbeDescriptor::new("https_check", Tier::Critical, Duration::from_secs(5)),
            probe: Arc::new(crate::FnProbe::new(|_| async { Ok(Value::Null) })),
        }];
        scheduler
            .execute_tier(&probes, &Target::from_domain("acme.com"), "critical")
            .await;
        assert_eq!(
            metrics
                .probe_runs
                .with_label_values(&["https_check", "invalid_result"])
                .get(),
            1
        );
    }
}
