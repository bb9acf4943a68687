//! Metrics collection for observability
//!
//! # Metrics
//!
//! - `kyb_probe_runs_total{probe,status}` - Probe invocations by outcome
//! - `kyb_probe_duration_seconds{probe}` - Probe wall-clock time
//! - `kyb_tier_duration_seconds{tier}` - Tier wall-clock time

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;
use std::time::Duration;

/// Collector metrics, held in their own registry
#[derive(Clone)]
pub struct CollectorMetrics {
    /// Probe invocations by outcome
    pub probe_runs: IntCounterVec,

    /// Probe duration histogram
    pub probe_duration: HistogramVec,

    /// Tier duration histogram
    pub tier_duration: HistogramVec,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl CollectorMetrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let probe_runs = IntCounterVec::new(
            Opts::new("kyb_probe_runs_total", "Probe invocations by outcome"),
            &["probe", "status"],
        )?;
        registry.register(Box::new(probe_runs.clone()))?;

        let probe_duration = HistogramVec::new(
            HistogramOpts::new("kyb_probe_duration_seconds", "Probe wall-clock time")
                .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
            &["probe"],
        )?;
        registry.register(Box::new(probe_duration.clone()))?;

        let tier_duration = HistogramVec::new(
            HistogramOpts::new("kyb_tier_duration_seconds", "Tier wall-clock time")
                .buckets(vec![0.5, 1.0, 5.0, 10.0, 30.0, 60.0, 120.0]),
            &["tier"],
        )?;
        registry.register(Box::new(tier_duration.clone()))?;

        Ok(Self {
            probe_runs,
            probe_duration,
            tier_duration,
            registry,
        })
    }

    /// Record one probe invocation (`status` is `success` or an error kind)
    pub fn observe_probe(&self, probe: &str, status: &str, elapsed: Duration) {
        self.probe_runs.with_label_values(&[probe, status]).inc();
        self.probe_duration
            .with_label_values(&[probe])
            .observe(elapsed.as_secs_f64());
    }

    /// Record one tier
    pub fn observe_tier(&self, tier: &str, elapsed: Duration) {
        self.tier_duration
            .with_label_values(&[tier])
            .observe(elapsed.as_secs_f64());
    }

    /// Export in Prometheus text format
    pub fn export(&self) -> crate::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| crate::Error::Config(format!("Metrics output is not UTF-8: {}", e)))
    }
}

impl std::fmt::Debug for CollectorMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectorMetrics").finish_non_exhaustive()
    }
}
