//! Assessment orchestration

use crate::aggregator::Aggregator;
use crate::config::Config;
use crate::types::AssessmentReport;
use crate::{Error, Result};
use chrono::Utc;
use collector::{
    extract_ip_address, CollectorMetrics, ProbeRegistry, Scheduler, TierPlan, IP_FOLLOW_UP_GROUP,
};
use compliance_service::ScreeningEngine;
use evidence_core::{IndustryProfile, Target};
use evidence_validator::{validate_domain, validate_run};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Profile probe name served by the screening engine rather than a probe
pub const SCREENING_PROBE: &str = "ofac_sanctions";

/// Runs one assessment end to end
#[derive(Debug)]
pub struct AssessmentEngine {
    registry: ProbeRegistry,
    scheduler: Scheduler,
    screening: ScreeningEngine,
    aggregator: Aggregator,
}

impl AssessmentEngine {
    /// Create engine from its parts
    pub fn new(config: &Config, registry: ProbeRegistry, screening: ScreeningEngine) -> Self {
        Self {
            registry,
            scheduler: Scheduler::new(config.collector.clone()),
            screening,
            aggregator: Aggregator::new(config),
        }
    }

    /// Create engine screening against the OFAC SDN download
    pub fn with_ofac(config: &Config, registry: ProbeRegistry) -> Result<Self> {
        config.validate()?;
        let screening = ScreeningEngine::ofac(&config.screening)?;
        Ok(Self::new(config, registry, screening))
    }

    /// Record probe metrics
    pub fn with_metrics(mut self, metrics: Arc<CollectorMetrics>) -> Self {
        self.scheduler = self.scheduler.with_metrics(metrics);
        self
    }

    /// Scheduler, for failure history
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Screening engine
    pub fn screening(&self) -> &ScreeningEngine {
        &self.screening
    }

    /// Tier plan for a profile, without the screening entry
    pub fn plan(&self, profile: &IndustryProfile) -> Vec<TierPlan> {
        let mut probes_only = profile.clone();
        for names in probes_only.tiers.values_mut() {
            names.retain(|n| n != SCREENING_PROBE);
        }
        self.registry.plan(&probes_only)
    }

    /// Assess a target under an industry profile
    ///
    /// Only an invalid domain is an error. Probe failures, validation
    /// problems and screening errors end up in the report.
    #[instrument(skip(self, target, profile), fields(domain = %target.domain, industry = %profile.name))]
    pub async fn assess(&self, target: &Target, profile: &IndustryProfile) -> Result<AssessmentReport> {
        let domain = validate_domain(&target.domain).map_err(|e| Error::InvalidTarget(e.to_string()))?;
        let target = Target {
            domain,
            ..target.clone()
        };

        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(run_id = %run_id, company = %target.company_name, "Assessment started");

        let plan = self.plan(profile);
        let (mut records, screening) = tokio::join!(
            self.scheduler.run_all(&plan, &target),
            self.screening.screen(&target.company_name, Some(&target.domain)),
        );

        let ip_probes = self.registry.ip_follow_up();
        if !ip_probes.is_empty() {
            match extract_ip_address(&records) {
                Some(ip) => {
                    info!(ip = %ip, probes = ip_probes.len(), "Running IP follow-up probes");
                    let follow_up = self
                        .scheduler
                        .execute_tier(&ip_probes, &target.with_ip(ip), IP_FOLLOW_UP_GROUP)
                        .await;
                    records.extend(follow_up);
                }
                None => debug!("No IP address reported, skipping follow-up"),
            }
        }

        let validation = validate_run(&records);
        let summary = self.aggregator.aggregate(&records, &validation, &screening, profile);
        let completed_at = Utc::now();

        info!(
            run_id = %run_id,
            records = records.len(),
            quality = summary.quality_class.as_str(),
            sanctions_risk = %summary.screening_verdict.risk_level,
            "Assessment completed"
        );

        Ok(AssessmentReport {
            run_id,
            target,
            records,
            validation,
            summary,
            started_at,
            completed_at,
        })
    }

    /// Assess a domain under a named industry preset
    pub async fn assess_domain(
        &self,
        domain: &str,
        company_name: Option<&str>,
        industry: &str,
    ) -> Result<AssessmentReport> {
        let mut target = Target::from_domain(domain);
        if let Some(name) = company_name.filter(|n| !n.trim().is_empty()) {
            target = target.with_company_name(name);
        }
        self.assess(&target, &IndustryProfile::preset(industry)).await
    }
}
