use crate::config::Config;
use crate::error::{ComplianceError, Result};
use crate::matcher::{classify_risk, MatchIndex, MatchPolicy};
use crate::normalize::{normalize_name, search_terms};
use crate::ofac::OfacSdnSource;
use crate::reference::{ReferenceCache, ReferenceSource};
use crate::types::{
    CacheStatus, ComplianceAssessment, DomainMatch, MatchRecord, MatchType, ReferenceDataset,
    ScreeningVerdict,
};
use chrono::Utc;
use evidence_core::types::{bare_domain, domain_label};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// ScreeningEngine screens company names against a cached reference list
#[derive(Debug)]
pub struct ScreeningEngine {
    cache: ReferenceCache,
    policy: MatchPolicy,
    legal_suffixes: Vec<String>,
    index: Mutex<Option<Arc<MatchIndex>>>,
}

impl ScreeningEngine {
    pub fn new(config: &Config, source: Arc<dyn ReferenceSource>) -> Self {
        Self {
            cache: ReferenceCache::new(source, config.cache_ttl()),
            policy: MatchPolicy::from(config),
            legal_suffixes: config.legal_suffixes.clone(),
            index: Mutex::new(None),
        }
    }

    /// Engine backed by the OFAC SDN download
    pub fn ofac(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config, Arc::new(OfacSdnSource::new(config)?)))
    }

    /// Seed the reference cache
    pub fn with_snapshot(mut self, dataset: ReferenceDataset) -> Self {
        self.cache = self.cache.with_snapshot(dataset);
        self
    }

    pub fn cache(&self) -> &ReferenceCache {
        &self.cache
    }

    pub fn policy(&self) -> &MatchPolicy {
        &self.policy
    }

    /// Screen a company and optional domain; never fails, ERROR is data
    pub async fn screen(&self, company_name: &str, domain: Option<&str>) -> ScreeningVerdict {
        let terms = search_terms(company_name, domain, &self.legal_suffixes);
        if terms.iter().all(|t| normalize_name(t).is_empty()) {
            let err = ComplianceError::InvalidInput("no usable company name or domain".into());
            warn!("Screening skipped: {}", err);
            return ScreeningVerdict::unavailable(
                company_name,
                domain,
                CacheStatus::Unavailable,
                err.to_string(),
            );
        }

        let lookup = self.cache.lookup().await;
        let dataset = match lookup.dataset {
            Some(dataset) => dataset,
            None => {
                let reason = lookup
                    .refresh_error
                    .map(|e| ComplianceError::NoReferenceData(e.to_string()))
                    .unwrap_or_else(|| ComplianceError::NoReferenceData("never loaded".into()));
                warn!(company = %company_name, "Screening unavailable: {}", reason);
                return ScreeningVerdict::unavailable(company_name, domain, lookup.status, reason.to_string());
            }
        };

        let (matches, domain_hits) = match self.run_matching(Arc::clone(&dataset), &terms, domain).await {
            Ok(found) => found,
            Err(reason) => {
                warn!(company = %company_name, "Screening failed: {}", reason);
                return ScreeningVerdict::unavailable(company_name, domain, lookup.status, reason);
            }
        };

        let verdict = self.build_verdict(&dataset, company_name, domain, terms, matches, domain_hits, lookup.status);
        info!(
            company = %company_name,
            risk_level = %verdict.risk_level,
            matches = verdict.total_matches,
            cache_status = ?verdict.cache_status,
            "Screening complete"
        );
        verdict
    }

    /// Reference data for callers that need it directly
    ///
    /// Fails with `NoReferenceData` when nothing has ever loaded and a
    /// refresh fails. Stale data is returned when a refresh fails.
    pub async fn reference_dataset(&self) -> Result<Arc<ReferenceDataset>> {
        let lookup = self.cache.lookup().await;
        match lookup.dataset {
            Some(dataset) => Ok(dataset),
            None => Err(ComplianceError::NoReferenceData(
                lookup
                    .refresh_error
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "never loaded".into()),
            )),
        }
    }

    /// Index for this snapshot, if one was already built
    fn cached_index(&self, dataset: &Arc<ReferenceDataset>) -> Option<Arc<MatchIndex>> {
        self.index
            .lock()
            .as_ref()
            .filter(|index| Arc::ptr_eq(index.dataset(), dataset))
            .cloned()
    }

    /// Match on the blocking pool so collection keeps running meanwhile
    async fn run_matching(
        &self,
        dataset: Arc<ReferenceDataset>,
        terms: &[String],
        domain: Option<&str>,
    ) -> std::result::Result<(Vec<MatchRecord>, Vec<DomainMatch>), String> {
        let cached = self.cached_index(&dataset);
        let suffixes = self.legal_suffixes.clone();
        let policy = self.policy;
        let terms = terms.to_vec();
        let label = domain.map(|d| domain_label(&bare_domain(d)).to_string());

        let task = tokio::task::spawn_blocking(move || {
            let index = cached.unwrap_or_else(|| Arc::new(MatchIndex::build(dataset, &suffixes)));
            let matches = index.find_matches(&terms, &policy);
            let domain_hits = label
                .map(|l| index.domain_matches(&l, &policy))
                .unwrap_or_default();
            (index, matches, domain_hits)
        });
        let (index, matches, domain_hits) = task
            .await
            .map_err(|e| format!("matching task failed: {}", e))?;

        *self.index.lock() = Some(index);
        Ok((matches, domain_hits))
    }

    #[allow(clippy::too_many_arguments)]
    fn build_verdict(
        &self,
        dataset: &ReferenceDataset,
        company_name: &str,
        domain: Option<&str>,
        terms: Vec<String>,
        matches: Vec<MatchRecord>,
        domain_hits: Vec<DomainMatch>,
        cache_status: CacheStatus,
    ) -> ScreeningVerdict {
        let risk_level = classify_risk(&matches, &domain_hits, &self.policy);
        let count = |t: MatchType| matches.iter().filter(|m| m.match_type == t).count();

        ScreeningVerdict {
            screening_id: Uuid::new_v4(),
            company_name: company_name.to_string(),
            domain: domain.map(str::to_string),
            search_terms: terms,
            risk_level,
            total_matches: matches.len(),
            exact_matches: count(MatchType::Exact),
            partial_matches: count(MatchType::Partial),
            fuzzy_matches: count(MatchType::Fuzzy),
            domain_matches: domain_hits,
            match_records: matches,
            recommendation: risk_level.recommendation().to_string(),
            compliance_assessment: ComplianceAssessment::for_risk(risk_level),
            cache_status,
            reference_fetched_at: Some(dataset.fetched_at),
            entities_screened: dataset.len(),
            error: None,
            screened_at: Utc::now(),
        }
    }
}
