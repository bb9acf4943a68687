//! Screening engine integration tests

use async_trait::async_trait;
use chrono::Utc;
use compliance_service::{
    CacheStatus, ComplianceError, Config, MatchType, ReferenceDataset, ReferenceEntity,
    ReferenceSource, RiskLevel, ScreeningEngine,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Source serving a fixed entity list until told to fail
struct FixedSource {
    entities: Vec<ReferenceEntity>,
    failing: AtomicBool,
    fetches: AtomicUsize,
}

impl FixedSource {
    fn new(entities: Vec<ReferenceEntity>) -> Arc<Self> {
        Arc::new(Self {
            entities,
            failing: AtomicBool::new(false),
            fetches: AtomicUsize::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        let source = Self::new(Vec::new());
        source.failing.store(true, Ordering::SeqCst);
        source
    }
}

#[async_trait]
impl ReferenceSource for FixedSource {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn fetch(&self) -> compliance_service::Result<ReferenceDataset> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(ComplianceError::ReferenceFetch("503 Service Unavailable".into()));
        }
        Ok(ReferenceDataset::new(self.entities.clone(), "fixed"))
    }
}

fn reference_list() -> Vec<ReferenceEntity> {
    vec![
        ReferenceEntity::new("100", "ACME CORP").with_program("SDGT"),
        ReferenceEntity::new("200", "Acme Holdings").with_program("IRAN"),
        ReferenceEntity::new("300", "BANCO NACIONAL DE CUBA").with_alt_name("NATIONAL BANK OF CUBA"),
    ]
}

#[tokio::test]
async fn test_exact_match_is_high_risk() {
    let engine = ScreeningEngine::new(&Config::default(), FixedSource::new(reference_list()));

    let verdict = engine.screen("Acme Corp", None).await;

    assert_eq!(verdict.risk_level, RiskLevel::HighRisk);
    assert!(verdict.exact_matches >= 1);
    assert!(verdict
        .match_records
        .iter()
        .any(|m| m.match_type == MatchType::Exact && m.matched_entity_uid == "100"));
    assert_eq!(
        verdict.recommendation,
        "Prohibit transaction - immediate escalation required"
    );
    assert!(verdict.compliance_assessment.immediate_escalation_required);
    assert!(!verdict.compliance_assessment.ofac_compliant);
    assert_eq!(verdict.cache_status, CacheStatus::Refreshed);
}

#[tokio::test]
async fn test_shared_token_is_fuzzy_low_risk() {
    let list = vec![ReferenceEntity::new("200", "Acme Holdings")];
    let engine = ScreeningEngine::new(&Config::default(), FixedSource::new(list));

    let verdict = engine.screen("Acme Widgets", None).await;

    assert_eq!(verdict.risk_level, RiskLevel::LowRisk);
    assert_eq!(verdict.total_matches, 1);
    assert_eq!(verdict.fuzzy_matches, 1);
    assert_eq!(verdict.match_records[0].match_type, MatchType::Fuzzy);
    assert!(!verdict.compliance_assessment.requires_enhanced_due_diligence);
}

#[tokio::test]
async fn test_no_reference_data_is_error() {
    let engine = ScreeningEngine::new(&Config::default(), FixedSource::failing());

    let verdict = engine.screen("Acme Corp", Some("acme.com")).await;

    assert_eq!(verdict.risk_level, RiskLevel::Error);
    assert_ne!(verdict.risk_level, RiskLevel::Clear);
    assert!(!verdict.compliance_assessment.ofac_compliant);
    assert!(verdict.compliance_assessment.requires_manual_review);
    assert_eq!(verdict.cache_status, CacheStatus::Unavailable);
    assert!(verdict.error.is_some());

    assert!(matches!(
        engine.reference_dataset().await,
        Err(ComplianceError::NoReferenceData(_))
    ));
}

#[tokio::test]
async fn test_stale_cache_is_degraded_not_error() {
    let source = FixedSource::failing();
    let stale = ReferenceDataset::fetched_at(
        reference_list(),
        "seed",
        Utc::now() - chrono::Duration::days(3),
    );
    let engine = ScreeningEngine::new(&Config::default(), source.clone()).with_snapshot(stale);

    let verdict = engine.screen("Globex", None).await;

    assert_eq!(verdict.risk_level, RiskLevel::Clear);
    assert!(verdict.is_degraded());
    assert_eq!(verdict.entities_screened, 3);
    assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    assert!(engine.reference_dataset().await.is_ok());
}

#[tokio::test]
async fn test_fresh_cache_reused_across_calls() {
    let source = FixedSource::new(reference_list());
    let engine = ScreeningEngine::new(&Config::default(), source.clone());

    engine.screen("Globex", None).await;
    let second = engine.screen("Initech", None).await;

    assert_eq!(second.cache_status, CacheStatus::Fresh);
    assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_domain_correlation_is_medium_risk() {
    let list = vec![ReferenceEntity::new("400", "ROSNEFT TRADING S.A.")];
    let engine = ScreeningEngine::new(&Config::default(), FixedSource::new(list));

    let verdict = engine.screen("", Some("https://www.rosneft.com")).await;

    assert_eq!(verdict.domain_matches.len(), 1);
    assert_eq!(verdict.risk_level, RiskLevel::MediumRisk);
    assert_eq!(verdict.search_terms, vec!["Rosneft", "ROSNEFT"]);
    assert!(verdict.compliance_assessment.requires_enhanced_due_diligence);
}

#[tokio::test]
async fn test_alternate_name_exact_match() {
    let engine = ScreeningEngine::new(&Config::default(), FixedSource::new(reference_list()));

    let verdict = engine.screen("National Bank of Cuba", None).await;

    assert_eq!(verdict.risk_level, RiskLevel::HighRisk);
}

#[tokio::test]
async fn test_empty_input_is_not_clear() {
    let source = FixedSource::new(reference_list());
    let engine = ScreeningEngine::new(&Config::default(), source.clone());

    let verdict = engine.screen("   ", None).await;

    assert_eq!(verdict.risk_level, RiskLevel::Error);
    assert_eq!(source.fetches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_tuned_partial_length() {
    let list = vec![ReferenceEntity::new("500", "ZETA MARITIME")];
    let strict = Config {
        min_partial_length: 5,
        ..Config::default()
    };

    let default_engine = ScreeningEngine::new(&Config::default(), FixedSource::new(list.clone()));
    let strict_engine = ScreeningEngine::new(&strict, FixedSource::new(list));

    assert_eq!(
        default_engine.screen("", Some("zeta.io")).await.risk_level,
        RiskLevel::MediumRisk
    );
    assert_eq!(
        strict_engine.screen("", Some("zeta.io")).await.risk_level,
        RiskLevel::LowRisk
    );
}

#[tokio::test]
async fn test_legal_suffix_variants_are_high_risk() {
    let list = vec![
        ReferenceEntity::new("600", "ACME CORPORATION"),
        ReferenceEntity::new("700", "INITECH LLC"),
    ];
    let engine = ScreeningEngine::new(&Config::default(), FixedSource::new(list));

    let acme = engine.screen("Acme Corp", None).await;
    assert_eq!(acme.risk_level, RiskLevel::HighRisk);
    assert!(acme
        .match_records
        .iter()
        .any(|m| m.match_type == MatchType::Exact && m.matched_entity_uid == "600"));

    let initech = engine.screen("Initech Inc", Some("initech.com")).await;
    assert_eq!(initech.risk_level, RiskLevel::HighRisk);
    assert!(initech.exact_matches >= 1);
}
