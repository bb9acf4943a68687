//! Property-based tests for name matching
//!
//! - Names equal after normalization and legal-suffix removal always match
//!   exactly, in both directions
//! - Adding a match never lowers the risk level
//! - Screening without reference data never reports CLEAR

use compliance_service::matcher::{classify_risk, MatchIndex, MatchPolicy};
use compliance_service::normalize::strip_legal_suffixes;
use compliance_service::{
    canonical_name, normalize_name, Config, DomainMatch, MatchRecord, MatchSource, MatchType, ReferenceDataset,
    ReferenceEntity, RiskLevel,
};
use proptest::prelude::*;
use std::sync::Arc;

const SUFFIXES: [&str; 7] = ["Inc", "LLC", "Corp", "Corporation", "Ltd", "Limited", "Co"];

fn name_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec("[A-Za-z]{1,8}", 1..4).prop_map(|words| words.join(" "))
}

fn with_suffix(name: &str, suffix: Option<usize>) -> String {
    match suffix {
        Some(i) => format!("{} {}", name, SUFFIXES[i % SUFFIXES.len()]),
        None => name.to_string(),
    }
}

/// Same words with different case, spacing, punctuation and legal suffix
fn decorate(name: &str, upper: bool, punct: bool, suffix: Option<usize>) -> String {
    let words: Vec<String> = with_suffix(name, suffix)
        .split_whitespace()
        .map(|w| if upper { w.to_uppercase() } else { w.to_lowercase() })
        .map(|w| if punct { format!("{}.", w) } else { w })
        .collect();
    format!("  {}  ", words.join("   "))
}

fn match_strategy() -> impl Strategy<Value = MatchType> {
    prop_oneof![
        Just(MatchType::Exact),
        Just(MatchType::Partial),
        Just(MatchType::Fuzzy),
    ]
}

fn record(match_type: MatchType) -> MatchRecord {
    MatchRecord {
        search_term: "term".into(),
        matched_entity_uid: "1".into(),
        matched_name: "NAME".into(),
        match_type,
        source: MatchSource::PrimaryName,
        programs: Vec::new(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Property: names equal up to case, punctuation and legal suffix match
    /// exactly either way round
    #[test]
    fn prop_exact_match_symmetric(
        name in name_strategy(),
        upper in any::<bool>(),
        punct in any::<bool>(),
        suffix_a in prop::option::of(0..SUFFIXES.len()),
        suffix_b in prop::option::of(0..SUFFIXES.len()),
    ) {
        let suffixes = Config::default().legal_suffixes;
        prop_assume!(!strip_legal_suffixes(&normalize_name(&name), &suffixes).is_empty());

        let a = with_suffix(&name, suffix_a);
        let b = decorate(&name, upper, punct, suffix_b);
        prop_assert_eq!(canonical_name(&a, &suffixes), canonical_name(&b, &suffixes));

        let policy = MatchPolicy::default();
        for (term, entity) in [(&a, &b), (&b, &a)] {
            let dataset = ReferenceDataset::new(vec![ReferenceEntity::new("1", entity.clone())], "prop");
            let index = MatchIndex::build(Arc::new(dataset), &suffixes);
            let matches = index.find_matches(&[term.clone()], &policy);
            prop_assert!(matches.iter().any(|m| m.match_type == MatchType::Exact));
            prop_assert_eq!(classify_risk(&matches, &[], &policy), RiskLevel::HighRisk);
        }
    }

    /// Property: adding any match never moves the risk level down
    #[test]
    fn prop_risk_monotonic(
        existing in prop::collection::vec(match_strategy(), 0..6),
        added in match_strategy(),
        with_domain in any::<bool>(),
    ) {
        let policy = MatchPolicy::default();
        let domain: Vec<DomainMatch> = if with_domain {
            vec![DomainMatch {
                domain_label: "x".into(),
                matched_entity_uid: "1".into(),
                matched_name: "X".into(),
            }]
        } else {
            Vec::new()
        };

        let mut matches: Vec<MatchRecord> = existing.into_iter().map(record).collect();
        let before = classify_risk(&matches, &domain, &policy);
        matches.push(record(added));
        let after = classify_risk(&matches, &domain, &policy);

        prop_assert!(after.severity() >= before.severity());
        prop_assert!(after != RiskLevel::Clear);
        if added == MatchType::Exact {
            prop_assert_eq!(after, RiskLevel::HighRisk);
        }
    }

    /// Property: match type order tracks strength
    #[test]
    fn prop_match_pair_is_strongest(name in name_strategy(), extra in "[a-z]{4,8}") {
        let policy = MatchPolicy::default();
        let term = normalize_name(&name);
        let longer = format!("{} {}", term, extra);
        prop_assert_eq!(policy.match_pair(&term, &term), Some(MatchType::Exact));
        if let Some(t) = policy.match_pair(&term, &longer) {
            prop_assert!(t < MatchType::Exact);
        }
    }
}
