//! Exact, partial and fuzzy name matching plus risk classification

use crate::config::Config;
use crate::normalize::{canonical_form, normalize_name};
use crate::types::{
    DomainMatch, MatchRecord, MatchSource, MatchType, ReferenceDataset, ReferenceEntity, RiskLevel,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Tunable matching thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchPolicy {
    pub min_partial_length: usize,
    pub fuzzy_overlap_threshold: f64,
    pub medium_risk_partial_threshold: usize,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for MatchPolicy {
    fn from(config: &Config) -> Self {
        Self {
            min_partial_length: config.min_partial_length,
            fuzzy_overlap_threshold: config.fuzzy_overlap_threshold,
            medium_risk_partial_threshold: config.medium_risk_partial_threshold,
        }
    }
}

impl MatchPolicy {
    /// Strongest match between two normalized names; exact, then partial, then fuzzy
    pub fn match_pair(&self, term: &str, candidate: &str) -> Option<MatchType> {
        if term.is_empty() || candidate.is_empty() {
            return None;
        }
        if term == candidate {
            return Some(MatchType::Exact);
        }
        if self.is_partial(term, candidate) {
            return Some(MatchType::Partial);
        }
        if self.is_fuzzy(term, candidate) {
            return Some(MatchType::Fuzzy);
        }
        None
    }

    /// One contains the other and the contained one is long enough
    pub fn is_partial(&self, a: &str, b: &str) -> bool {
        let (shorter, longer) = if a.chars().count() <= b.chars().count() {
            (a, b)
        } else {
            (b, a)
        };
        shorter.chars().count() >= self.min_partial_length && longer.contains(shorter)
    }

    /// Share of the term's words also present in the candidate
    pub fn is_fuzzy(&self, term: &str, candidate: &str) -> bool {
        let term_words: HashSet<&str> = term.split_whitespace().collect();
        if term_words.is_empty() {
            return false;
        }
        let candidate_words: HashSet<&str> = candidate.split_whitespace().collect();
        let shared = term_words.intersection(&candidate_words).count();
        shared as f64 / term_words.len() as f64 >= self.fuzzy_overlap_threshold
    }
}

/// One indexed entity name
#[derive(Debug, Clone)]
struct IndexedName {
    /// `None` for the primary name, else the alternate name position
    alt: Option<usize>,
    normalized: String,
    canonical: String,
}

/// Reference snapshot with every name normalized once
///
/// Built when a snapshot is first screened and reused until the cache
/// swaps in a new dataset.
#[derive(Debug)]
pub struct MatchIndex {
    dataset: Arc<ReferenceDataset>,
    suffixes: Vec<String>,
    names: Vec<Vec<IndexedName>>,
}

impl MatchIndex {
    /// Normalize every primary and alternate name of the dataset
    pub fn build(dataset: Arc<ReferenceDataset>, suffixes: &[String]) -> Self {
        let index = |alt: Option<usize>, name: &str| {
            let normalized = normalize_name(name);
            let canonical = canonical_form(&normalized, suffixes);
            IndexedName {
                alt,
                normalized,
                canonical,
            }
        };
        let names = dataset
            .entities
            .iter()
            .map(|entity| {
                std::iter::once(index(None, &entity.primary_name))
                    .chain(
                        entity
                            .alt_names
                            .iter()
                            .enumerate()
                            .map(|(i, name)| index(Some(i), name)),
                    )
                    .filter(|n| !n.normalized.is_empty())
                    .collect()
            })
            .collect();
        debug!(entities = dataset.len(), "Built match index");
        Self {
            dataset,
            suffixes: suffixes.to_vec(),
            names,
        }
    }

    /// Snapshot this index was built from
    pub fn dataset(&self) -> &Arc<ReferenceDataset> {
        &self.dataset
    }

    /// Match every search term against every primary and alternate name
    ///
    /// Names equal once legal suffixes are dropped match exactly; otherwise
    /// the policy's partial and fuzzy rules apply to the normalized forms.
    pub fn find_matches(&self, terms: &[String], policy: &MatchPolicy) -> Vec<MatchRecord> {
        let mut seen = HashSet::new();
        let prepared: Vec<(&String, String, String)> = terms
            .iter()
            .map(|t| (t, normalize_name(t)))
            .filter(|(_, n)| !n.is_empty() && seen.insert(n.clone()))
            .map(|(t, n)| {
                let canonical = canonical_form(&n, &self.suffixes);
                (t, n, canonical)
            })
            .collect();

        let mut matches = Vec::new();
        for (entity, names) in self.dataset.entities.iter().zip(&self.names) {
            for (term, normalized, canonical) in &prepared {
                for name in names {
                    let match_type = if *canonical == name.canonical {
                        Some(MatchType::Exact)
                    } else {
                        policy.match_pair(normalized, &name.normalized)
                    };
                    let Some(match_type) = match_type else {
                        continue;
                    };
                    let (raw, source) = match name.alt {
                        None => (&entity.primary_name, MatchSource::PrimaryName),
                        Some(i) => (&entity.alt_names[i], MatchSource::AlternateName),
                    };
                    debug!(
                        term = %term,
                        entity = %entity.uid,
                        name = %raw,
                        match_type = ?match_type,
                        "Reference match"
                    );
                    matches.push(record(term, entity, raw, match_type, source));
                }
            }
        }
        matches
    }

    /// Correlate a domain label with entity primary names
    pub fn domain_matches(&self, label: &str, policy: &MatchPolicy) -> Vec<DomainMatch> {
        let label = normalize_name(label);
        if label.is_empty() {
            return Vec::new();
        }
        self.dataset
            .entities
            .iter()
            .zip(&self.names)
            .filter(|(_, names)| {
                names
                    .iter()
                    .find(|n| n.alt.is_none())
                    .map_or(false, |primary| policy.is_partial(&label, &primary.normalized))
            })
            .map(|(entity, _)| DomainMatch {
                domain_label: label.clone(),
                matched_entity_uid: entity.uid.clone(),
                matched_name: entity.primary_name.clone(),
            })
            .collect()
    }
}

/// First satisfied rule wins: exact, then many partials or a domain hit, then any match
pub fn classify_risk(
    matches: &[MatchRecord],
    domain_matches: &[DomainMatch],
    policy: &MatchPolicy,
) -> RiskLevel {
    let count = |t: MatchType| matches.iter().filter(|m| m.match_type == t).count();
    let exact = count(MatchType::Exact);
    let partial = count(MatchType::Partial);
    let fuzzy = count(MatchType::Fuzzy);

    if exact > 0 {
        RiskLevel::HighRisk
    } else if partial > policy.medium_risk_partial_threshold || !domain_matches.is_empty() {
        RiskLevel::MediumRisk
    } else if partial > 0 || fuzzy > 0 {
        RiskLevel::LowRisk
    } else {
        RiskLevel::Clear
    }
}

fn record(
    term: &str,
    entity: &ReferenceEntity,
    name: &str,
    match_type: MatchType,
    source: MatchSource,
) -> MatchRecord {
    MatchRecord {
        search_term: term.to_string(),
        matched_entity_uid: entity.uid.clone(),
        matched_name: name.to_string(),
        match_type,
        source,
        programs: entity.programs.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(entities: Vec<ReferenceEntity>) -> MatchIndex {
        let suffixes = Config::default().legal_suffixes;
        MatchIndex::build(Arc::new(ReferenceDataset::new(entities, "test")), &suffixes)
    }

    #[test]
    fn test_match_pair_precedence() {
        let policy = MatchPolicy::default();
        assert_eq!(policy.match_pair("acme corp", "acme corp"), Some(MatchType::Exact));
        assert_eq!(policy.match_pair("acme", "acme holdings"), Some(MatchType::Partial));
        assert_eq!(policy.match_pair("acme widgets", "acme holdings"), Some(MatchType::Fuzzy));
        assert_eq!(policy.match_pair("globex", "acme holdings"), None);
        assert_eq!(policy.match_pair("", "acme"), None);
    }

    #[test]
    fn test_short_substring_is_not_partial() {
        let policy = MatchPolicy::default();
        assert!(!policy.is_partial("abc", "abc trading"));
        assert!(policy.is_partial("abcd", "abcd trading"));
        // single-word term fully inside a two-word name still counts as fuzzy
        assert_eq!(policy.match_pair("abc", "abc trading"), Some(MatchType::Fuzzy));
    }

    #[test]
    fn test_alternate_names_match() {
        let data = index(vec![ReferenceEntity::new("7", "BANCO NACIONAL DE CUBA")
            .with_alt_name("NATIONAL BANK OF CUBA")
            .with_program("CUBA")]);
        let matches = data.find_matches(&["National Bank of Cuba".into()], &MatchPolicy::default());
        let exact: Vec<_> = matches.iter().filter(|m| m.match_type == MatchType::Exact).collect();
        assert_eq!(exact.len(), 1);
        assert_eq!(exact[0].source, MatchSource::AlternateName);
        assert_eq!(exact[0].programs, vec!["CUBA"]);
    }

    #[test]
    fn test_duplicate_terms_counted_once() {
        let data = index(vec![ReferenceEntity::new("1", "ACME")]);
        let terms = vec!["Acme".to_string(), "ACME".to_string()];
        assert_eq!(data.find_matches(&terms, &MatchPolicy::default()).len(), 1);
    }

    #[test]
    fn test_legal_suffix_differences_match_exactly() {
        let policy = MatchPolicy::default();
        let exact = |term: &str, listed: &str| {
            index(vec![ReferenceEntity::new("1", listed)])
                .find_matches(&[term.to_string()], &policy)
                .iter()
                .any(|m| m.match_type == MatchType::Exact)
        };
        assert!(exact("Acme Corp", "ACME CORPORATION"));
        assert!(exact("Acme Inc", "ACME LLC"));
        assert!(exact("Acme Corporation", "ACME"));
        assert!(exact("Acme", "ACME, LTD."));
        assert!(!exact("Acme Widgets", "ACME HOLDINGS"));
    }

    #[test]
    fn test_alternate_name_suffix_match() {
        let data = index(vec![
            ReferenceEntity::new("9", "GLOBEX INTERNATIONAL").with_alt_name("GLOBEX TRADING LIMITED")
        ]);
        let matches = data.find_matches(&["Globex Trading Inc".into()], &MatchPolicy::default());
        assert!(matches
            .iter()
            .any(|m| m.match_type == MatchType::Exact && m.source == MatchSource::AlternateName));
        assert_eq!(classify_risk(&matches, &[], &MatchPolicy::default()), RiskLevel::HighRisk);
    }

    #[test]
    fn test_domain_correlation() {
        let data = index(vec![
            ReferenceEntity::new("1", "ROSNEFT TRADING S.A."),
            ReferenceEntity::new("2", "GAZ"),
        ]);
        let policy = MatchPolicy::default();
        let hits = data.domain_matches("Rosneft", &policy);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].matched_entity_uid, "1");
        assert!(data.domain_matches("gaz", &policy).is_empty());
    }

    #[test]
    fn test_classification_rules() {
        let policy = MatchPolicy::default();
        let entity = ReferenceEntity::new("1", "X");
        let m = |t| record("x", &entity, "X", t, MatchSource::PrimaryName);
        let domain = DomainMatch {
            domain_label: "x".into(),
            matched_entity_uid: "1".into(),
            matched_name: "X".into(),
        };

        assert_eq!(classify_risk(&[], &[], &policy), RiskLevel::Clear);
        assert_eq!(classify_risk(&[m(MatchType::Fuzzy)], &[], &policy), RiskLevel::LowRisk);
        assert_eq!(
            classify_risk(&[m(MatchType::Partial), m(MatchType::Partial)], &[], &policy),
            RiskLevel::LowRisk
        );
        assert_eq!(
            classify_risk(&vec![m(MatchType::Partial); 3], &[], &policy),
            RiskLevel::MediumRisk
        );
        assert_eq!(classify_risk(&[], &[domain], &policy), RiskLevel::MediumRisk);
        assert_eq!(classify_risk(&[m(MatchType::Exact)], &[], &policy), RiskLevel::HighRisk);
    }
}
