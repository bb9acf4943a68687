//! Name normalization and search-term generation

use evidence_core::types::{bare_domain, domain_label};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

lazy_static! {
    static ref PUNCTUATION: Regex = Regex::new(r"[^\w\s]").unwrap();
}

/// Lowercase, remove punctuation, collapse whitespace
pub fn normalize_name(name: &str) -> String {
    let lowered = name.to_lowercase();
    let cleaned = PUNCTUATION.replace_all(&lowered, "");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Drop legal-entity suffix words from a normalized name
pub fn strip_legal_suffixes(normalized: &str, suffixes: &[String]) -> String {
    normalized
        .split_whitespace()
        .filter(|word| !suffixes.iter().any(|s| s.eq_ignore_ascii_case(word)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Form compared for exact matches: normalized, legal suffixes dropped
///
/// A name made only of suffix words keeps its normalized form.
pub fn canonical_name(name: &str, suffixes: &[String]) -> String {
    canonical_form(&normalize_name(name), suffixes)
}

pub(crate) fn canonical_form(normalized: &str, suffixes: &[String]) -> String {
    let stripped = strip_legal_suffixes(normalized, suffixes);
    if stripped.is_empty() {
        normalized.to_string()
    } else {
        stripped
    }
}

/// Candidate terms for a company: the name, the name without legal
/// suffixes, and the domain label in capitalized and upper form
pub fn search_terms(company_name: &str, domain: Option<&str>, suffixes: &[String]) -> Vec<String> {
    let mut terms = Vec::new();

    let company = company_name.trim();
    if !company.is_empty() {
        terms.push(company.to_string());
        let normalized = normalize_name(company);
        let stripped = strip_legal_suffixes(&normalized, suffixes);
        if !stripped.is_empty() && stripped != normalized {
            terms.push(stripped);
        }
    }

    if let Some(domain) = domain {
        let bare = bare_domain(domain);
        let label = domain_label(&bare);
        if !label.is_empty() {
            terms.push(capitalize(label));
            terms.push(label.to_uppercase());
        }
    }

    let mut seen = HashSet::new();
    terms.retain(|t| seen.insert(t.clone()));
    terms
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
