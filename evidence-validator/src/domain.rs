//! Domain input validation

use crate::{Error, Result};
use evidence_core::types::bare_domain;
use lazy_static::lazy_static;
use regex::Regex;

const MIN_DOMAIN_LENGTH: usize = 3;
const MAX_DOMAIN_LENGTH: usize = 253;

lazy_static! {
    static ref DOMAIN_PATTERN: Regex = Regex::new(
        r"^[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?(\.[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?)+$"
    )
    .unwrap();
}

/// Validate a domain or URL and return the bare domain
///
/// Scheme, `www.` and any path are stripped first. The result must be
/// 3 to 253 characters with at least two RFC 1035 labels.
pub fn validate_domain(input: &str) -> Result<String> {
    if input.trim().is_empty() {
        return Err(Error::InvalidDomain("Domain is empty".to_string()));
    }

    let domain = bare_domain(input);

    if domain.len() < MIN_DOMAIN_LENGTH {
        return Err(Error::InvalidDomain(format!(
            "Domain too short (minimum {} characters)",
            MIN_DOMAIN_LENGTH
        )));
    }

    if domain.len() > MAX_DOMAIN_LENGTH {
        return Err(Error::InvalidDomain(format!(
            "Domain too long (maximum {} characters)",
            MAX_DOMAIN_LENGTH
        )));
    }

    if !DOMAIN_PATTERN.is_match(&domain) {
        return Err(Error::InvalidDomain(format!("Invalid domain format: {}", domain)));
    }

    Ok(domain)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_domains() {
        assert_eq!(validate_domain("shopify.com").unwrap(), "shopify.com");
        assert_eq!(validate_domain("https://www.Google.com").unwrap(), "google.com");
        assert_eq!(validate_domain("acme.co.uk/about").unwrap(), "acme.co.uk");
    }

    #[test]
    fn test_invalid_domains() {
        assert!(validate_domain("").is_err());
        assert!(validate_domain("invalid-domain").is_err());
        assert!(validate_domain("a.").is_err());
        assert!(validate_domain("-acme.com").is_err());
        assert!(validate_domain("acme..com").is_err());
        assert!(validate_domain(&format!("{}.com", "a".repeat(260))).is_err());
    }
}
