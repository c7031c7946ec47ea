//! Utility functions for domain input handling.
//!
//! Lookups expect an already-validated domain. These helpers are what
//! front-ends use to get there: trim and lowercase the input, then check its
//! hostname shape.

use crate::error::WhoisCheckError;
use regex::Regex;

lazy_static::lazy_static! {
    /// One label: alphanumeric at both ends, hyphens inside, at most 63 chars.
    static ref LABEL: Regex =
        Regex::new(r"^[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?$").expect("valid label pattern");

    /// Top-level label: letters only, at least two.
    static ref TLD: Regex = Regex::new(r"^[a-z]{2,63}$").expect("valid TLD pattern");
}

/// Maximum length of a full domain name.
pub const MAX_DOMAIN_LENGTH: usize = 253;

/// Trim and lowercase raw user input.
pub fn normalize_domain_input(input: &str) -> String {
    input.trim().trim_end_matches('.').to_lowercase()
}

/// Validate a domain name format.
///
/// # Arguments
///
/// * `domain` - The domain name to validate (already normalized)
///
/// # Returns
///
/// `Ok(())` if valid, `Err(WhoisCheckError::InvalidDomain)` otherwise.
pub fn validate_domain(domain: &str) -> Result<(), WhoisCheckError> {
    if domain.is_empty() {
        return Err(WhoisCheckError::invalid_domain(
            domain,
            "Domain name cannot be empty",
        ));
    }

    if domain.len() > MAX_DOMAIN_LENGTH {
        return Err(WhoisCheckError::invalid_domain(
            domain,
            format!("Domain name is longer than {} characters", MAX_DOMAIN_LENGTH),
        ));
    }

    if domain.contains("..") {
        return Err(WhoisCheckError::invalid_domain(
            domain,
            "Domain name contains an empty label",
        ));
    }

    if domain.starts_with('-') || domain.ends_with('-') {
        return Err(WhoisCheckError::invalid_domain(
            domain,
            "Domain name cannot start or end with a hyphen",
        ));
    }

    let labels: Vec<&str> = domain.split('.').collect();
    let (tld, names) = match labels.split_last() {
        Some((tld, names)) if !names.is_empty() => (*tld, names),
        _ => {
            return Err(WhoisCheckError::invalid_domain(
                domain,
                "Domain name needs a TLD (e.g., google.com)",
            ))
        }
    };
    if !TLD.is_match(tld) {
        return Err(WhoisCheckError::invalid_domain(
            domain,
            format!("'{}' is not a valid TLD", tld),
        ));
    }

    if let Some(bad) = names.iter().find(|label| !LABEL.is_match(label)) {
        return Err(WhoisCheckError::invalid_domain(
            domain,
            format!("'{}' is not a valid label", bad),
        ));
    }

    Ok(())
}

/// Normalize and validate in one step.
pub fn prepare_domain(input: &str) -> Result<String, WhoisCheckError> {
    let domain = normalize_domain_input(input);
    validate_domain(&domain)?;
    Ok(domain)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_domain() {
        assert!(validate_domain("example.com").is_ok());
        assert!(validate_domain("sub.example.co.uk").is_ok());
        assert!(validate_domain("a.io").is_ok());
        assert!(validate_domain("my-site.dev").is_ok());

        assert!(validate_domain("").is_err());
        assert!(validate_domain("example").is_err());
        assert!(validate_domain("example..com").is_err());
        assert!(validate_domain("-example.com").is_err());
        assert!(validate_domain("example.com-").is_err());
        assert!(validate_domain("exa_mple.com").is_err());
        assert!(validate_domain("example.c").is_err());
        assert!(validate_domain("example.c0m").is_err());
        assert!(validate_domain("bad-.com").is_err());
    }

    #[test]
    fn test_validate_domain_length() {
        let label = "a".repeat(63);
        let long = format!("{0}.{0}.{0}.{0}.com", label);
        assert!(long.len() > MAX_DOMAIN_LENGTH);
        assert!(validate_domain(&long).is_err());

        let too_long_label = format!("{}.com", "a".repeat(64));
        assert!(validate_domain(&too_long_label).is_err());
    }

    #[test]
    fn test_prepare_domain() {
        assert_eq!(prepare_domain("  Google.COM ").unwrap(), "google.com");
        assert_eq!(prepare_domain("github.com.").unwrap(), "github.com");
        assert!(prepare_domain("   ").is_err());
    }
}
