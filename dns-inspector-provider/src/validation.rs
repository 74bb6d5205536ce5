//! Domain name canonicalization and validation.
//!
//! Every query goes through [`validate_domain`] before a request is built, so a
//! malformed name never reaches a resolver.

use std::net::IpAddr;

/// Maximum length of a presentation-format domain name.
pub const MAX_DOMAIN_LEN: usize = 253;
/// Maximum length of one label.
pub const MAX_LABEL_LEN: usize = 63;

/// Why a domain name was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainValidationError {
    #[error("Domain name is required")]
    Empty,

    #[error("IP addresses are not domain names: {0}")]
    IpAddress(String),

    #[error("Invalid domain name: {0}")]
    Idna(String),

    #[error("Domain name exceeds maximum length of {MAX_DOMAIN_LEN} characters (got {0})")]
    TooLong(usize),

    #[error("Domain name needs at least two labels: {0}")]
    SingleLabel(String),

    #[error("Invalid label '{label}': {reason}")]
    InvalidLabel { label: String, reason: &'static str },

    #[error("Top-level label must be 2+ letters or an IDN label: {0}")]
    InvalidTld(String),
}

/// Canonicalize and validate a domain name.
///
/// Trims whitespace, lowercases, strips one trailing dot and converts
/// internationalised labels to ASCII (IDNA). The result must look like
/// `label(.label)+` where each label is 1-63 letters, digits or hyphens, neither
/// starting nor ending with a hyphen. A leading underscore is accepted so service
/// names such as `_dmarc.example.com` validate. The last label must be two or more
/// letters or an `xn--` label. Raw IP addresses are rejected.
///
/// ```
/// use dns_inspector_provider::validate_domain;
///
/// assert_eq!(validate_domain(" Example.COM. ").unwrap(), "example.com");
/// assert!(validate_domain("192.168.1.1").is_err());
/// ```
pub fn validate_domain(input: &str) -> Result<String, DomainValidationError> {
    let trimmed = input.trim();
    let trimmed = trimmed.strip_suffix('.').unwrap_or(trimmed);
    if trimmed.is_empty() {
        return Err(DomainValidationError::Empty);
    }
    if trimmed.parse::<IpAddr>().is_ok() {
        return Err(DomainValidationError::IpAddress(trimmed.to_string()));
    }

    let ascii = if trimmed.is_ascii() {
        trimmed.to_ascii_lowercase()
    } else {
        idna::domain_to_ascii(trimmed)
            .map_err(|_| DomainValidationError::Idna(trimmed.to_string()))?
    };

    if ascii.len() > MAX_DOMAIN_LEN {
        return Err(DomainValidationError::TooLong(ascii.len()));
    }

    let labels: Vec<&str> = ascii.split('.').collect();
    if labels.len() < 2 {
        return Err(DomainValidationError::SingleLabel(ascii));
    }
    for label in &labels {
        check_label(label)?;
    }

    let tld = labels[labels.len() - 1];
    let tld_ok = tld.starts_with("xn--")
        || (tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()));
    if !tld_ok {
        return Err(DomainValidationError::InvalidTld(tld.to_string()));
    }

    Ok(ascii)
}

fn check_label(label: &str) -> Result<(), DomainValidationError> {
    let invalid = |reason| DomainValidationError::InvalidLabel {
        label: label.to_string(),
        reason,
    };

    if label.is_empty() {
        return Err(invalid("empty label"));
    }
    if label.len() > MAX_LABEL_LEN {
        return Err(invalid("longer than 63 characters"));
    }

    let body = label.strip_prefix('_').unwrap_or(label);
    if body.is_empty() {
        return Err(invalid("empty label"));
    }
    if !body.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(invalid("only letters, digits and hyphens are allowed"));
    }
    if body.starts_with('-') || body.ends_with('-') {
        return Err(invalid("labels cannot start or end with a hyphen"));
    }
    Ok(())
}
