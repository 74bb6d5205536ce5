//! Individual security checks. Each returns exactly one finding.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use dns_inspector_provider::RecordType;

use super::patterns::match_suspicious_patterns;
use super::EvaluationInput;
use crate::services::formatter::format_txt;
use crate::types::{FindingStatus, SecurityFinding, Severity};

pub const SPF: &str = "spf";
pub const DMARC: &str = "dmarc";
pub const DNSSEC: &str = "dnssec";
pub const CAA: &str = "caa";
pub const MX: &str = "mx";
pub const WILDCARD: &str = "wildcard";
pub const HTTPS: &str = "https";
pub const CERTIFICATE_EXPIRY: &str = "certificate-expiry";
pub const SUSPICIOUS_DOMAIN: &str = "suspicious-domain";
pub const DOMAIN_VALIDATION: &str = "domain-validation";

/// Certificates expiring sooner than this are flagged.
const EXPIRY_WARNING_DAYS: i64 = 30;

fn no_data(check_id: &str, what: &str) -> SecurityFinding {
    SecurityFinding::cannot_verify(
        check_id,
        format!("Cannot verify: no resolver returned {what} data"),
    )
}

fn txt_values(input: &EvaluationInput<'_>) -> Vec<String> {
    input
        .snapshot
        .records(RecordType::Txt)
        .iter()
        .map(|r| format_txt(&r.data))
        .collect()
}

pub fn spf(input: &EvaluationInput<'_>) -> SecurityFinding {
    if !input.snapshot.has_answer(RecordType::Txt) {
        return no_data(SPF, "TXT");
    }

    // resolvers disagree on TXT quoting, so compare decoded values
    let mut records: Vec<String> = Vec::new();
    for txt in txt_values(input) {
        if txt.to_ascii_lowercase().contains("v=spf1") && !records.contains(&txt) {
            records.push(txt);
        }
    }

    let Some(record) = records.first() else {
        return SecurityFinding::new(SPF, FindingStatus::Danger, Severity::High, "No SPF record found")
            .with_recommendation("Publish a TXT record such as \"v=spf1 mx -all\" listing the hosts allowed to send mail");
    };

    if records.len() > 1 {
        return SecurityFinding::new(
            SPF,
            FindingStatus::Warning,
            Severity::Medium,
            format!("{} SPF records found; receivers treat this as a permanent error", records.len()),
        )
        .with_recommendation("Merge the SPF policies into a single TXT record");
    }

    let lower = record.to_ascii_lowercase();
    let all = lower
        .split_whitespace()
        .find(|term| term.trim_start_matches(['+', '-', '~', '?']) == "all");
    match all {
        Some("all" | "+all") => SecurityFinding::new(
            SPF,
            FindingStatus::Danger,
            Severity::High,
            "SPF record permits any sender (+all)",
        )
        .with_recommendation("End the SPF record with -all or ~all"),
        Some("?all") => SecurityFinding::new(
            SPF,
            FindingStatus::Warning,
            Severity::Medium,
            "SPF record is neutral about unlisted senders (?all)",
        )
        .with_recommendation("End the SPF record with -all or ~all"),
        _ => SecurityFinding::pass(SPF, format!("SPF record found: {record}")),
    }
}

pub fn dmarc(input: &EvaluationInput<'_>) -> SecurityFinding {
    let Some(lookup) = input.dmarc.filter(|l| !l.status.all_failed()) else {
        return no_data(DMARC, "_dmarc TXT");
    };

    let record = lookup
        .records
        .iter()
        .map(|r| format_txt(&r.data))
        .find(|txt| txt.trim_start().to_ascii_lowercase().starts_with("v=dmarc1"));

    let Some(record) = record else {
        return SecurityFinding::new(
            DMARC,
            FindingStatus::Danger,
            Severity::High,
            format!("No DMARC record found at {}", lookup.name),
        )
        .with_recommendation("Publish a TXT record at _dmarc with at least \"v=DMARC1; p=quarantine\"");
    };

    let policy = record
        .split(';')
        .filter_map(|tag| tag.trim().split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("p"))
        .map(|(_, value)| value.trim().to_ascii_lowercase());

    match policy.as_deref() {
        Some("none") => SecurityFinding::new(
            DMARC,
            FindingStatus::Warning,
            Severity::Low,
            "DMARC policy is monitoring only (p=none)",
        )
        .with_recommendation("Move to p=quarantine or p=reject once reports look clean"),
        Some(p) => SecurityFinding::pass(DMARC, format!("DMARC policy p={p}")),
        None => SecurityFinding::pass(DMARC, format!("DMARC record found: {record}")),
    }
}

/// Reads the resolvers' AD flag only; no chain validation happens here.
pub fn dnssec(input: &EvaluationInput<'_>) -> SecurityFinding {
    if !input.snapshot.any_answered() {
        return no_data(DNSSEC, "any");
    }
    if input.snapshot.any_authenticated() {
        SecurityFinding::pass(DNSSEC, "Resolver reported DNSSEC-authenticated data (AD flag)")
    } else {
        SecurityFinding::new(
            DNSSEC,
            FindingStatus::Warning,
            Severity::Medium,
            "No resolver reported DNSSEC-authenticated data",
        )
        .with_recommendation("Sign the zone and publish a DS record at the registrar")
    }
}

pub fn caa(input: &EvaluationInput<'_>) -> SecurityFinding {
    if !input.snapshot.has_answer(RecordType::Caa) {
        return no_data(CAA, "CAA");
    }
    let count = input.snapshot.records(RecordType::Caa).len();
    if count == 0 {
        SecurityFinding::new(CAA, FindingStatus::Info, Severity::Medium, "No CAA records found")
            .with_recommendation("Add CAA records naming the certificate authorities you use")
    } else {
        SecurityFinding::pass(CAA, format!("{count} CAA record(s) restrict certificate issuance"))
    }
}

pub fn mx(input: &EvaluationInput<'_>) -> SecurityFinding {
    if !input.snapshot.has_answer(RecordType::Mx) {
        return no_data(MX, "MX");
    }
    let count = input.snapshot.records(RecordType::Mx).len();
    if count == 0 {
        SecurityFinding::new(
            MX,
            FindingStatus::Info,
            Severity::Low,
            "No MX records; the domain does not receive mail",
        )
    } else {
        SecurityFinding::pass(MX, format!("{count} MX record(s) found"))
    }
}

pub fn wildcard(input: &EvaluationInput<'_>) -> SecurityFinding {
    if !input.snapshot.any_answered() {
        return no_data(WILDCARD, "any");
    }
    let names: Vec<&str> = input
        .snapshot
        .iter_records()
        .filter(|r| r.name.contains('*'))
        .map(|r| r.name.as_str())
        .collect();
    if names.is_empty() {
        SecurityFinding::pass(WILDCARD, "No wildcard records returned")
    } else {
        SecurityFinding::new(
            WILDCARD,
            FindingStatus::Warning,
            Severity::Low,
            format!("Wildcard record(s) returned: {}", names.join(", ")),
        )
        .with_recommendation("Make sure wildcard records cannot be used to serve unintended hosts")
    }
}

pub fn https(input: &EvaluationInput<'_>) -> SecurityFinding {
    if input.url.trim_start().to_ascii_lowercase().starts_with("https://") {
        SecurityFinding::pass(HTTPS, "Page is served over HTTPS")
    } else {
        SecurityFinding::new(
            HTTPS,
            FindingStatus::Danger,
            Severity::High,
            "Page is not served over HTTPS",
        )
        .with_recommendation("Serve the site over HTTPS and redirect plain HTTP")
    }
}

/// Accepts RFC 3339, RFC 2822 and bare `YYYY-MM-DD` (midnight UTC).
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_rfc2822(raw))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
        })
}

pub fn certificate_expiry(input: &EvaluationInput<'_>) -> SecurityFinding {
    let Some(raw) = input.tls.valid_until.as_deref() else {
        let message = if input.tls.secure {
            "Certificate expiry date is unknown"
        } else {
            "No certificate: page is not served over HTTPS"
        };
        return SecurityFinding::new(
            CERTIFICATE_EXPIRY,
            FindingStatus::Warning,
            Severity::Unknown,
            message,
        );
    };

    let Some(valid_until) = parse_timestamp(raw) else {
        return SecurityFinding::new(
            CERTIFICATE_EXPIRY,
            FindingStatus::Error,
            Severity::Unknown,
            format!("Could not parse certificate expiry '{raw}'"),
        );
    };

    let suffix = if input.tls.placeholder {
        " (estimated, certificate not inspected)"
    } else {
        ""
    };
    let date = valid_until.format("%Y-%m-%d");

    if valid_until < input.now {
        SecurityFinding::new(
            CERTIFICATE_EXPIRY,
            FindingStatus::Danger,
            Severity::Critical,
            format!("Certificate expired on {date}{suffix}"),
        )
        .with_recommendation("Renew the certificate")
    } else if valid_until < input.now + Duration::days(EXPIRY_WARNING_DAYS) {
        let days = (valid_until - input.now).num_days();
        SecurityFinding::new(
            CERTIFICATE_EXPIRY,
            FindingStatus::Warning,
            Severity::High,
            format!("Certificate expires in {days} day(s) on {date}{suffix}"),
        )
        .with_recommendation("Renew the certificate or enable automatic renewal")
    } else {
        SecurityFinding::pass(
            CERTIFICATE_EXPIRY,
            format!("Certificate valid until {date}{suffix}"),
        )
    }
}

pub fn suspicious_domain(input: &EvaluationInput<'_>) -> SecurityFinding {
    let matched = match_suspicious_patterns(input.domain);
    if matched.is_empty() {
        SecurityFinding::pass(SUSPICIOUS_DOMAIN, "No phishing-lookalike patterns matched")
    } else {
        SecurityFinding::new(
            SUSPICIOUS_DOMAIN,
            FindingStatus::Danger,
            Severity::Critical,
            format!("Suspicious domain: {}", matched.join("; ")),
        )
        .with_recommendation("Do not enter credentials unless you trust this site")
    }
}
