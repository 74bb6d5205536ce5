//! 安全启发式检查
//!
//! A fixed battery of pure checks over one inspection's data. Every check yields
//! exactly one [`SecurityFinding`]; missing inputs degrade to "cannot verify"
//! rather than a pass.

pub mod checks;
mod patterns;

use chrono::{DateTime, Utc};

use crate::types::{DnsSnapshot, NameLookup, SecurityFinding, TlsSummary};

pub use patterns::match_suspicious_patterns;

/// Everything the checks read.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationInput<'a> {
    /// Domain as entered; suspicious-pattern matching runs on this
    pub domain: &'a str,
    pub url: &'a str,
    pub snapshot: &'a DnsSnapshot,
    /// `_dmarc.<domain>` TXT lookup, if one was made
    pub dmarc: Option<&'a NameLookup>,
    pub tls: &'a TlsSummary,
    pub now: DateTime<Utc>,
}

type Check = fn(&EvaluationInput<'_>) -> SecurityFinding;

const CHECKS: &[Check] = &[
    checks::spf,
    checks::dmarc,
    checks::dnssec,
    checks::caa,
    checks::mx,
    checks::wildcard,
    checks::https,
    checks::certificate_expiry,
    checks::suspicious_domain,
];

/// 安全评估器
pub struct SecurityEvaluator;

impl SecurityEvaluator {
    /// Run every check. The result is unsorted.
    pub fn evaluate(input: &EvaluationInput<'_>) -> Vec<SecurityFinding> {
        let findings: Vec<SecurityFinding> = CHECKS.iter().map(|check| check(input)).collect();
        log::debug!(
            "[Security] {}: {} finding(s), {} not passing",
            input.domain,
            findings.len(),
            findings.iter().filter(|f| !f.is_pass()).count()
        );
        findings
    }

    /// Ids of the checks [`evaluate`](Self::evaluate) runs.
    pub fn check_ids() -> &'static [&'static str] {
        &[
            checks::SPF,
            checks::DMARC,
            checks::DNSSEC,
            checks::CAA,
            checks::MX,
            checks::WILDCARD,
            checks::HTTPS,
            checks::CERTIFICATE_EXPIRY,
            checks::SUSPICIOUS_DOMAIN,
        ]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{AggregatedRecord, FindingStatus, Severity, TypeStatus};
    use chrono::TimeZone;
    use dns_inspector_provider::RecordType;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn record(record_type: RecordType, name: &str, data: &str) -> AggregatedRecord {
        AggregatedRecord {
            record_type,
            name: name.to_string(),
            data: data.to_string(),
            ttl: 300,
            sources: vec!["Google".to_string()],
            nameserver: None,
        }
    }

    fn answered() -> TypeStatus {
        TypeStatus {
            queried: 1,
            succeeded: 1,
            ..TypeStatus::default()
        }
    }

    fn failed() -> TypeStatus {
        TypeStatus {
            queried: 1,
            failed: 1,
            errors: vec!["[Google] Network error: connection refused".to_string()],
            ..TypeStatus::default()
        }
    }

    /// Every type answered, with the given records.
    fn snapshot(records: Vec<AggregatedRecord>) -> DnsSnapshot {
        let mut snapshot = DnsSnapshot::empty("example.com");
        for record_type in RecordType::ALL {
            snapshot.records.insert(record_type, Vec::new());
            snapshot.status.insert(record_type, answered());
        }
        for record in records {
            snapshot.records.entry(record.record_type).or_default().push(record);
        }
        snapshot
    }

    fn dmarc_lookup(data: &[&str]) -> NameLookup {
        NameLookup {
            name: "_dmarc.example.com".to_string(),
            record_type: RecordType::Txt,
            records: data
                .iter()
                .map(|d| record(RecordType::Txt, "_dmarc.example.com", d))
                .collect(),
            status: answered(),
        }
    }

    fn secure_tls(valid_until: &str) -> TlsSummary {
        TlsSummary {
            secure: true,
            valid_until: Some(valid_until.to_string()),
            issuer: None,
            placeholder: false,
        }
    }

    fn evaluate_with(
        domain: &str,
        url: &str,
        snapshot: &DnsSnapshot,
        dmarc: Option<&NameLookup>,
        tls: &TlsSummary,
    ) -> Vec<SecurityFinding> {
        SecurityEvaluator::evaluate(&EvaluationInput {
            domain,
            url,
            snapshot,
            dmarc,
            tls,
            now: now(),
        })
    }

    fn find<'a>(findings: &'a [SecurityFinding], check_id: &str) -> &'a SecurityFinding {
        findings.iter().find(|f| f.check_id == check_id).unwrap()
    }

    #[test]
    fn one_finding_per_check() {
        let findings = evaluate_with(
            "example.com",
            "https://example.com/",
            &snapshot(vec![]),
            None,
            &TlsSummary::default(),
        );
        let ids: Vec<&str> = findings.iter().map(|f| f.check_id.as_str()).collect();
        assert_eq!(ids, SecurityEvaluator::check_ids());
    }

    #[test]
    fn spf_present_passes() {
        let snapshot = snapshot(vec![record(
            RecordType::Txt,
            "example.com",
            "\"v=spf1 include:_spf.example.com -all\"",
        )]);
        let findings = evaluate_with("example.com", "https://example.com", &snapshot, None, &TlsSummary::default());
        let spf = find(&findings, checks::SPF);
        assert_eq!(spf.status, FindingStatus::Success);
        assert_eq!(spf.severity, Severity::None);
    }

    #[test]
    fn spf_missing_permissive_and_duplicated() {
        let tls = TlsSummary::default();
        let missing = snapshot(vec![record(RecordType::Txt, "example.com", "\"google-site-verification=x\"")]);
        let f = evaluate_with("example.com", "https://example.com", &missing, None, &tls);
        assert_eq!(find(&f, checks::SPF).severity, Severity::High);
        assert_eq!(find(&f, checks::SPF).status, FindingStatus::Danger);

        let plus_all = snapshot(vec![record(RecordType::Txt, "example.com", "\"v=spf1 +all\"")]);
        let f = evaluate_with("example.com", "https://example.com", &plus_all, None, &tls);
        assert_eq!(find(&f, checks::SPF).severity, Severity::High);

        let neutral = snapshot(vec![record(RecordType::Txt, "example.com", "\"V=SPF1 mx ?all\"")]);
        let f = evaluate_with("example.com", "https://example.com", &neutral, None, &tls);
        assert_eq!(find(&f, checks::SPF).status, FindingStatus::Warning);
        assert_eq!(find(&f, checks::SPF).severity, Severity::Medium);

        let twice = snapshot(vec![
            record(RecordType::Txt, "example.com", "\"v=spf1 -all\""),
            record(RecordType::Txt, "example.com", "\"v=spf1 mx -all\""),
        ]);
        let f = evaluate_with("example.com", "https://example.com", &twice, None, &tls);
        assert_eq!(find(&f, checks::SPF).severity, Severity::Medium);
    }

    #[test]
    fn same_spf_quoted_and_unquoted_is_one_record() {
        let mut unquoted = record(RecordType::Txt, "example.com", "v=spf1 include:_spf.example.com -all");
        unquoted.sources = vec!["Google".to_string()];
        let mut quoted = record(RecordType::Txt, "example.com", "\"v=spf1 include:_spf.example.com -all\"");
        quoted.sources = vec!["Cloudflare".to_string()];
        let snapshot = snapshot(vec![unquoted, quoted]);

        let findings = evaluate_with("example.com", "https://example.com", &snapshot, None, &TlsSummary::default());
        let spf = find(&findings, checks::SPF);
        assert_eq!(spf.status, FindingStatus::Success, "{}", spf.message);
        assert_eq!(spf.severity, Severity::None);
    }

    #[test]
    fn missing_data_cannot_be_verified() {
        let mut snapshot = snapshot(vec![]);
        for status in snapshot.status.values_mut() {
            *status = failed();
        }
        let findings = evaluate_with("example.com", "https://example.com", &snapshot, None, &TlsSummary::default());

        for check_id in [checks::SPF, checks::DMARC, checks::DNSSEC, checks::CAA, checks::MX, checks::WILDCARD] {
            let finding = find(&findings, check_id);
            assert_eq!(finding.status, FindingStatus::Warning, "{check_id}");
            assert_eq!(finding.severity, Severity::Medium, "{check_id}");
            assert!(finding.message.starts_with("Cannot verify"), "{check_id}");
        }
    }

    #[test]
    fn unqueried_type_cannot_be_verified() {
        let mut snapshot = snapshot(vec![]);
        snapshot.records.remove(&RecordType::Caa);
        snapshot.status.remove(&RecordType::Caa);
        let findings = evaluate_with("example.com", "https://example.com", &snapshot, None, &TlsSummary::default());
        assert_eq!(find(&findings, checks::CAA).severity, Severity::Medium);
        assert_eq!(find(&findings, checks::CAA).status, FindingStatus::Warning);
    }

    #[test]
    fn no_caa_is_info_medium() {
        let findings = evaluate_with(
            "example.com",
            "https://example.com",
            &snapshot(vec![]),
            None,
            &TlsSummary::default(),
        );
        let caa = find(&findings, checks::CAA);
        assert_eq!(caa.status, FindingStatus::Info);
        assert_eq!(caa.severity, Severity::Medium);

        let mx = find(&findings, checks::MX);
        assert_eq!(mx.status, FindingStatus::Info);
        assert_eq!(mx.severity, Severity::Low);
    }

    #[test]
    fn dmarc_policies() {
        let snapshot = snapshot(vec![]);
        let tls = TlsSummary::default();

        let reject = dmarc_lookup(&["\"v=DMARC1; p=reject; rua=mailto:d@example.com\""]);
        let f = evaluate_with("example.com", "https://example.com", &snapshot, Some(&reject), &tls);
        assert!(find(&f, checks::DMARC).is_pass());

        let monitor = dmarc_lookup(&["\"v=DMARC1; p=none\""]);
        let f = evaluate_with("example.com", "https://example.com", &snapshot, Some(&monitor), &tls);
        assert_eq!(find(&f, checks::DMARC).status, FindingStatus::Warning);
        assert_eq!(find(&f, checks::DMARC).severity, Severity::Low);

        let missing = dmarc_lookup(&[]);
        let f = evaluate_with("example.com", "https://example.com", &snapshot, Some(&missing), &tls);
        assert_eq!(find(&f, checks::DMARC).status, FindingStatus::Danger);
        assert_eq!(find(&f, checks::DMARC).severity, Severity::High);
    }

    #[test]
    fn dnssec_reads_ad_flag() {
        let mut snapshot = snapshot(vec![]);
        let tls = TlsSummary::default();
        let f = evaluate_with("example.com", "https://example.com", &snapshot, None, &tls);
        assert_eq!(find(&f, checks::DNSSEC).severity, Severity::Medium);

        snapshot.status.get_mut(&RecordType::A).unwrap().authenticated_data = true;
        let f = evaluate_with("example.com", "https://example.com", &snapshot, None, &tls);
        assert!(find(&f, checks::DNSSEC).is_pass());
    }

    #[test]
    fn wildcard_owner_names() {
        let snapshot = snapshot(vec![record(RecordType::A, "*.example.com", "192.0.2.1")]);
        let f = evaluate_with("example.com", "https://example.com", &snapshot, None, &TlsSummary::default());
        let wildcard = find(&f, checks::WILDCARD);
        assert_eq!(wildcard.severity, Severity::Low);
        assert!(wildcard.message.contains("*.example.com"));
    }

    #[test]
    fn insecure_url_and_expired_certificate() {
        let tls = TlsSummary {
            secure: false,
            valid_until: Some("2025-12-01T00:00:00Z".to_string()),
            issuer: None,
            placeholder: false,
        };
        let f = evaluate_with("insecure.test", "http://insecure.test", &snapshot(vec![]), None, &tls);
        assert_eq!(find(&f, checks::HTTPS).severity, Severity::High);
        assert_eq!(find(&f, checks::HTTPS).status, FindingStatus::Danger);
        assert_eq!(find(&f, checks::CERTIFICATE_EXPIRY).severity, Severity::Critical);
    }

    #[test]
    fn https_check_never_passes_plain_http() {
        let snapshot = snapshot(vec![]);
        let tls = TlsSummary::default();
        for url in ["http://example.com", "HTTP://example.com", "", "ftp://example.com", "example.com"] {
            let f = evaluate_with("example.com", url, &snapshot, None, &tls);
            assert_ne!(find(&f, checks::HTTPS).severity, Severity::None, "{url}");
        }
        let f = evaluate_with("example.com", "HTTPS://example.com", &snapshot, None, &tls);
        assert!(find(&f, checks::HTTPS).is_pass());
    }

    #[test]
    fn certificate_expiry_windows() {
        let snapshot = snapshot(vec![]);
        let check = |tls: &TlsSummary| {
            let f = evaluate_with("example.com", "https://example.com", &snapshot, None, tls);
            let finding = find(&f, checks::CERTIFICATE_EXPIRY).clone();
            (finding.status, finding.severity)
        };

        assert_eq!(
            check(&secure_tls("2026-03-10T00:00:00Z")),
            (FindingStatus::Warning, Severity::High)
        );
        assert_eq!(
            check(&secure_tls("Mon, 01 Jun 2026 00:00:00 +0000")),
            (FindingStatus::Success, Severity::None)
        );
        assert_eq!(check(&secure_tls("2026-02-01")), (FindingStatus::Danger, Severity::Critical));
        assert_eq!(check(&secure_tls("next tuesday")), (FindingStatus::Error, Severity::Unknown));
        assert_eq!(check(&TlsSummary::default()), (FindingStatus::Warning, Severity::Unknown));
    }

    #[test]
    fn placeholder_expiry_is_labelled() {
        let mut tls = secure_tls("2026-06-01T00:00:00Z");
        tls.placeholder = true;
        let f = evaluate_with("example.com", "https://example.com", &snapshot(vec![]), None, &tls);
        assert!(find(&f, checks::CERTIFICATE_EXPIRY).message.contains("estimated"));
    }

    #[test]
    fn lookalike_domain_is_critical() {
        let f = evaluate_with(
            "paypal-secure-login.xyz",
            "https://paypal-secure-login.xyz/",
            &snapshot(vec![]),
            None,
            &TlsSummary::default(),
        );
        let suspicious = find(&f, checks::SUSPICIOUS_DOMAIN);
        assert_eq!(suspicious.status, FindingStatus::Danger);
        assert_eq!(suspicious.severity, Severity::Critical);
        assert!(suspicious.message.contains("paypal"));
    }

    #[test]
    fn evaluation_is_deterministic() {
        let snapshot = snapshot(vec![record(RecordType::Txt, "example.com", "\"v=spf1 -all\"")]);
        let dmarc = dmarc_lookup(&["\"v=DMARC1; p=none\""]);
        let tls = secure_tls("2026-04-01T00:00:00Z");
        let first = evaluate_with("example.com", "https://example.com", &snapshot, Some(&dmarc), &tls);
        let second = evaluate_with("example.com", "https://example.com", &snapshot, Some(&dmarc), &tls);
        assert_eq!(first, second);
    }
}
