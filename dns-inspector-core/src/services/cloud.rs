//! Coarse hosting-provider guess from DNS data.
//!
//! Suffix and prefix heuristics only; published IP ranges are not consulted, so
//! the result is a hint, not an attribution.

use dns_inspector_provider::RecordType;

use crate::types::{AggregatedRecord, CloudGuess, Confidence, DnsSnapshot};

const CNAME_WEIGHT: u32 = 3;
const NS_WEIGHT: u32 = 2;
const ADDRESS_WEIGHT: u32 = 1;

struct CloudRule {
    provider: &'static str,
    cname_suffixes: &'static [&'static str],
    ns_suffixes: &'static [&'static str],
    ipv4_prefixes: &'static [&'static str],
}

/// Ties go to the earlier rule.
const RULES: &[CloudRule] = &[
    CloudRule {
        provider: "Cloudflare",
        cname_suffixes: &["cdn.cloudflare.net", "cloudflare.net"],
        ns_suffixes: &["ns.cloudflare.com"],
        ipv4_prefixes: &["104.16.", "104.17.", "104.18.", "104.19.", "104.21.", "172.64.", "172.67.", "188.114."],
    },
    CloudRule {
        provider: "AWS",
        cname_suffixes: &["cloudfront.net", "elb.amazonaws.com", "amazonaws.com"],
        ns_suffixes: &[".awsdns-"],
        ipv4_prefixes: &["3.", "13.", "18.", "52.", "54."],
    },
    CloudRule {
        provider: "Google Cloud",
        cname_suffixes: &["ghs.googlehosted.com", "googleusercontent.com", "appspot.com", "run.app"],
        ns_suffixes: &["googledomains.com", "ns-cloud-"],
        ipv4_prefixes: &["34.", "35."],
    },
    CloudRule {
        provider: "Azure",
        cname_suffixes: &["azurewebsites.net", "cloudapp.azure.com", "azureedge.net", "trafficmanager.net", "azurefd.net"],
        ns_suffixes: &["azure-dns.com", "azure-dns.net", "azure-dns.org", "azure-dns.info"],
        ipv4_prefixes: &["20.", "40.", "13.107."],
    },
    CloudRule {
        provider: "Fastly",
        cname_suffixes: &["fastly.net", "fastlylb.net"],
        ns_suffixes: &[],
        ipv4_prefixes: &["151.101.", "199.232."],
    },
    CloudRule {
        provider: "Akamai",
        cname_suffixes: &["akamaiedge.net", "edgekey.net", "edgesuite.net", "akamai.net"],
        ns_suffixes: &["akam.net"],
        ipv4_prefixes: &["23.", "104.64."],
    },
    CloudRule {
        provider: "Vercel",
        cname_suffixes: &["vercel-dns.com", "vercel.app"],
        ns_suffixes: &["vercel-dns.com"],
        ipv4_prefixes: &["76.76.21."],
    },
    CloudRule {
        provider: "Netlify",
        cname_suffixes: &["netlify.app", "netlify.com"],
        ns_suffixes: &["nsone.net"],
        ipv4_prefixes: &["75.2.60."],
    },
    CloudRule {
        provider: "GitHub Pages",
        cname_suffixes: &["github.io"],
        ns_suffixes: &[],
        ipv4_prefixes: &["185.199.108.", "185.199.109.", "185.199.110.", "185.199.111."],
    },
];

fn host_matches(host: &str, patterns: &[&str]) -> bool {
    let host = host.to_ascii_lowercase();
    patterns
        .iter()
        .any(|p| if p.ends_with('-') || p.starts_with('.') { host.contains(p) } else { host.ends_with(p) })
}

fn score(rule: &CloudRule, snapshot: &DnsSnapshot) -> (u32, Vec<String>) {
    let mut total = 0;
    let mut evidence = Vec::new();

    let mut tally = |records: &[AggregatedRecord], weight: u32, hit: &dyn Fn(&str) -> bool| {
        for record in records.iter().filter(|r| hit(&r.data)) {
            total += weight;
            evidence.push(format!("{} {}", record.record_type, record.data));
        }
    };

    tally(snapshot.records(RecordType::Cname), CNAME_WEIGHT, &|d| host_matches(d, rule.cname_suffixes));
    tally(snapshot.records(RecordType::Ns), NS_WEIGHT, &|d| host_matches(d, rule.ns_suffixes));
    tally(snapshot.records(RecordType::A), ADDRESS_WEIGHT, &|d| {
        rule.ipv4_prefixes.iter().any(|p| d.starts_with(p))
    });

    (total, evidence)
}

/// Best-scoring provider. CNAME matches weigh 3, NS 2, A-record prefixes 1.
pub fn guess_cloud_provider(snapshot: &DnsSnapshot) -> CloudGuess {
    let mut best: Option<(&CloudRule, u32, Vec<String>)> = None;
    for rule in RULES {
        let (total, evidence) = score(rule, snapshot);
        if total > 0 && best.as_ref().is_none_or(|(_, b, _)| total > *b) {
            best = Some((rule, total, evidence));
        }
    }

    let Some((rule, total, evidence)) = best else {
        return CloudGuess::unknown();
    };

    let confidence = match total {
        0 => Confidence::None,
        1 => Confidence::Low,
        2 => Confidence::Medium,
        _ => Confidence::High,
    };
    log::debug!(
        "[Cloud] {}: {} (score {total})",
        snapshot.domain,
        rule.provider
    );

    CloudGuess {
        provider: Some(rule.provider.to_string()),
        evidence,
        confidence,
    }
}
