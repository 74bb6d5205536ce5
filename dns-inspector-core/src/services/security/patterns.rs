//! Phishing-lookalike domain patterns.

use std::sync::LazyLock;

use regex::Regex;

/// Brand names and the registrable domains they legitimately live under.
const BRANDS: &[(&str, &[&str])] = &[
    ("paypal", &["paypal.com", "paypal.me", "paypalobjects.com"]),
    ("apple", &["apple.com", "icloud.com"]),
    ("microsoft", &["microsoft.com", "live.com", "office.com"]),
    ("google", &["google.com", "googleapis.com", "gstatic.com"]),
    ("amazon", &["amazon.com", "amazonaws.com", "amazon.co.uk", "amazon.de"]),
    ("netflix", &["netflix.com", "nflxvideo.net"]),
    ("facebook", &["facebook.com", "fb.com"]),
    ("instagram", &["instagram.com"]),
    ("coinbase", &["coinbase.com"]),
    ("binance", &["binance.com"]),
];

/// TLDs with disproportionate abuse rates.
const HIGH_ABUSE_TLDS: &[&str] = &[
    "tk", "ml", "ga", "cf", "gq", "xyz", "top", "zip", "mov", "click", "country", "work", "buzz",
    "rest", "cam", "loan",
];

/// Keywords that show up hyphenated into lookalike names.
const LURE_KEYWORDS: &[&str] = &["secure", "login", "signin", "verify", "account", "update", "confirm"];

struct BrandPattern {
    name: &'static str,
    /// Brand as a whole label or hyphen-separated token.
    mention: Regex,
    canonical: Regex,
    /// Brand's own name under a two-letter country TLD, e.g. `google.de`, `amazon.co.jp`.
    country: Regex,
}

impl BrandPattern {
    fn is_official(&self, host: &str) -> bool {
        self.canonical.is_match(host) || (self.country.is_match(host) && !is_abused_tld(host))
    }
}

static BRAND_PATTERNS: LazyLock<Vec<BrandPattern>> = LazyLock::new(|| {
    BRANDS
        .iter()
        .filter_map(|(name, domains)| {
            let escaped: Vec<String> = domains.iter().map(|d| regex::escape(d)).collect();
            let name_re = regex::escape(name);
            let mention = Regex::new(&format!(r"(^|[.-]){name_re}([.-]|$)")).ok()?;
            let canonical = Regex::new(&format!(r"(^|\.)({})$", escaped.join("|"))).ok()?;
            let country = Regex::new(&format!(r"(^|\.){name_re}\.((co|com)\.)?[a-z]{{2}}$")).ok()?;
            Some(BrandPattern {
                name: *name,
                mention,
                canonical,
                country,
            })
        })
        .collect()
});

static RAW_IPV4: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\d{1,3}(\.\d{1,3}){3}$").ok());

static ABUSED_TLD: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(&format!(r"\.({})$", HIGH_ABUSE_TLDS.join("|"))).ok()
});

static LURE_KEYWORD: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(&format!(r"\b({})\b", LURE_KEYWORDS.join("|"))).ok());

fn is_abused_tld(host: &str) -> bool {
    ABUSED_TLD.as_ref().is_some_and(|re| re.is_match(host))
}

/// Describe every suspicious pattern `host` matches. Empty when clean.
///
/// `host` is matched as given after trimming, lowercasing and dropping one
/// trailing dot, so raw IPs and unvalidated input are covered too.
pub fn match_suspicious_patterns(host: &str) -> Vec<String> {
    let host = host.trim().to_ascii_lowercase();
    let host = host.strip_suffix('.').unwrap_or(&host);
    let mut matched = Vec::new();

    for brand in BRAND_PATTERNS.iter() {
        if brand.mention.is_match(host) && !brand.is_official(host) {
            matched.push(format!("brand name '{}' outside its official domains", brand.name));
        }
    }

    if RAW_IPV4.as_ref().is_some_and(|re| re.is_match(host)) {
        matched.push("raw IPv4 address as hostname".to_string());
    }

    if let Some(caps) = ABUSED_TLD.as_ref().and_then(|re| re.captures(host)) {
        matched.push(format!("high-abuse TLD '.{}'", &caps[1]));
    }

    if let Some(re) = LURE_KEYWORD.as_ref() {
        // only keywords glued to another token with a hyphen
        let keywords: Vec<&str> = re
            .find_iter(host)
            .filter(|m| host[..m.start()].ends_with('-') || host[m.end()..].starts_with('-'))
            .map(|m| m.as_str())
            .collect();
        if !keywords.is_empty() {
            matched.push(format!("hyphenated lure keyword(s) '{}'", keywords.join("', '")));
        }
    }

    matched
}
