use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

// ============ Record Types ============

/// DNS record types inspected by the resolvers.
///
/// The set is closed. Variant order is the display order and drives [`Ord`],
/// so maps keyed by `RecordType` iterate deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    /// IPv4 address record.
    A,
    /// IPv6 address record.
    Aaaa,
    /// Canonical name (alias) record.
    Cname,
    /// Mail exchange record.
    Mx,
    /// Text record.
    Txt,
    /// Name server record.
    Ns,
    /// Start of authority record.
    Soa,
    /// Certificate Authority Authorization record.
    Caa,
    /// Pointer record (reverse DNS).
    Ptr,
}

impl RecordType {
    /// Every supported record type, in display order.
    pub const ALL: [Self; 9] = [
        Self::A,
        Self::Aaaa,
        Self::Cname,
        Self::Mx,
        Self::Txt,
        Self::Ns,
        Self::Soa,
        Self::Caa,
        Self::Ptr,
    ];

    /// IANA RR type code as it appears in DoH JSON answers.
    pub const fn code(self) -> u16 {
        match self {
            Self::A => 1,
            Self::Ns => 2,
            Self::Cname => 5,
            Self::Soa => 6,
            Self::Ptr => 12,
            Self::Mx => 15,
            Self::Txt => 16,
            Self::Aaaa => 28,
            Self::Caa => 257,
        }
    }

    /// Map an IANA RR type code back to a supported type.
    pub const fn from_code(code: u16) -> Option<Self> {
        match code {
            1 => Some(Self::A),
            2 => Some(Self::Ns),
            5 => Some(Self::Cname),
            6 => Some(Self::Soa),
            12 => Some(Self::Ptr),
            15 => Some(Self::Mx),
            16 => Some(Self::Txt),
            28 => Some(Self::Aaaa),
            257 => Some(Self::Caa),
            _ => None,
        }
    }

    /// Upper-case mnemonic used in query strings.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::Aaaa => "AAAA",
            Self::Cname => "CNAME",
            Self::Mx => "MX",
            Self::Txt => "TXT",
            Self::Ns => "NS",
            Self::Soa => "SOA",
            Self::Caa => "CAA",
            Self::Ptr => "PTR",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "A" => Ok(Self::A),
            "AAAA" => Ok(Self::Aaaa),
            "CNAME" => Ok(Self::Cname),
            "MX" => Ok(Self::Mx),
            "TXT" => Ok(Self::Txt),
            "NS" => Ok(Self::Ns),
            "SOA" => Ok(Self::Soa),
            "CAA" => Ok(Self::Caa),
            "PTR" => Ok(Self::Ptr),
            _ => Err(format!("Unsupported record type: {s}")),
        }
    }
}

// ============ Answer Types ============

/// One DNS answer as returned by a resolver.
///
/// `data` is the resolver's presentation-format payload, e.g.
/// `"10 mail.example.com."` for MX or `"\"v=spf1 -all\""` for TXT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAnswer {
    /// Owner name of the answer.
    pub name: String,
    /// Record type.
    #[serde(rename = "type")]
    pub record_type: RecordType,
    /// Resolver-specific payload.
    pub data: String,
    /// Time-to-live in seconds.
    pub ttl: u32,
}

/// Answers returned by one successful query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerSet {
    /// Answers of the queried type, in resolver order.
    pub answers: Vec<RawAnswer>,
    /// The resolver's "Authenticated Data" (AD) flag.
    pub authenticated_data: bool,
}

/// Outcome of a single (resolver, record type) query.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ProviderOutcome {
    /// The resolver answered. An empty `answers` list means "no records".
    #[serde(rename_all = "camelCase")]
    Answered {
        /// Answers of the queried type.
        answers: Vec<RawAnswer>,
        /// The resolver's AD flag.
        authenticated_data: bool,
    },
    /// The query failed; the resolver contributes nothing for this type.
    Failed {
        /// What went wrong.
        error: ProviderError,
    },
}

/// Result of [`DohResolver::fetch`](crate::DohResolver::fetch).
///
/// Failures are values: `fetch` never returns an `Err`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderResult {
    /// Source name of the resolver (e.g. `"Google"`).
    pub provider: String,
    /// Queried record type.
    pub record_type: RecordType,
    /// Answers or failure.
    pub outcome: ProviderOutcome,
}

impl ProviderResult {
    /// Build a successful result.
    pub fn answered(provider: impl Into<String>, record_type: RecordType, set: AnswerSet) -> Self {
        Self {
            provider: provider.into(),
            record_type,
            outcome: ProviderOutcome::Answered {
                answers: set.answers,
                authenticated_data: set.authenticated_data,
            },
        }
    }

    /// Build a failed result.
    pub fn failed(provider: impl Into<String>, record_type: RecordType, error: ProviderError) -> Self {
        Self {
            provider: provider.into(),
            record_type,
            outcome: ProviderOutcome::Failed { error },
        }
    }

    /// Whether the resolver answered (possibly with zero records).
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ProviderOutcome::Answered { .. })
    }

    /// Answers of a successful result; empty for failures.
    pub fn answers(&self) -> &[RawAnswer] {
        match &self.outcome {
            ProviderOutcome::Answered { answers, .. } => answers,
            ProviderOutcome::Failed { .. } => &[],
        }
    }

    /// The AD flag of a successful result; `false` for failures.
    pub fn authenticated_data(&self) -> bool {
        matches!(
            self.outcome,
            ProviderOutcome::Answered {
                authenticated_data: true,
                ..
            }
        )
    }

    /// The error of a failed result.
    pub fn error(&self) -> Option<&ProviderError> {
        match &self.outcome {
            ProviderOutcome::Answered { .. } => None,
            ProviderOutcome::Failed { error } => Some(error),
        }
    }
}

// ============ Resolver Types ============

/// Identifies which DoH resolver implementation to use.
///
/// Each variant is gated behind its corresponding feature flag.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ResolverKind {
    /// Google Public DNS JSON API. Requires feature `google`.
    #[cfg(feature = "google")]
    Google,
    /// Cloudflare 1.1.1.1. Requires feature `cloudflare`.
    #[cfg(feature = "cloudflare")]
    Cloudflare,
    /// Quad9. Requires feature `quad9`.
    #[cfg(feature = "quad9")]
    Quad9,
    /// AdGuard DNS. Requires feature `adguard`.
    #[cfg(feature = "adguard")]
    Adguard,
}

impl fmt::Display for ResolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            #[cfg(feature = "google")]
            Self::Google => write!(f, "google"),
            #[cfg(feature = "cloudflare")]
            Self::Cloudflare => write!(f, "cloudflare"),
            #[cfg(feature = "quad9")]
            Self::Quad9 => write!(f, "quad9"),
            #[cfg(feature = "adguard")]
            Self::Adguard => write!(f, "adguard"),
        }
    }
}

/// Construction parameters for one resolver.
///
/// ```json
/// { "kind": "cloudflare", "endpoint": "https://cloudflare-dns.com/dns-query" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResolverConfig {
    /// Which resolver implementation.
    pub kind: ResolverKind,
    /// Endpoint override; `None` uses the resolver's public endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl ResolverConfig {
    /// Resolver with its default endpoint.
    pub fn new(kind: ResolverKind) -> Self {
        Self {
            kind,
            endpoint: None,
        }
    }

    /// Resolver with an endpoint override.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }
}

/// Static metadata describing a DoH resolver.
///
/// Obtain via [`DohResolver::metadata()`](crate::DohResolver::metadata) or
/// [`get_all_resolver_metadata()`](crate::get_all_resolver_metadata).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolverMetadata {
    /// Resolver kind.
    pub id: ResolverKind,
    /// Source name attached to aggregated records.
    pub name: String,
    /// Short description.
    pub description: String,
    /// Default public endpoint.
    pub default_endpoint: String,
    /// `Accept` header sent with each query, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accept: Option<String>,
}
