//! Aggregated DNS record type definitions

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use dns_inspector_provider::{RawAnswer, RecordType};

/// Strip one trailing dot from a presentation-format name or payload.
pub fn canonicalize(data: &str) -> &str {
    data.strip_suffix('.').unwrap_or(data)
}

/// Addresses attached to an NS record after resolving the nameserver host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "camelCase")]
pub enum NameserverAddresses {
    /// The host resolved to these IPv4 addresses.
    Resolved(Vec<String>),
    /// At least one resolver answered, but the host has no A records.
    NotFound,
    /// Every resolver failed for the host lookup.
    LookupFailed(String),
}

/// A deduplicated record with provenance.
///
/// Identity within one aggregation run is `(record_type, data)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedRecord {
    #[serde(rename = "type")]
    pub record_type: RecordType,
    /// Owner name of the first-seen answer, trailing dot stripped
    pub name: String,
    /// Canonical payload, trailing dot stripped
    pub data: String,
    /// TTL of the first-seen answer
    pub ttl: u32,
    /// Contributing resolvers, in first-contribution order. Never empty.
    pub sources: Vec<String>,
    /// Only set on NS records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nameserver: Option<NameserverAddresses>,
}

impl AggregatedRecord {
    /// Create a record from the first answer seen for its key.
    pub fn from_answer(answer: &RawAnswer, provider: &str) -> Self {
        Self {
            record_type: answer.record_type,
            name: canonicalize(&answer.name).to_string(),
            data: canonicalize(&answer.data).to_string(),
            ttl: answer.ttl,
            sources: vec![provider.to_string()],
            nameserver: None,
        }
    }

    /// Record that another resolver returned the same payload.
    ///
    /// Returns `false` if the provider was already listed.
    pub fn add_source(&mut self, provider: &str) -> bool {
        if self.sources.iter().any(|s| s == provider) {
            return false;
        }
        self.sources.push(provider.to_string());
        true
    }
}

/// Per-type outcome of one fan-out.
///
/// Lets callers tell "no resolver reachable" apart from "no records".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeStatus {
    /// Number of resolvers asked
    pub queried: usize,
    /// Number of resolvers that answered (possibly with zero records)
    pub succeeded: usize,
    /// Number of resolvers that failed or timed out
    pub failed: usize,
    /// Whether any answering resolver set the AD flag
    pub authenticated_data: bool,
    /// Failure messages, in provider order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl TypeStatus {
    /// True when no resolver answered for this type.
    pub fn all_failed(&self) -> bool {
        self.succeeded == 0
    }
}

/// Result of a single-name lookup (`_dmarc.<domain>`, nameserver hosts).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameLookup {
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub records: Vec<AggregatedRecord>,
    pub status: TypeStatus,
}

/// Aggregated records for one domain, keyed by record type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsSnapshot {
    pub domain: String,
    /// Every queried type is present, possibly with an empty sequence
    pub records: BTreeMap<RecordType, Vec<AggregatedRecord>>,
    pub status: BTreeMap<RecordType, TypeStatus>,
}

impl DnsSnapshot {
    /// A snapshot with no queried types.
    pub fn empty(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            ..Self::default()
        }
    }

    /// Records of one type; empty if the type was not queried.
    pub fn records(&self, record_type: RecordType) -> &[AggregatedRecord] {
        self.records.get(&record_type).map_or(&[], Vec::as_slice)
    }

    pub fn status(&self, record_type: RecordType) -> Option<&TypeStatus> {
        self.status.get(&record_type)
    }

    /// Whether at least one resolver answered for `record_type`.
    pub fn has_answer(&self, record_type: RecordType) -> bool {
        self.status(record_type).is_some_and(|s| !s.all_failed())
    }

    /// Whether any resolver answered for any type.
    pub fn any_answered(&self) -> bool {
        self.status.values().any(|s| !s.all_failed())
    }

    /// Whether any answering resolver reported the AD flag.
    pub fn any_authenticated(&self) -> bool {
        self.status.values().any(|s| s.authenticated_data)
    }

    /// All records in type order, then insertion order.
    pub fn iter_records(&self) -> impl Iterator<Item = &AggregatedRecord> {
        self.records.values().flatten()
    }

    /// Total number of records.
    pub fn record_count(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }
}
