//! Inspection report type definitions

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use dns_inspector_provider::RecordType;

use super::dns::{AggregatedRecord, TypeStatus};
use super::finding::{FindingsSummary, SecurityFinding};

/// TLS usage inferred from the page URL.
///
/// Certificates are never fetched. When `placeholder` is true, `valid_until` is an
/// estimate derived from the URL scheme, not data read from a certificate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TlsSummary {
    /// Whether the URL uses `https://`
    pub secure: bool,
    /// RFC 3339 expiry timestamp
    pub valid_until: Option<String>,
    pub issuer: Option<String>,
    pub placeholder: bool,
}

/// Confidence of a cloud-provider guess.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    #[default]
    None,
    Low,
    Medium,
    High,
}

/// Hosting provider guessed from DNS data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudGuess {
    pub provider: Option<String>,
    /// Records that matched the winning provider
    pub evidence: Vec<String>,
    pub confidence: Confidence,
}

impl CloudGuess {
    pub fn unknown() -> Self {
        Self::default()
    }
}

/// Everything [`Inspector::inspect`](crate::Inspector::inspect) returns for one
/// `(domain, url)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionReport {
    /// Canonical domain, or the trimmed input when validation failed
    pub domain: String,
    pub url: String,
    pub records: BTreeMap<RecordType, Vec<AggregatedRecord>>,
    pub record_status: BTreeMap<RecordType, TypeStatus>,
    /// TXT records found at `_dmarc.<domain>`
    pub dmarc: Vec<AggregatedRecord>,
    pub tls: TlsSummary,
    pub cloud: CloudGuess,
    pub findings: Vec<SecurityFinding>,
    /// Whether the DNS snapshot was served from the session cache
    pub cached: bool,
}

impl InspectionReport {
    pub fn summary(&self) -> FindingsSummary {
        FindingsSummary::from_findings(&self.findings)
    }

    pub fn finding(&self, check_id: &str) -> Option<&SecurityFinding> {
        self.findings.iter().find(|f| f.check_id == check_id)
    }
}
