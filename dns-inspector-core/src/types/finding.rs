//! Security finding type definitions

use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome class of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingStatus {
    Success,
    Info,
    Warning,
    Danger,
    Error,
}

/// How much a finding matters.
///
/// Ordered by [`Severity::rank`]: critical > high > medium > low = unknown > none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    None,
    Low,
    Medium,
    High,
    Critical,
    Unknown,
}

impl Severity {
    pub const fn rank(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Low | Self::Unknown => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::Critical => 4,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one security check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityFinding {
    /// Stable identifier of the check (`spf`, `dmarc`, ...)
    pub check_id: String,
    pub status: FindingStatus,
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

impl SecurityFinding {
    pub fn new(
        check_id: &str,
        status: FindingStatus,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            check_id: check_id.to_string(),
            status,
            severity,
            message: message.into(),
            recommendation: None,
        }
    }

    /// A passing check: `success` / `none`.
    pub fn pass(check_id: &str, message: impl Into<String>) -> Self {
        Self::new(check_id, FindingStatus::Success, Severity::None, message)
    }

    /// The check needs data that is missing: `warning` / `medium`.
    pub fn cannot_verify(check_id: &str, message: impl Into<String>) -> Self {
        Self::new(check_id, FindingStatus::Warning, Severity::Medium, message)
    }

    #[must_use]
    pub fn with_recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = Some(recommendation.into());
        self
    }

    pub fn is_pass(&self) -> bool {
        self.status == FindingStatus::Success
    }
}

/// Per-severity counts for bucketing findings in a UI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindingsSummary {
    pub total: usize,
    pub passed: usize,
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub unknown: usize,
    /// Highest severity among non-passing findings; `None` when all pass
    pub highest: Option<Severity>,
}

impl FindingsSummary {
    pub fn from_findings(findings: &[SecurityFinding]) -> Self {
        let mut summary = Self {
            total: findings.len(),
            ..Self::default()
        };

        for finding in findings {
            match finding.severity {
                Severity::None => summary.passed += 1,
                Severity::Low => summary.low += 1,
                Severity::Medium => summary.medium += 1,
                Severity::High => summary.high += 1,
                Severity::Critical => summary.critical += 1,
                Severity::Unknown => summary.unknown += 1,
            }
            if finding.severity != Severity::None
                && summary
                    .highest
                    .is_none_or(|h| finding.severity.rank() > h.rank())
            {
                summary.highest = Some(finding.severity);
            }
        }

        summary
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn severity_rank_order() {
        assert!(Severity::Critical.rank() > Severity::High.rank());
        assert!(Severity::High.rank() > Severity::Medium.rank());
        assert!(Severity::Medium.rank() > Severity::Low.rank());
        assert_eq!(Severity::Low.rank(), Severity::Unknown.rank());
        assert!(Severity::Unknown.rank() > Severity::None.rank());
    }

    #[test]
    fn finding_json_shape() {
        let finding = SecurityFinding::new("caa", FindingStatus::Info, Severity::Medium, "No CAA")
            .with_recommendation("Add a CAA record");
        let json = serde_json::to_value(&finding).unwrap();
        assert_eq!(json["checkId"], "caa");
        assert_eq!(json["status"], "info");
        assert_eq!(json["severity"], "medium");
        assert_eq!(json["recommendation"], "Add a CAA record");

        let pass = serde_json::to_value(SecurityFinding::pass("mx", "ok")).unwrap();
        assert!(pass.get("recommendation").is_none());
    }

    #[test]
    fn summary_counts_and_highest() {
        let findings = vec![
            SecurityFinding::pass("spf", "ok"),
            SecurityFinding::cannot_verify("dmarc", "?"),
            SecurityFinding::new("https", FindingStatus::Danger, Severity::High, "http"),
            SecurityFinding::new("certificate-expiry", FindingStatus::Error, Severity::Unknown, "?"),
        ];
        let summary = FindingsSummary::from_findings(&findings);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.medium, 1);
        assert_eq!(summary.high, 1);
        assert_eq!(summary.unknown, 1);
        assert_eq!(summary.highest, Some(Severity::High));
    }

    #[test]
    fn summary_all_pass() {
        let summary = FindingsSummary::from_findings(&[SecurityFinding::pass("mx", "ok")]);
        assert_eq!(summary.highest, None);
    }
}
