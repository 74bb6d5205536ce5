//! DNS Inspector Core Library
//!
//! Inspects a domain through public DNS-over-HTTPS resolvers:
//! - record aggregation with per-resolver provenance (`RecordAggregator`)
//! - presentation formatting (`services::formatter`)
//! - heuristic security checks (`SecurityEvaluator`)
//! - a per-session TTL cache (`SessionCache`)
//!
//! `Inspector` is the entry point; it never returns an error from `inspect`.
//!
//! ```rust,no_run
//! use dns_inspector_core::Inspector;
//!
//! # async fn run() -> dns_inspector_core::CoreResult<()> {
//! let inspector = Inspector::builder().build()?;
//! let report = inspector.inspect("example.com", "https://example.com/").await;
//! for finding in &report.findings {
//!     println!("[{}] {}: {}", finding.severity, finding.check_id, finding.message);
//! }
//! inspector.reset_session().await;
//! # Ok(())
//! # }
//! ```
//!
//! The DNSSEC check only reads the resolvers' AD flag, and the TLS summary is
//! estimated from the URL scheme; neither performs real validation.

pub mod cache;
pub mod config;
pub mod error;
pub mod services;
pub mod types;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use cache::SessionCache;
pub use config::{CacheTtls, InspectorConfig};
pub use error::{CoreError, CoreResult};
pub use services::{
    AggregatorOptions, EvaluationInput, Inspector, InspectorBuilder, RecordAggregator,
    SecurityEvaluator,
};
pub use types::{
    AggregatedRecord, CloudGuess, DnsSnapshot, FindingStatus, FindingsSummary, InspectionReport,
    SecurityFinding, Severity, TlsSummary, TypeStatus,
};
