//! 类型定义模块

mod dns;
mod finding;
mod report;

pub use dns::{
    canonicalize, AggregatedRecord, DnsSnapshot, NameLookup, NameserverAddresses, TypeStatus,
};
pub use finding::{FindingStatus, FindingsSummary, SecurityFinding, Severity};
pub use report::{CloudGuess, Confidence, InspectionReport, TlsSummary};

// Re-export provider 库的公共类型
pub use dns_inspector_provider::{
    AnswerSet, ProviderOutcome, ProviderResult, RawAnswer, RecordType, ResolverConfig,
    ResolverKind,
};
