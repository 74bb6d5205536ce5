//! 业务逻辑服务层

pub mod aggregator;
pub mod cloud;
pub mod formatter;
pub mod inspector;
pub mod security;
mod tls;

pub use aggregator::{AggregatorOptions, RecordAggregator};
pub use cloud::guess_cloud_provider;
pub use formatter::{format_record, format_sources, format_ttl, render_records, RenderedRecord};
pub use inspector::{Inspector, InspectorBuilder};
pub use security::{match_suspicious_patterns, EvaluationInput, SecurityEvaluator};
pub use tls::ESTIMATED_VALIDITY_DAYS;
