//! Inspector configuration
//!
//! Everything is optional in JSON; missing fields take the defaults below.
//!
//! ```json
//! {
//!   "resolvers": [{ "kind": "google" }, { "kind": "cloudflare" }],
//!   "recordTypes": ["A", "AAAA", "MX", "TXT"],
//!   "queryTimeoutMs": 5000,
//!   "overallTimeoutMs": 15000,
//!   "cacheTtls": { "dnsSecs": 300, "tlsSecs": 300, "cloudSecs": 600, "findingsSecs": 300 },
//!   "enrichNameservers": true
//! }
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use dns_inspector_provider::{check_endpoint, default_resolver_configs, RecordType, ResolverConfig};

use crate::error::{CoreError, CoreResult};

/// 单次查询超时（毫秒）
pub const DEFAULT_QUERY_TIMEOUT_MS: u64 = 5_000;
/// 整体聚合超时（毫秒）
pub const DEFAULT_OVERALL_TIMEOUT_MS: u64 = 15_000;

/// Session cache lifetimes per data class, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CacheTtls {
    pub dns_secs: u64,
    pub tls_secs: u64,
    pub cloud_secs: u64,
    pub findings_secs: u64,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            dns_secs: 300,
            tls_secs: 300,
            cloud_secs: 600,
            findings_secs: 300,
        }
    }
}

impl CacheTtls {
    pub fn dns(&self) -> Duration {
        Duration::from_secs(self.dns_secs)
    }

    pub fn tls(&self) -> Duration {
        Duration::from_secs(self.tls_secs)
    }

    pub fn cloud(&self) -> Duration {
        Duration::from_secs(self.cloud_secs)
    }

    pub fn findings(&self) -> Duration {
        Duration::from_secs(self.findings_secs)
    }
}

/// Inspector configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InspectorConfig {
    /// Resolvers in priority order; the first one to return a payload wins its TTL
    pub resolvers: Vec<ResolverConfig>,
    pub record_types: Vec<RecordType>,
    pub query_timeout_ms: u64,
    pub overall_timeout_ms: u64,
    pub cache_ttls: CacheTtls,
    /// Resolve A records for every NS host
    pub enrich_nameservers: bool,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            resolvers: default_resolver_configs(),
            record_types: RecordType::ALL.to_vec(),
            query_timeout_ms: DEFAULT_QUERY_TIMEOUT_MS,
            overall_timeout_ms: DEFAULT_OVERALL_TIMEOUT_MS,
            cache_ttls: CacheTtls::default(),
            enrich_nameservers: true,
        }
    }
}

impl InspectorConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| CoreError::ConfigError(format!("invalid configuration JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.resolvers.is_empty() {
            return Err(CoreError::NoResolvers);
        }
        self.validate_settings()
    }

    /// Everything except the resolver list, for callers that inject resolvers.
    pub(crate) fn validate_settings(&self) -> CoreResult<()> {
        if self.record_types.is_empty() {
            return Err(CoreError::ConfigError(
                "recordTypes must not be empty".to_string(),
            ));
        }
        if self.query_timeout_ms == 0 {
            return Err(CoreError::ConfigError(
                "queryTimeoutMs must be greater than 0".to_string(),
            ));
        }
        if self.overall_timeout_ms == 0 {
            return Err(CoreError::ConfigError(
                "overallTimeoutMs must be greater than 0".to_string(),
            ));
        }
        for resolver in &self.resolvers {
            if let Some(endpoint) = &resolver.endpoint {
                check_endpoint(resolver.kind, endpoint)?;
            }
        }
        Ok(())
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn overall_timeout(&self) -> Duration {
        Duration::from_millis(self.overall_timeout_ms)
    }
}
