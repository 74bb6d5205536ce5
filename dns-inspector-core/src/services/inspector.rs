//! Inspection entry point
//!
//! [`Inspector::inspect`] ties the pieces together: DNS fan-out, `_dmarc` lookup,
//! TLS summary, cloud guess and security checks, each consulted in the session
//! cache first. The call never fails; problems show up as data in the report.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dns_inspector_provider::{create_resolver, validate_domain, DohResolver, RecordType};

use crate::cache::{keys, SessionCache};
use crate::config::InspectorConfig;
use crate::error::{CoreError, CoreResult};
use crate::services::aggregator::{AggregatorOptions, RecordAggregator};
use crate::services::cloud::guess_cloud_provider;
use crate::services::security::{checks, EvaluationInput, SecurityEvaluator};
use crate::types::{
    CloudGuess, DnsSnapshot, FindingStatus, InspectionReport, NameLookup, SecurityFinding,
    Severity, TlsSummary,
};

/// DNS 检查入口
///
/// One instance per session. Cheap to share behind an `Arc`; concurrent
/// inspections only contend on the cache lock.
pub struct Inspector {
    aggregator: RecordAggregator,
    cache: Arc<SessionCache>,
    config: InspectorConfig,
}

impl Inspector {
    #[must_use]
    pub fn builder() -> InspectorBuilder {
        InspectorBuilder::new()
    }

    pub fn config(&self) -> &InspectorConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<SessionCache> {
        &self.cache
    }

    /// Inspect `domain` as seen on the page at `url`.
    pub async fn inspect(&self, domain: &str, url: &str) -> InspectionReport {
        let now = Utc::now();
        let report = match validate_domain(domain) {
            Ok(name) => self.inspect_valid(name, url, now).await,
            Err(e) => self.inspect_invalid(domain, url, &e.to_string(), now).await,
        };

        let summary = report.summary();
        log::info!(
            "[Inspector] {}: {} record(s), {} finding(s), highest severity {}{}",
            report.domain,
            report.records.values().map(Vec::len).sum::<usize>(),
            summary.total,
            summary.highest.map_or("none", |s| s.as_str()),
            if report.cached { " (cached)" } else { "" }
        );
        report
    }

    /// Forget everything cached in this session.
    pub async fn reset_session(&self) {
        self.cache.clear().await;
        log::info!("[Inspector] Session cache cleared");
    }

    async fn inspect_valid(&self, name: String, url: &str, now: DateTime<Utc>) -> InspectionReport {
        let ((snapshot, cached), dmarc) = tokio::join!(self.snapshot(&name), self.dmarc(&name));
        let tls = self.tls(url, now).await;
        let cloud = self.cloud(&name, &snapshot).await;

        let input = EvaluationInput {
            domain: &name,
            url,
            snapshot: &snapshot,
            dmarc: Some(&dmarc),
            tls: &tls,
            now,
        };
        let findings = self.findings(&input, cached).await;

        InspectionReport {
            domain: name.clone(),
            url: url.to_string(),
            records: snapshot.records,
            record_status: snapshot.status,
            dmarc: dmarc.records,
            tls,
            cloud,
            findings,
            cached,
        }
    }

    /// No network and no caching; DNS checks degrade to "cannot verify".
    async fn inspect_invalid(
        &self,
        domain: &str,
        url: &str,
        reason: &str,
        now: DateTime<Utc>,
    ) -> InspectionReport {
        log::warn!("[Inspector] Invalid domain '{domain}': {reason}");

        let snapshot = self
            .aggregator
            .aggregate(domain, &self.config.record_types)
            .await;
        let tls = TlsSummary::from_url(url, now);

        let mut findings = vec![SecurityFinding::new(
            checks::DOMAIN_VALIDATION,
            FindingStatus::Error,
            Severity::Unknown,
            format!("Invalid domain '{}': {reason}", domain.trim()),
        )];
        findings.extend(SecurityEvaluator::evaluate(&EvaluationInput {
            domain,
            url,
            snapshot: &snapshot,
            dmarc: None,
            tls: &tls,
            now,
        }));

        InspectionReport {
            domain: snapshot.domain,
            url: url.to_string(),
            records: snapshot.records,
            record_status: snapshot.status,
            dmarc: Vec::new(),
            tls,
            cloud: CloudGuess::unknown(),
            findings,
            cached: false,
        }
    }

    /// Returns the snapshot and whether it came from the cache.
    async fn snapshot(&self, name: &str) -> (DnsSnapshot, bool) {
        let key = keys::dns(name);
        if let Some(snapshot) = self.cache.get::<DnsSnapshot>(&key).await {
            log::debug!("[Inspector] {name}: DNS snapshot from cache");
            return (snapshot, true);
        }

        let snapshot = self
            .aggregator
            .aggregate(name, &self.config.record_types)
            .await;
        if snapshot.any_answered() {
            self.store(key, &snapshot, self.config.cache_ttls.dns()).await;
        } else {
            log::warn!("[Inspector] {name}: no resolver answered, not caching");
        }
        (snapshot, false)
    }

    async fn dmarc(&self, name: &str) -> NameLookup {
        let key = keys::dmarc(name);
        if let Some(lookup) = self.cache.get::<NameLookup>(&key).await {
            return lookup;
        }

        let lookup = self
            .aggregator
            .aggregate_name(&format!("_dmarc.{name}"), RecordType::Txt)
            .await;
        if !lookup.status.all_failed() {
            self.store(key, &lookup, self.config.cache_ttls.dns()).await;
        }
        lookup
    }

    async fn tls(&self, url: &str, now: DateTime<Utc>) -> TlsSummary {
        let key = keys::tls(url);
        if let Some(tls) = self.cache.get::<TlsSummary>(&key).await {
            return tls;
        }
        let tls = TlsSummary::from_url(url, now);
        self.store(key, &tls, self.config.cache_ttls.tls()).await;
        tls
    }

    async fn cloud(&self, name: &str, snapshot: &DnsSnapshot) -> CloudGuess {
        let key = keys::cloud(name);
        if let Some(guess) = self.cache.get::<CloudGuess>(&key).await {
            return guess;
        }
        let guess = guess_cloud_provider(snapshot);
        if snapshot.any_answered() {
            self.store(key, &guess, self.config.cache_ttls.cloud()).await;
        }
        guess
    }

    /// Cached findings are reused only alongside a cached snapshot.
    async fn findings(&self, input: &EvaluationInput<'_>, snapshot_cached: bool) -> Vec<SecurityFinding> {
        let key = keys::security(input.domain, input.url);
        if snapshot_cached {
            if let Some(findings) = self.cache.get::<Vec<SecurityFinding>>(&key).await {
                return findings;
            }
        }

        let findings = SecurityEvaluator::evaluate(input);
        if input.snapshot.any_answered() {
            self.store(key, &findings, self.config.cache_ttls.findings()).await;
        }
        findings
    }

    async fn store<T: serde::Serialize + ?Sized>(&self, key: String, value: &T, ttl: std::time::Duration) {
        if let Err(e) = self.cache.set(key.clone(), value, ttl).await {
            log::warn!("[Inspector] Failed to cache {key}: {e}");
        }
    }
}

/// Builder for [`Inspector`].
///
/// # Optional
/// - `config`: defaults to [`InspectorConfig::default`]
/// - `resolver`: injected resolvers replace `config.resolvers`
/// - `cache`: defaults to a fresh [`SessionCache`]
pub struct InspectorBuilder {
    config: InspectorConfig,
    resolvers: Vec<Arc<dyn DohResolver>>,
    cache: Option<Arc<SessionCache>>,
}

impl InspectorBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: InspectorConfig::default(),
            resolvers: Vec::new(),
            cache: None,
        }
    }

    #[must_use]
    pub fn config(mut self, config: InspectorConfig) -> Self {
        self.config = config;
        self
    }

    /// Add a resolver. Order matters: earlier resolvers win merge ties.
    #[must_use]
    pub fn resolver(mut self, resolver: Arc<dyn DohResolver>) -> Self {
        self.resolvers.push(resolver);
        self
    }

    #[must_use]
    pub fn cache(mut self, cache: Arc<SessionCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Build the `Inspector`.
    ///
    /// # Errors
    /// - `CoreError::NoResolvers` if neither resolvers nor resolver configs are given
    /// - `CoreError::ConfigError` / `CoreError::Provider` for invalid settings
    pub fn build(self) -> CoreResult<Inspector> {
        let resolvers = if self.resolvers.is_empty() {
            self.config.validate()?;
            self.config
                .resolvers
                .iter()
                .map(|c| create_resolver(c.clone()))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            self.config.validate_settings()?;
            self.resolvers
        };
        if resolvers.is_empty() {
            return Err(CoreError::NoResolvers);
        }

        log::debug!(
            "[Inspector] Using resolvers: {}",
            resolvers.iter().map(|r| r.name()).collect::<Vec<_>>().join(", ")
        );

        let aggregator = RecordAggregator::new(resolvers, AggregatorOptions::from(&self.config));
        Ok(Inspector {
            aggregator,
            cache: self.cache.unwrap_or_default(),
            config: self.config,
        })
    }
}

impl Default for InspectorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
