//! DNS 记录聚合服务
//!
//! Fans out one query per (resolver, record type) pair, buffers every result in
//! a slot indexed by `[query][resolver]`, then merges the slots in resolver order.
//! Completion order therefore never leaks into the output.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::time::Instant;
use dns_inspector_provider::{
    validate_domain, DohResolver, ProviderError, ProviderOutcome, ProviderResult, RecordType,
};

use crate::config::{InspectorConfig, DEFAULT_OVERALL_TIMEOUT_MS, DEFAULT_QUERY_TIMEOUT_MS};
use crate::types::{
    canonicalize, AggregatedRecord, DnsSnapshot, NameLookup, NameserverAddresses, TypeStatus,
};

/// Timeouts and enrichment switches for [`RecordAggregator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregatorOptions {
    /// Ceiling for a single (resolver, type) query
    pub query_timeout: Duration,
    /// Ceiling for one `aggregate` or `aggregate_name` call, NS enrichment
    /// included; unsettled pairs become timeouts
    pub overall_timeout: Duration,
    /// Resolve A records for NS hosts
    pub enrich_nameservers: bool,
}

impl Default for AggregatorOptions {
    fn default() -> Self {
        Self {
            query_timeout: Duration::from_millis(DEFAULT_QUERY_TIMEOUT_MS),
            overall_timeout: Duration::from_millis(DEFAULT_OVERALL_TIMEOUT_MS),
            enrich_nameservers: true,
        }
    }
}

impl From<&InspectorConfig> for AggregatorOptions {
    fn from(config: &InspectorConfig) -> Self {
        Self {
            query_timeout: config.query_timeout(),
            overall_timeout: config.overall_timeout(),
            enrich_nameservers: config.enrich_nameservers,
        }
    }
}

/// DNS 记录聚合器
pub struct RecordAggregator {
    resolvers: Vec<Arc<dyn DohResolver>>,
    options: AggregatorOptions,
}

impl RecordAggregator {
    /// 创建聚合器，resolver 顺序决定合并优先级
    #[must_use]
    pub fn new(resolvers: Vec<Arc<dyn DohResolver>>, options: AggregatorOptions) -> Self {
        Self { resolvers, options }
    }

    pub fn resolvers(&self) -> &[Arc<dyn DohResolver>] {
        &self.resolvers
    }

    pub fn options(&self) -> AggregatorOptions {
        self.options
    }

    /// Query every resolver for every type in `types` and merge the answers.
    ///
    /// Never fails: every requested type is present in the snapshot, with an empty
    /// record list when nothing was found or nothing answered. The matching
    /// [`TypeStatus`] tells those two cases apart.
    pub async fn aggregate(&self, domain: &str, types: &[RecordType]) -> DnsSnapshot {
        let mut types = types.to_vec();
        types.sort_unstable();
        types.dedup();

        let deadline = self.deadline();
        let name = match validate_domain(domain) {
            Ok(name) => name,
            Err(e) => {
                log::warn!("[Aggregator] Skipping invalid domain '{domain}': {e}");
                return self.rejected_snapshot(domain, &types, &e.to_string());
            }
        };

        let queries: Vec<(String, RecordType)> =
            types.iter().map(|&t| (name.clone(), t)).collect();
        let slots = self.fan_out(&queries, deadline).await;

        let mut snapshot = DnsSnapshot::empty(name.clone());
        for (&record_type, results) in types.iter().zip(slots) {
            let (records, status) = merge(&results);
            log::trace!(
                "[Aggregator] {name} {record_type}: {} record(s), {}/{} resolver(s) answered",
                records.len(),
                status.succeeded,
                status.queried
            );
            snapshot.records.insert(record_type, records);
            snapshot.status.insert(record_type, status);
        }

        if self.options.enrich_nameservers {
            if let Some(ns_records) = snapshot.records.get_mut(&RecordType::Ns) {
                self.enrich_nameservers(ns_records, deadline).await;
            }
        }

        log::debug!(
            "[Aggregator] {name}: {} record(s) across {} type(s)",
            snapshot.record_count(),
            types.len()
        );
        snapshot
    }

    /// Run the same fan-out for one auxiliary name, e.g. `_dmarc.<domain>` TXT.
    pub async fn aggregate_name(&self, name: &str, record_type: RecordType) -> NameLookup {
        self.lookup_name(name, record_type, self.deadline()).await
    }

    async fn lookup_name(
        &self,
        name: &str,
        record_type: RecordType,
        deadline: Option<Instant>,
    ) -> NameLookup {
        let canonical = match validate_domain(name) {
            Ok(canonical) => canonical,
            Err(e) => {
                return NameLookup {
                    name: name.to_string(),
                    record_type,
                    records: Vec::new(),
                    status: self.rejected_status(&e.to_string()),
                };
            }
        };

        let mut slots = self.fan_out(&[(canonical.clone(), record_type)], deadline).await;
        let results = slots.pop().unwrap_or_default();
        let (records, status) = merge(&results);
        NameLookup {
            name: canonical,
            record_type,
            records,
            status,
        }
    }

    async fn enrich_nameservers(&self, records: &mut [AggregatedRecord], deadline: Option<Instant>) {
        if records.is_empty() {
            return;
        }

        let lookups = futures::future::join_all(
            records
                .iter()
                .map(|record| self.lookup_name(&record.data, RecordType::A, deadline)),
        )
        .await;

        for (record, lookup) in records.iter_mut().zip(lookups) {
            let addresses = nameserver_addresses(&lookup);
            if let NameserverAddresses::LookupFailed(reason) = &addresses {
                log::warn!("[Aggregator] Could not resolve nameserver {}: {reason}", record.data);
            }
            record.nameserver = Some(addresses);
        }
    }

    /// `None` when the overall timeout is too large to represent.
    fn deadline(&self) -> Option<Instant> {
        Instant::now().checked_add(self.options.overall_timeout)
    }

    /// Returns one result per resolver for each query, in resolver order.
    async fn fan_out(
        &self,
        queries: &[(String, RecordType)],
        deadline: Option<Instant>,
    ) -> Vec<Vec<ProviderResult>> {
        let resolver_count = self.resolvers.len();
        let mut slots: Vec<Vec<Option<ProviderResult>>> =
            vec![vec![None; resolver_count]; queries.len()];

        let query_timeout = self.options.query_timeout;
        let mut pending: FuturesUnordered<_> = queries
            .iter()
            .enumerate()
            .flat_map(move |(qi, (name, record_type))| {
                self.resolvers.iter().enumerate().map(move |(ri, resolver)| {
                    let resolver = Arc::clone(resolver);
                    let name = name.clone();
                    let record_type = *record_type;
                    async move {
                        let result =
                            match tokio::time::timeout(query_timeout, resolver.fetch(&name, record_type))
                                .await
                            {
                                Ok(result) => result,
                                Err(_) => {
                                    log::warn!(
                                        "[Aggregator] [{}] {name} {record_type} timed out after {}ms",
                                        resolver.name(),
                                        query_timeout.as_millis()
                                    );
                                    timed_out(resolver.name(), record_type, query_timeout)
                                }
                            };
                        (qi, ri, result)
                    }
                })
            })
            .collect();

        let deadline = match deadline {
            Some(at) => tokio::time::sleep_until(at),
            None => tokio::time::sleep(Duration::MAX),
        };
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                next = pending.next() => match next {
                    Some((qi, ri, result)) => slots[qi][ri] = Some(result),
                    None => break,
                },
                () = &mut deadline => {
                    log::warn!(
                        "[Aggregator] Overall timeout after {}ms, {} query(ies) unsettled",
                        self.options.overall_timeout.as_millis(),
                        pending.len()
                    );
                    break;
                }
            }
        }
        drop(pending);

        slots
            .into_iter()
            .zip(queries)
            .map(|(row, (_, record_type))| {
                row.into_iter()
                    .zip(&self.resolvers)
                    .map(|(slot, resolver)| {
                        slot.unwrap_or_else(|| {
                            timed_out(resolver.name(), *record_type, self.options.overall_timeout)
                        })
                    })
                    .collect()
            })
            .collect()
    }

    fn rejected_snapshot(&self, domain: &str, types: &[RecordType], reason: &str) -> DnsSnapshot {
        let mut snapshot = DnsSnapshot::empty(domain.trim());
        for &record_type in types {
            snapshot.records.insert(record_type, Vec::new());
            snapshot.status.insert(record_type, self.rejected_status(reason));
        }
        snapshot
    }

    fn rejected_status(&self, reason: &str) -> TypeStatus {
        TypeStatus {
            queried: self.resolvers.len(),
            succeeded: 0,
            failed: self.resolvers.len(),
            authenticated_data: false,
            errors: vec![format!("invalid domain: {reason}")],
        }
    }
}

fn timed_out(provider: &str, record_type: RecordType, after: Duration) -> ProviderResult {
    ProviderResult::failed(
        provider,
        record_type,
        ProviderError::Timeout {
            provider: provider.to_string(),
            detail: format!("no answer within {}ms", after.as_millis()),
        },
    )
}

/// Fold one type's results, in resolver order, into deduplicated records.
///
/// Key is the canonical payload; the first resolver to return it owns `ttl`,
/// `name` and `data`, later ones are appended to `sources`.
fn merge(results: &[ProviderResult]) -> (Vec<AggregatedRecord>, TypeStatus) {
    let mut records: Vec<AggregatedRecord> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut status = TypeStatus {
        queried: results.len(),
        ..TypeStatus::default()
    };

    for result in results {
        match &result.outcome {
            ProviderOutcome::Answered {
                answers,
                authenticated_data,
            } => {
                status.succeeded += 1;
                status.authenticated_data |= *authenticated_data;
                for answer in answers {
                    let key = canonicalize(&answer.data);
                    if let Some(&i) = index.get(key) {
                        if records[i].add_source(&result.provider) {
                            log::trace!("[Aggregator] {key}: also from {}", result.provider);
                        }
                    } else {
                        index.insert(key.to_string(), records.len());
                        records.push(AggregatedRecord::from_answer(answer, &result.provider));
                    }
                }
            }
            ProviderOutcome::Failed { error } => {
                status.failed += 1;
                status.errors.push(error.to_string());
            }
        }
    }

    (records, status)
}

fn nameserver_addresses(lookup: &NameLookup) -> NameserverAddresses {
    if lookup.status.all_failed() {
        let reason = if lookup.status.errors.is_empty() {
            "no resolver answered".to_string()
        } else {
            lookup.status.errors.join("; ")
        };
        NameserverAddresses::LookupFailed(reason)
    } else if lookup.records.is_empty() {
        NameserverAddresses::NotFound
    } else {
        NameserverAddresses::Resolved(lookup.records.iter().map(|r| r.data.clone()).collect())
    }
}
