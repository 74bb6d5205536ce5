//! AdGuard DNS resolver
//!
//! Blocked ad/tracker names resolve to `0.0.0.0` / `::` instead of failing; those
//! answers are passed through unchanged.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{ProviderError, Result};
use crate::providers::common::{DNS_JSON, create_http_client, doh_query};
use crate::traits::{DohResolver, ErrorContext, ProviderErrorMapper, RawApiError};
use crate::types::{AnswerSet, RecordType, ResolverKind, ResolverMetadata};

pub(crate) const ADGUARD_DOH_ENDPOINT: &str = "https://dns.adguard-dns.com/resolve";

/// AdGuard DoH resolver.
pub struct AdguardResolver {
    pub(crate) client: Client,
    pub(crate) endpoint: String,
}

impl AdguardResolver {
    pub fn new() -> Self {
        Self::with_endpoint(ADGUARD_DOH_ENDPOINT)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            client: create_http_client(),
            endpoint: endpoint.into(),
        }
    }
}

impl Default for AdguardResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderErrorMapper for AdguardResolver {
    fn provider_name(&self) -> &'static str {
        "AdGuard"
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError {
        self.default_mapping(raw, &context)
    }
}

#[async_trait]
impl DohResolver for AdguardResolver {
    fn id(&self) -> &'static str {
        "adguard"
    }

    fn name(&self) -> &str {
        self.provider_name()
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn metadata() -> ResolverMetadata {
        ResolverMetadata {
            id: ResolverKind::Adguard,
            name: "AdGuard".to_string(),
            description: "AdGuard DNS (ad and tracker blocking)".to_string(),
            default_endpoint: ADGUARD_DOH_ENDPOINT.to_string(),
            accept: Some(DNS_JSON.to_string()),
        }
    }

    async fn query(&self, domain: &str, record_type: RecordType) -> Result<AnswerSet> {
        doh_query(
            self,
            &self.client,
            &self.endpoint,
            Some(DNS_JSON),
            domain,
            record_type,
        )
        .await
    }
}
