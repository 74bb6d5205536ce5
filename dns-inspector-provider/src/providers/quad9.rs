//! Quad9 resolver
//!
//! The JSON interface lives on port 5053. Quad9 answers NXDOMAIN for names on its
//! threat-intelligence blocklist, which surfaces here as an empty success.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{ProviderError, Result};
use crate::providers::common::{DNS_JSON, bad_request, create_http_client, doh_query};
use crate::traits::{DohResolver, ErrorContext, ErrorStage, ProviderErrorMapper, RawApiError};
use crate::types::{AnswerSet, RecordType, ResolverKind, ResolverMetadata};

pub(crate) const QUAD9_DOH_ENDPOINT: &str = "https://dns.quad9.net:5053/dns-query";

/// Quad9 DoH resolver.
pub struct Quad9Resolver {
    pub(crate) client: Client,
    pub(crate) endpoint: String,
}

impl Quad9Resolver {
    pub fn new() -> Self {
        Self::with_endpoint(QUAD9_DOH_ENDPOINT)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            client: create_http_client(),
            endpoint: endpoint.into(),
        }
    }
}

impl Default for Quad9Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderErrorMapper for Quad9Resolver {
    fn provider_name(&self) -> &'static str {
        "Quad9"
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError {
        if context.stage == ErrorStage::Http && raw.code == Some(400) {
            return bad_request(self.provider_name(), &context, raw.message);
        }
        self.default_mapping(raw, &context)
    }
}

#[async_trait]
impl DohResolver for Quad9Resolver {
    fn id(&self) -> &'static str {
        "quad9"
    }

    fn name(&self) -> &str {
        self.provider_name()
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn metadata() -> ResolverMetadata {
        ResolverMetadata {
            id: ResolverKind::Quad9,
            name: "Quad9".to_string(),
            description: "Quad9 threat-blocking resolver (JSON on port 5053)".to_string(),
            default_endpoint: QUAD9_DOH_ENDPOINT.to_string(),
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
