//! Cloudflare 1.1.1.1 resolver
//!
//! <https://developers.cloudflare.com/1.1.1.1/encryption/dns-over-https/make-api-requests/dns-json/>

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{ProviderError, Result};
use crate::providers::common::{DNS_JSON, bad_request, create_http_client, doh_query};
use crate::traits::{DohResolver, ErrorContext, ErrorStage, ProviderErrorMapper, RawApiError};
use crate::types::{AnswerSet, RecordType, ResolverKind, ResolverMetadata};

pub(crate) const CLOUDFLARE_DOH_ENDPOINT: &str = "https://cloudflare-dns.com/dns-query";

/// Cloudflare DoH resolver.
pub struct CloudflareResolver {
    pub(crate) client: Client,
    pub(crate) endpoint: String,
}

impl CloudflareResolver {
    pub fn new() -> Self {
        Self::with_endpoint(CLOUDFLARE_DOH_ENDPOINT)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            client: create_http_client(),
            endpoint: endpoint.into(),
        }
    }
}

impl Default for CloudflareResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloudflare error mapping
/// - 400: malformed name/type
/// - 415: request sent without `Accept: application/dns-json`
impl ProviderErrorMapper for CloudflareResolver {
    fn provider_name(&self) -> &'static str {
        "Cloudflare"
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError {
        match (context.stage, raw.code) {
            (ErrorStage::Http, Some(400)) => {
                bad_request(self.provider_name(), &context, raw.message)
            }
            (ErrorStage::Http, Some(415)) => ProviderError::InvalidParameter {
                provider: self.provider_name().to_string(),
                param: "accept".to_string(),
                detail: format!("endpoint requires Accept: {DNS_JSON}"),
            },
            _ => self.default_mapping(raw, &context),
        }
    }
}

#[async_trait]
impl DohResolver for CloudflareResolver {
    fn id(&self) -> &'static str {
        "cloudflare"
    }

    fn name(&self) -> &str {
        self.provider_name()
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn metadata() -> ResolverMetadata {
        ResolverMetadata {
            id: ResolverKind::Cloudflare,
            name: "Cloudflare".to_string(),
            description: "Cloudflare 1.1.1.1 DNS over HTTPS".to_string(),
            default_endpoint: CLOUDFLARE_DOH_ENDPOINT.to_string(),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_unsupported_media_type() {
        let resolver = CloudflareResolver::new();
        let err = resolver.map_error(RawApiError::with_code(415, None), ErrorContext::default());
        assert!(matches!(
            err,
            ProviderError::InvalidParameter { ref param, .. } if param == "accept"
        ));
    }

    #[test]
    fn maps_refused() {
        let resolver = CloudflareResolver::new();
        let err = resolver.map_error(
            RawApiError::with_code(5, None),
            ErrorContext {
                stage: ErrorStage::Dns,
                ..ErrorContext::default()
            },
        );
        assert!(matches!(err, ProviderError::ResolverStatus { rcode: 5, .. }));
    }

    #[test]
    fn maps_too_many_requests() {
        let resolver = CloudflareResolver::new();
        let err = resolver.map_error(RawApiError::with_code(429, None), ErrorContext::default());
        assert!(matches!(err, ProviderError::RateLimited { .. }));
    }
}
