//! Google Public DNS resolver (JSON API)
//!
//! <https://developers.google.com/speed/public-dns/docs/doh/json>

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{ProviderError, Result};
use crate::providers::common::{bad_request, create_http_client, doh_query};
use crate::traits::{DohResolver, ErrorContext, ErrorStage, ProviderErrorMapper, RawApiError};
use crate::types::{AnswerSet, RecordType, ResolverKind, ResolverMetadata};

pub(crate) const GOOGLE_DOH_ENDPOINT: &str = "https://dns.google/resolve";

/// Google Public DNS resolver.
///
/// The JSON API does not need an `Accept` header.
pub struct GoogleResolver {
    pub(crate) client: Client,
    pub(crate) endpoint: String,
}

impl GoogleResolver {
    pub fn new() -> Self {
        Self::with_endpoint(GOOGLE_DOH_ENDPOINT)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            client: create_http_client(),
            endpoint: endpoint.into(),
        }
    }
}

impl Default for GoogleResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Google error mapping
///
/// HTTP 400 carries `{"error": "..."}` for names or types the API refuses.
impl ProviderErrorMapper for GoogleResolver {
    fn provider_name(&self) -> &'static str {
        "Google"
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError {
        if context.stage == ErrorStage::Http && raw.code == Some(400) {
            let message = raw.message.as_deref().and_then(|body| {
                serde_json::from_str::<serde_json::Value>(body)
                    .ok()?
                    .get("error")?
                    .as_str()
                    .map(str::to_string)
            });
            return bad_request(self.provider_name(), &context, message.or(raw.message));
        }
        self.default_mapping(raw, &context)
    }
}

#[async_trait]
impl DohResolver for GoogleResolver {
    fn id(&self) -> &'static str {
        "google"
    }

    fn name(&self) -> &str {
        self.provider_name()
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn metadata() -> ResolverMetadata {
        ResolverMetadata {
            id: ResolverKind::Google,
            name: "Google".to_string(),
            description: "Google Public DNS JSON API".to_string(),
            default_endpoint: GOOGLE_DOH_ENDPOINT.to_string(),
            accept: None,
        }
    }

    async fn query(&self, domain: &str, record_type: RecordType) -> Result<AnswerSet> {
        doh_query(self, &self.client, &self.endpoint, None, domain, record_type).await
    }
}
