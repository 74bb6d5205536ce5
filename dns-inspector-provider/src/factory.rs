//! Resolver factory functions and metadata.

use std::sync::Arc;

use crate::error::{ProviderError, Result};
use crate::traits::DohResolver;
use crate::types::{ResolverConfig, ResolverKind, ResolverMetadata};

#[cfg(feature = "adguard")]
use crate::providers::AdguardResolver;
#[cfg(feature = "cloudflare")]
use crate::providers::CloudflareResolver;
#[cfg(feature = "google")]
use crate::providers::GoogleResolver;
#[cfg(feature = "quad9")]
use crate::providers::Quad9Resolver;

/// Creates a [`DohResolver`] instance from the given configuration.
///
/// The concrete resolver type is determined by [`ResolverConfig::kind`]; an optional
/// endpoint override must be an absolute `http` or `https` URL. The returned resolver is
/// wrapped in `Arc<dyn DohResolver>` for easy sharing across async tasks.
///
/// # Examples
///
/// ```rust,no_run
/// use dns_inspector_provider::{create_resolver, ResolverConfig, ResolverKind};
///
/// let resolver = create_resolver(ResolverConfig::new(ResolverKind::Cloudflare)).unwrap();
/// ```
pub fn create_resolver(config: ResolverConfig) -> Result<Arc<dyn DohResolver>> {
    if let Some(endpoint) = &config.endpoint {
        check_endpoint(config.kind, endpoint)?;
    }

    let endpoint = config.endpoint;
    match config.kind {
        #[cfg(feature = "google")]
        ResolverKind::Google => Ok(Arc::new(
            endpoint.map_or_else(GoogleResolver::new, GoogleResolver::with_endpoint),
        )),
        #[cfg(feature = "cloudflare")]
        ResolverKind::Cloudflare => Ok(Arc::new(
            endpoint.map_or_else(CloudflareResolver::new, CloudflareResolver::with_endpoint),
        )),
        #[cfg(feature = "quad9")]
        ResolverKind::Quad9 => Ok(Arc::new(
            endpoint.map_or_else(Quad9Resolver::new, Quad9Resolver::with_endpoint),
        )),
        #[cfg(feature = "adguard")]
        ResolverKind::Adguard => Ok(Arc::new(
            endpoint.map_or_else(AdguardResolver::new, AdguardResolver::with_endpoint),
        )),
    }
}

/// Reject endpoint overrides that are not absolute `http`/`https` URLs.
pub fn check_endpoint(kind: ResolverKind, endpoint: &str) -> Result<()> {
    let invalid = |detail: String| ProviderError::InvalidParameter {
        provider: kind.to_string(),
        param: "endpoint".to_string(),
        detail,
    };

    let url = url::Url::parse(endpoint).map_err(|e| invalid(format!("{endpoint}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!(
            "unsupported scheme '{}' in {endpoint}",
            url.scheme()
        )));
    }
    if url.host_str().is_none() {
        return Err(invalid(format!("missing host in {endpoint}")));
    }
    Ok(())
}

/// The resolver set used when no configuration is given: Google, then Cloudflare.
///
/// Order matters: the aggregator keeps first-seen values in provider order.
pub fn default_resolvers() -> Vec<Arc<dyn DohResolver>> {
    vec![
        #[cfg(feature = "google")]
        Arc::new(GoogleResolver::new()),
        #[cfg(feature = "cloudflare")]
        Arc::new(CloudflareResolver::new()),
    ]
}

/// The [`ResolverConfig`] equivalent of [`default_resolvers`].
pub fn default_resolver_configs() -> Vec<ResolverConfig> {
    vec![
        #[cfg(feature = "google")]
        ResolverConfig::new(ResolverKind::Google),
        #[cfg(feature = "cloudflare")]
        ResolverConfig::new(ResolverKind::Cloudflare),
    ]
}

/// Returns metadata for all resolvers enabled via feature flags.
pub fn get_all_resolver_metadata() -> Vec<ResolverMetadata> {
    vec![
        #[cfg(feature = "google")]
        GoogleResolver::metadata(),
        #[cfg(feature = "cloudflare")]
        CloudflareResolver::metadata(),
        #[cfg(feature = "quad9")]
        Quad9Resolver::metadata(),
        #[cfg(feature = "adguard")]
        AdguardResolver::metadata(),
    ]
}
