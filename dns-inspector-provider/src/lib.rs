//! # dns-inspector-provider
//!
//! DNS-over-HTTPS resolver clients behind a single query trait.
//!
//! ## Supported Resolvers
//!
//! | Resolver | Feature Flag | Endpoint | `Accept` |
//! |----------|-------------|----------|----------|
//! | [Google Public DNS](https://developers.google.com/speed/public-dns) | `google` | `https://dns.google/resolve` |: |
//! | [Cloudflare 1.1.1.1](https://one.one.one.one/) | `cloudflare` | `https://cloudflare-dns.com/dns-query` | `application/dns-json` |
//! | [Quad9](https://quad9.net/) | `quad9` | `https://dns.quad9.net:5053/dns-query` | `application/dns-json` |
//! | [AdGuard DNS](https://adguard-dns.io/) | `adguard` | `https://dns.adguard-dns.com/resolve` | `application/dns-json` |
//!
//! ## Feature Flags
//!
//! ### Resolver Selection
//!
//! - **`all-providers`** *(default)*: Enable all resolvers listed above.
//! - **`google`**, **`cloudflare`**, **`quad9`**, **`adguard`**: Enable a single resolver.
//!
//! ### TLS Backend
//!
//! - **`native-tls`** *(default)*: Use the platform's native TLS implementation.
//! - **`rustls`**: Use rustls. Recommended for cross-compilation targets.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dns_inspector_provider::{create_resolver, RecordType, ResolverConfig, ResolverKind};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let resolver = create_resolver(ResolverConfig::new(ResolverKind::Cloudflare))?;
//!
//!     // `fetch` never fails: errors come back inside the result
//!     let result = resolver.fetch("example.com", RecordType::Mx).await;
//!     for answer in result.answers() {
//!         println!("{} {} -> {}", answer.name, answer.record_type, answer.data);
//!     }
//!     if let Some(error) = result.error() {
//!         eprintln!("{error}");
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! [`DohResolver::query`] returns [`Result<AnswerSet, ProviderError>`](ProviderError);
//! [`DohResolver::fetch`] folds that into a [`ProviderResult`] value:
//!
//! - [`ProviderError::InvalidDomain`]: the name failed [`validate_domain`]; nothing was sent
//! - [`ProviderError::HttpStatus`]: non-2xx response
//! - [`ProviderError::ResolverStatus`]: SERVFAIL, REFUSED or another non-success RCODE
//! - [`ProviderError::ParseError`]: the body was not DNS JSON
//! - [`ProviderError::NetworkError`] / [`ProviderError::Timeout`]: transport failure
//!
//! NXDOMAIN and a missing `Answer` section are successes with no answers.
//! Nothing is retried.

mod error;
mod factory;
mod http_client;
mod providers;
mod traits;
mod types;
mod utils;
mod validation;

// Re-export error types
pub use error::{ProviderError, Result};

// Re-export factory functions
pub use factory::{
    check_endpoint, create_resolver, default_resolver_configs, default_resolvers,
    get_all_resolver_metadata,
};

// Re-export core trait only (internal traits are not exported)
pub use traits::DohResolver;

// Re-export types
pub use types::{
    AnswerSet, ProviderOutcome, ProviderResult, RawAnswer, RecordType, ResolverConfig,
    ResolverKind, ResolverMetadata,
};

// Re-export validation
pub use validation::{DomainValidationError, MAX_DOMAIN_LEN, MAX_LABEL_LEN, validate_domain};

// Re-export concrete resolvers (behind feature flags)
#[cfg(feature = "google")]
pub use providers::GoogleResolver;

#[cfg(feature = "cloudflare")]
pub use providers::CloudflareResolver;

#[cfg(feature = "quad9")]
pub use providers::Quad9Resolver;

#[cfg(feature = "adguard")]
pub use providers::AdguardResolver;
