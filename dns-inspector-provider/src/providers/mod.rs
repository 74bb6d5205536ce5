//! DoH resolver implementations

/// Shared utilities used by resolver implementations.
pub mod common;

#[cfg(feature = "adguard")]
mod adguard;
#[cfg(feature = "cloudflare")]
mod cloudflare;
#[cfg(feature = "google")]
mod google;
#[cfg(feature = "quad9")]
mod quad9;

#[cfg(feature = "adguard")]
pub use adguard::AdguardResolver;
#[cfg(feature = "cloudflare")]
pub use cloudflare::CloudflareResolver;
#[cfg(feature = "google")]
pub use google::GoogleResolver;
#[cfg(feature = "quad9")]
pub use quad9::Quad9Resolver;
