use serde::{Deserialize, Serialize};

/// Unified error type for all DoH resolver operations.
///
/// Each variant includes a `provider` field identifying which resolver produced the error,
/// plus variant-specific context. All variants are serializable so failures can travel
/// inside [`ProviderResult`](crate::ProviderResult) values and cached snapshots.
///
/// # Transient Errors
///
/// The following variants represent transient failures:
/// - [`NetworkError`](Self::NetworkError): network connectivity issues
/// - [`Timeout`](Self::Timeout): request timed out
/// - [`RateLimited`](Self::RateLimited): resolver rate limit exceeded
///
/// Queries are never retried automatically; a transient failure simply means the
/// resolver contributes no answers for that record type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum ProviderError {
    /// A network-level error occurred (DNS resolution failure, connection refused, etc.).
    NetworkError {
        /// Resolver that produced the error.
        provider: String,
        /// Error details.
        detail: String,
    },

    /// The HTTP request timed out, either inside the HTTP client or at the
    /// aggregator's per-call deadline.
    Timeout {
        /// Resolver that produced the error.
        provider: String,
        /// Error details.
        detail: String,
    },

    /// The resolver rate limit has been exceeded (HTTP 429).
    RateLimited {
        /// Resolver that produced the error.
        provider: String,
        /// Suggested wait time in seconds, if the resolver sent `Retry-After`.
        retry_after: Option<u64>,
        /// Response body, if any.
        raw_message: Option<String>,
    },

    /// The resolver answered with a non-2xx HTTP status.
    HttpStatus {
        /// Resolver that produced the error.
        provider: String,
        /// HTTP status code.
        status: u16,
        /// Response body, if any.
        raw_message: Option<String>,
    },

    /// The resolver answered with a DNS response code other than NOERROR or NXDOMAIN
    /// (SERVFAIL, REFUSED, ...).
    ResolverStatus {
        /// Resolver that produced the error.
        provider: String,
        /// DNS RCODE from the `Status` field.
        rcode: u32,
        /// Resolver comment, if any.
        detail: Option<String>,
    },

    /// Failed to parse the resolver's JSON response.
    ParseError {
        /// Resolver that produced the error.
        provider: String,
        /// Details about the parse failure.
        detail: String,
    },

    /// The queried name is not a plausible DNS name. No request was issued.
    InvalidDomain {
        /// Resolver that rejected the input.
        provider: String,
        /// The rejected input.
        domain: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A construction parameter is invalid (e.g. a malformed endpoint URL).
    InvalidParameter {
        /// Resolver that produced the error.
        provider: String,
        /// Name of the invalid parameter.
        param: String,
        /// Description of what's wrong.
        detail: String,
    },
}

impl ProviderError {
    /// 是否为预期行为（用户输入、解析器拒绝等），用于日志分级。
    ///
    /// 返回 `true` 时应使用 `warn` 级别，`false` 时使用 `error` 级别。
    /// **新增变体时请同步更新此方法。**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::InvalidDomain { .. }
                | Self::InvalidParameter { .. }
                | Self::ResolverStatus { .. }
                | Self::RateLimited { .. }
        )
    }

    /// Name of the resolver that produced the error.
    pub fn provider(&self) -> &str {
        match self {
            Self::NetworkError { provider, .. }
            | Self::Timeout { provider, .. }
            | Self::RateLimited { provider, .. }
            | Self::HttpStatus { provider, .. }
            | Self::ResolverStatus { provider, .. }
            | Self::ParseError { provider, .. }
            | Self::InvalidDomain { provider, .. }
            | Self::InvalidParameter { provider, .. } => provider,
        }
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NetworkError { provider, detail } => {
                write!(f, "[{provider}] Network error: {detail}")
            }
            Self::Timeout { provider, detail } => {
                write!(f, "[{provider}] Request timeout: {detail}")
            }
            Self::RateLimited {
                provider,
                retry_after,
                ..
            } => {
                if let Some(secs) = retry_after {
                    write!(f, "[{provider}] Rate limited (retry after {secs}s)")
                } else {
                    write!(f, "[{provider}] Rate limited")
                }
            }
            Self::HttpStatus {
                provider, status, ..
            } => {
                write!(f, "[{provider}] HTTP {status}")
            }
            Self::ResolverStatus {
                provider,
                rcode,
                detail,
            } => {
                let name = rcode_name(*rcode);
                if let Some(msg) = detail {
                    write!(f, "[{provider}] Resolver returned {name}: {msg}")
                } else {
                    write!(f, "[{provider}] Resolver returned {name}")
                }
            }
            Self::ParseError { provider, detail } => {
                write!(f, "[{provider}] Parse error: {detail}")
            }
            Self::InvalidDomain {
                provider,
                domain,
                reason,
            } => {
                write!(f, "[{provider}] Invalid domain '{domain}': {reason}")
            }
            Self::InvalidParameter {
                provider,
                param,
                detail,
            } => {
                write!(f, "[{provider}] Invalid parameter '{param}': {detail}")
            }
        }
    }
}

impl std::error::Error for ProviderError {}

/// Mnemonic for a DNS RCODE.
pub(crate) fn rcode_name(rcode: u32) -> String {
    match rcode {
        0 => "NOERROR".to_string(),
        1 => "FORMERR".to_string(),
        2 => "SERVFAIL".to_string(),
        3 => "NXDOMAIN".to_string(),
        4 => "NOTIMP".to_string(),
        5 => "REFUSED".to_string(),
        other => format!("RCODE {other}"),
    }
}

/// Convenience type alias for `Result<T, ProviderError>`.
pub type Result<T> = std::result::Result<T, ProviderError>;
