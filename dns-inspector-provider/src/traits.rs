use async_trait::async_trait;

use crate::error::{ProviderError, Result};
use crate::types::{AnswerSet, ProviderResult, RecordType, ResolverMetadata};
use crate::validation::validate_domain;

/// 原始解析器错误（内部使用）
#[derive(Debug, Clone)]
pub(crate) struct RawApiError {
    /// 错误码：HTTP 状态码或 DNS RCODE（取决于 `ErrorContext::stage`）
    pub code: Option<u32>,
    /// 原始错误消息（响应体或 `Comment` 字段）
    pub message: Option<String>,
}

impl RawApiError {
    pub fn with_code(code: u32, message: Option<String>) -> Self {
        Self { code: Some(code), message }
    }
}

/// 错误发生的阶段
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum ErrorStage {
    /// HTTP 层：非 2xx 状态码
    #[default]
    Http,
    /// DNS 层：JSON 中的 `Status` 字段
    Dns,
}

/// 错误上下文信息（内部使用）
/// 用于在映射错误时提供额外信息
#[derive(Debug, Clone, Default)]
pub(crate) struct ErrorContext {
    /// 查询的域名
    pub domain: Option<String>,
    /// 查询的记录类型
    pub record_type: Option<RecordType>,
    /// 错误阶段
    pub stage: ErrorStage,
}

/// Resolver 错误映射 Trait（内部使用）
/// 各 Resolver 实现此 trait 以将原始 HTTP/DNS 错误映射到统一错误类型
pub(crate) trait ProviderErrorMapper {
    /// 返回 Resolver 名称（即记录来源名）
    fn provider_name(&self) -> &'static str;

    /// 将原始错误映射到统一错误类型
    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError;

    /// 快捷方法：解析错误
    fn parse_error(&self, detail: impl ToString) -> ProviderError {
        ProviderError::ParseError {
            provider: self.provider_name().to_string(),
            detail: detail.to_string(),
        }
    }

    /// 快捷方法：通用映射（fallback），各 Resolver 处理完特有情况后调用
    fn default_mapping(&self, raw: RawApiError, context: &ErrorContext) -> ProviderError {
        let provider = self.provider_name().to_string();
        match (context.stage, raw.code) {
            (ErrorStage::Http, Some(429)) => ProviderError::RateLimited {
                provider,
                retry_after: None,
                raw_message: raw.message,
            },
            (ErrorStage::Http, Some(status)) => ProviderError::HttpStatus {
                provider,
                status: u16::try_from(status).unwrap_or(u16::MAX),
                raw_message: raw.message,
            },
            (ErrorStage::Dns, Some(rcode)) => ProviderError::ResolverStatus {
                provider,
                rcode,
                detail: raw.message,
            },
            (_, None) => self.parse_error(
                raw.message
                    .unwrap_or_else(|| "missing status code".to_string()),
            ),
        }
    }
}

/// DNS-over-HTTPS resolver trait.
///
/// Implementors only provide [`query`](Self::query); [`fetch`](Self::fetch) wraps it with
/// domain validation and converts every failure into a [`ProviderResult`] value.
#[async_trait]
pub trait DohResolver: Send + Sync {
    /// Resolver identifier (`"google"`, `"cloudflare"`, ...).
    fn id(&self) -> &'static str;

    /// Source name attached to aggregated records (`"Google"`, `"Cloudflare"`, ...).
    fn name(&self) -> &str;

    /// Endpoint the resolver sends queries to.
    fn endpoint(&self) -> &str;

    /// 获取 Resolver 元数据（类型级别）
    ///
    /// 此方法不需要实例，可以在创建 Resolver 之前调用。
    fn metadata() -> ResolverMetadata
    where
        Self: Sized;

    /// Issue exactly one DoH query for an already-validated name.
    ///
    /// Returns only answers whose type equals `record_type`. A response without an
    /// `Answer` section is an empty success.
    async fn query(&self, domain: &str, record_type: RecordType) -> Result<AnswerSet>;

    /// Validate `domain`, query once and wrap the outcome.
    ///
    /// Never returns an error: failures become [`ProviderOutcome::Failed`](crate::ProviderOutcome::Failed).
    /// An invalid domain fails without any network call.
    async fn fetch(&self, domain: &str, record_type: RecordType) -> ProviderResult {
        let name = match validate_domain(domain) {
            Ok(name) => name,
            Err(e) => {
                log::warn!("[{}] Rejected query for '{domain}': {e}", self.name());
                return ProviderResult::failed(
                    self.name(),
                    record_type,
                    ProviderError::InvalidDomain {
                        provider: self.name().to_string(),
                        domain: domain.to_string(),
                        reason: e.to_string(),
                    },
                );
            }
        };

        match self.query(&name, record_type).await {
            Ok(set) => {
                log::debug!(
                    "[{}] {name} {record_type}: {} answer(s), AD={}",
                    self.name(),
                    set.answers.len(),
                    set.authenticated_data
                );
                ProviderResult::answered(self.name(), record_type, set)
            }
            Err(e) => {
                if e.is_expected() {
                    log::warn!("{e}");
                } else {
                    log::error!("{e}");
                }
                ProviderResult::failed(self.name(), record_type, e)
            }
        }
    }
}

impl std::fmt::Debug for dyn DohResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DohResolver")
            .field("id", &self.id())
            .field("name", &self.name())
            .field("endpoint", &self.endpoint())
            .finish()
    }
}
