//! Resolver 公共工具函数

use std::time::Duration;

use reqwest::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{ProviderError, Result};
use crate::http_client::HttpUtils;
use crate::traits::{ErrorContext, ErrorStage, ProviderErrorMapper, RawApiError};
use crate::types::{AnswerSet, RawAnswer, RecordType};
use crate::utils::log_sanitizer::truncate_record_data;

// ============ HTTP Client ============

/// 默认连接超时（秒）
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
/// 默认请求超时（秒）
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// DoH JSON 媒体类型
pub(crate) const DNS_JSON: &str = "application/dns-json";

/// 创建带超时配置的 HTTP Client
pub fn create_http_client() -> Client {
    Client::builder()
        .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
        .build()
        .unwrap_or_else(|e| {
            log::warn!("Failed to build configured HTTP client, using defaults: {e}");
            Client::new()
        })
}

// ============ DoH JSON 类型 ============

/// DNS JSON API 响应（Google / Cloudflare / Quad9 / AdGuard 通用格式）
#[derive(Debug, Deserialize)]
pub(crate) struct DohResponse {
    #[serde(rename = "Status")]
    pub status: u32,
    #[serde(rename = "AD", default)]
    pub authenticated_data: bool,
    #[serde(rename = "Answer", default)]
    pub answer: Vec<DohAnswer>,
    /// Google 返回字符串，部分解析器返回字符串数组
    #[serde(rename = "Comment", default)]
    pub comment: Option<Value>,
}

impl DohResponse {
    pub fn comment_text(&self) -> Option<String> {
        match self.comment.as_ref()? {
            Value::String(s) => Some(s.clone()),
            Value::Array(items) => Some(
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
            other => Some(other.to_string()),
        }
    }
}

/// `Answer` 数组中的单条记录
#[derive(Debug, Deserialize)]
pub(crate) struct DohAnswer {
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: u16,
    #[serde(rename = "TTL", default)]
    pub ttl: u32,
    pub data: String,
}

/// NOERROR
const RCODE_NOERROR: u32 = 0;
/// NXDOMAIN：名称不存在，视为“无记录”的成功结果
const RCODE_NXDOMAIN: u32 = 3;

// ============ 查询流程 ============

/// 执行一次 DoH JSON 查询
///
/// `GET <endpoint>?name=<domain>&type=<TYPE>`，可选 `Accept` 头。
/// 只保留与查询类型相同的答案（CNAME 链、RRSIG 等被丢弃）。
pub(crate) async fn doh_query<M: ProviderErrorMapper>(
    mapper: &M,
    client: &Client,
    endpoint: &str,
    accept: Option<&str>,
    domain: &str,
    record_type: RecordType,
) -> Result<AnswerSet> {
    let provider = mapper.provider_name();

    let mut request = client
        .get(endpoint)
        .query(&[("name", domain), ("type", record_type.as_str())]);
    if let Some(accept) = accept {
        request = request.header(ACCEPT, accept);
    }

    let target = format!("{endpoint}?name={domain}&type={record_type}");
    let (status, body) = HttpUtils::execute_request(request, provider, "GET", &target).await?;

    let context = ErrorContext {
        domain: Some(domain.to_string()),
        record_type: Some(record_type),
        ..ErrorContext::default()
    };

    if !HttpUtils::is_success(status) {
        let message = (!body.is_empty()).then_some(body);
        return Err(mapper.map_error(
            RawApiError::with_code(u32::from(status), message),
            ErrorContext {
                stage: ErrorStage::Http,
                ..context
            },
        ));
    }

    let response: DohResponse = HttpUtils::parse_json(&body, provider)?;

    if !matches!(response.status, RCODE_NOERROR | RCODE_NXDOMAIN) {
        return Err(mapper.map_error(
            RawApiError::with_code(response.status, response.comment_text()),
            ErrorContext {
                stage: ErrorStage::Dns,
                ..context
            },
        ));
    }

    let wanted = record_type.code();
    let answers: Vec<RawAnswer> = response
        .answer
        .into_iter()
        .filter(|a| a.record_type == wanted)
        .map(|a| {
            log::trace!(
                "[{provider}] {} {record_type} {} ttl={}",
                a.name,
                truncate_record_data(&a.data),
                a.ttl
            );
            RawAnswer {
                name: a.name,
                record_type,
                data: a.data,
                ttl: a.ttl,
            }
        })
        .collect();

    Ok(AnswerSet {
        answers,
        authenticated_data: response.authenticated_data,
    })
}

/// 将 HTTP 400 响应映射为参数错误（名称或类型被解析器拒绝）
pub(crate) fn bad_request(
    provider: &str,
    context: &ErrorContext,
    message: Option<String>,
) -> ProviderError {
    let subject = context.domain.as_deref().unwrap_or("query");
    let detail = match (message, context.record_type) {
        (Some(msg), _) => msg,
        (None, Some(rt)) => format!("resolver rejected {subject} {rt}"),
        (None, None) => format!("resolver rejected {subject}"),
    };
    ProviderError::InvalidParameter {
        provider: provider.to_string(),
        param: "name".to_string(),
        detail,
    }
}
