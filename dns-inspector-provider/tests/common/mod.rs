//! 共享测试工具和辅助函数

#![allow(dead_code)]

use serde_json::{Value, json};
use wiremock::MockServer;

/// 断言 `Option` 为 `Some`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_some {
    ($expr:expr $(,)?) => {{
        let opt = $expr;
        assert!(opt.is_some(), "expected Some(..), got None");
        let Some(val) = opt else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let opt = $expr;
        assert!(opt.is_some(), "{}", format_args!($($msg)+));
        let Some(val) = opt else {
            return;
        };
        val
    }};
}

/// 断言 `Result` 为 `Ok`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_ok {
    ($expr:expr $(,)?) => {{
        let res = $expr;
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(val) = res else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let res = $expr;
        assert!(
            res.is_ok(),
            "{}: {res:?}",
            format_args!($($msg)+)
        );
        let Ok(val) = res else {
            return;
        };
        val
    }};
}

/// 构造一个 DNS JSON 响应体
///
/// `answers` 为 `(name, type code, ttl, data)`
pub fn doh_body(status: u32, ad: bool, answers: &[(&str, u16, u32, &str)]) -> Value {
    let answer: Vec<Value> = answers
        .iter()
        .map(|(name, rtype, ttl, data)| {
            json!({ "name": name, "type": rtype, "TTL": ttl, "data": data })
        })
        .collect();

    let mut body = json!({
        "Status": status,
        "TC": false,
        "RD": true,
        "RA": true,
        "AD": ad,
        "CD": false,
    });
    if !answer.is_empty() {
        body["Answer"] = Value::Array(answer);
    }
    body
}

/// 模拟 DoH 服务器的查询端点
pub fn endpoint(server: &MockServer, path: &str) -> String {
    format!("{}{path}", server.uri())
}
