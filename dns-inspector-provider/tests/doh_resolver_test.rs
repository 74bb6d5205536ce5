//! DoH resolver integration tests against a mock DNS JSON server

mod common;

use std::time::Duration;

use dns_inspector_provider::{
    CloudflareResolver, DohResolver, GoogleResolver, ProviderError, Quad9Resolver, RecordType,
    ResolverConfig, ResolverKind, create_resolver,
};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use common::{doh_body, endpoint};

#[tokio::test]
async fn test_cloudflare_sends_name_type_and_accept() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dns-query"))
        .and(query_param("name", "example.com"))
        .and(query_param("type", "MX"))
        .and(header("accept", "application/dns-json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(doh_body(
            0,
            true,
            &[("example.com.", 15, 3600, "10 mail.example.com.")],
        )))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = CloudflareResolver::with_endpoint(endpoint(&server, "/dns-query"));
    let result = resolver.fetch("Example.COM.", RecordType::Mx).await;

    assert!(result.is_success(), "unexpected failure: {:?}", result.error());
    assert_eq!(result.provider, "Cloudflare");
    assert!(result.authenticated_data());
    let answers = result.answers();
    assert_eq!(answers.len(), 1);
    assert_eq!(answers[0].data, "10 mail.example.com.");
    assert_eq!(answers[0].ttl, 3600);
    assert_eq!(answers[0].record_type, RecordType::Mx);
}

#[tokio::test]
async fn test_google_sends_no_accept_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/resolve"))
        .respond_with(|req: &Request| {
            if req.headers.get("accept").is_some_and(|v| v == "application/dns-json") {
                ResponseTemplate::new(500)
            } else {
                ResponseTemplate::new(200).set_body_json(doh_body(
                    0,
                    false,
                    &[("example.com.", 1, 300, "93.184.216.34")],
                ))
            }
        })
        .expect(1)
        .mount(&server)
        .await;

    let resolver = GoogleResolver::with_endpoint(endpoint(&server, "/resolve"));
    let result = resolver.fetch("example.com", RecordType::A).await;

    assert!(result.is_success(), "unexpected failure: {:?}", result.error());
    assert_eq!(result.answers()[0].data, "93.184.216.34");
    assert!(!result.authenticated_data());
}

#[tokio::test]
async fn test_missing_answer_section_is_empty_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(doh_body(0, false, &[])))
        .mount(&server)
        .await;

    let resolver = Quad9Resolver::with_endpoint(endpoint(&server, "/dns-query"));
    let result = resolver.fetch("example.com", RecordType::Caa).await;

    assert!(result.is_success());
    assert!(result.answers().is_empty());
}

#[tokio::test]
async fn test_nxdomain_is_empty_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(doh_body(3, false, &[])))
        .mount(&server)
        .await;

    let resolver = CloudflareResolver::with_endpoint(endpoint(&server, "/dns-query"));
    let result = resolver.fetch("does-not-exist.example.com", RecordType::A).await;

    assert!(result.is_success());
    assert!(result.answers().is_empty());
}

#[tokio::test]
async fn test_servfail_is_resolver_status_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(doh_body(2, false, &[])))
        .mount(&server)
        .await;

    let resolver = CloudflareResolver::with_endpoint(endpoint(&server, "/dns-query"));
    let result = resolver.fetch("example.com", RecordType::A).await;

    assert!(!result.is_success());
    assert!(result.answers().is_empty());
    assert!(matches!(
        result.error(),
        Some(ProviderError::ResolverStatus { rcode: 2, .. })
    ));
}

#[tokio::test]
async fn test_non_success_status_is_http_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = GoogleResolver::with_endpoint(endpoint(&server, "/resolve"));
    let result = resolver.fetch("example.com", RecordType::A).await;

    // exactly one call: no retry
    assert!(matches!(
        result.error(),
        Some(ProviderError::HttpStatus { status: 503, .. })
    ));
}

#[tokio::test]
async fn test_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = CloudflareResolver::with_endpoint(endpoint(&server, "/dns-query"));
    let result = resolver.fetch("example.com", RecordType::A).await;

    assert!(matches!(
        result.error(),
        Some(ProviderError::RateLimited {
            retry_after: Some(7),
            ..
        })
    ));
}

#[tokio::test]
async fn test_malformed_json_is_parse_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>blocked</html>"))
        .mount(&server)
        .await;

    let resolver = GoogleResolver::with_endpoint(endpoint(&server, "/resolve"));
    let result = resolver.fetch("example.com", RecordType::Txt).await;

    assert!(matches!(result.error(), Some(ProviderError::ParseError { .. })));
}

#[tokio::test]
async fn test_invalid_domain_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(doh_body(0, false, &[])))
        .expect(0)
        .mount(&server)
        .await;

    let resolver = CloudflareResolver::with_endpoint(endpoint(&server, "/dns-query"));
    for bad in ["", "not a domain", "localhost", "10.0.0.1", "-bad-.com"] {
        let result = resolver.fetch(bad, RecordType::A).await;
        assert!(
            matches!(result.error(), Some(ProviderError::InvalidDomain { .. })),
            "{bad:?} should be rejected, got {result:?}"
        );
    }
}

#[tokio::test]
async fn test_answers_of_other_types_are_dropped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("name", "www.example.com"))
        .and(query_param("type", "A"))
        .respond_with(ResponseTemplate::new(200).set_body_json(doh_body(
            0,
            false,
            &[
                ("www.example.com.", 5, 300, "example.edgesuite.net."),
                ("example.edgesuite.net.", 1, 20, "23.45.67.89"),
                ("example.edgesuite.net.", 46, 20, "A 8 3 20 ..."),
            ],
        )))
        .mount(&server)
        .await;

    let resolver = GoogleResolver::with_endpoint(endpoint(&server, "/resolve"));
    let result = resolver.fetch("www.example.com", RecordType::A).await;

    let answers = result.answers();
    assert_eq!(answers.len(), 1);
    assert_eq!(answers[0].name, "example.edgesuite.net.");
    assert_eq!(answers[0].data, "23.45.67.89");
}

#[tokio::test]
async fn test_factory_endpoint_override_reaches_mock() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/resolve"))
        .and(header("accept", "application/dns-json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(doh_body(
            0,
            false,
            &[("example.com.", 16, 300, "\"v=spf1 -all\"")],
        )))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = require_ok!(create_resolver(
        ResolverConfig::new(ResolverKind::Adguard).with_endpoint(endpoint(&server, "/resolve"))
    ));
    let result = resolver.fetch("example.com", RecordType::Txt).await;

    assert_eq!(result.provider, "AdGuard");
    let answer = require_some!(result.answers().first());
    assert_eq!(answer.data, "\"v=spf1 -all\"");
}

#[tokio::test]
async fn test_unreachable_endpoint_is_network_failure() {
    // Nothing listens on the discard port
    let resolver = CloudflareResolver::with_endpoint("http://127.0.0.1:9/dns-query");
    let result = tokio::time::timeout(
        Duration::from_secs(15),
        resolver.fetch("example.com", RecordType::A),
    )
    .await;

    let result = require_ok!(result, "fetch should settle within the client timeout");
    assert!(matches!(
        result.error(),
        Some(ProviderError::NetworkError { .. } | ProviderError::Timeout { .. })
    ));
}

#[tokio::test]
#[ignore = "requires network access"]
async fn test_live_public_resolvers() {
    for kind in [
        ResolverKind::Google,
        ResolverKind::Cloudflare,
        ResolverKind::Quad9,
        ResolverKind::Adguard,
    ] {
        let resolver = require_ok!(create_resolver(ResolverConfig::new(kind)));
        let result = resolver.fetch("example.com", RecordType::A).await;
        assert!(result.is_success(), "{kind}: {:?}", result.error());
        assert!(!result.answers().is_empty(), "{kind}: no A records");
    }
}
