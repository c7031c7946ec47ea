// whois-check-lib/tests/integration.rs

//! Integration tests for the provider fallback chain against mock HTTP providers

use serde_json::json;
use std::time::{Duration, Instant};
use whois_check_lib::{
    canned_domains, FailureReason, LookupConfig, ProviderRegistry, ProviderSpec, ResponseFormat,
    WhoisCheckError, WhoisChecker,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const UPSTREAM: &str = "https://whois.freeapi.app/api/whois";

fn test_config() -> LookupConfig {
    LookupConfig::default()
        .with_timeout(Duration::from_secs(2))
        .with_offline_delay(Duration::ZERO)
}

fn wrapped_body(domain: &str, registrar: &str) -> serde_json::Value {
    json!({
        "status": "success",
        "data": {
            "domainName": domain,
            "status": ["clientTransferProhibited"],
            "creationDate": "1995-08-14T04:00:00Z",
            "expirationDate": "2030-08-13T04:00:00Z",
            "registrarName": registrar,
            "registrarIANAID": "376",
            "nameServers": ["a.iana-servers.net", "b.iana-servers.net"]
        }
    })
}

fn direct(name: &str, server: &MockServer, route: &str) -> ProviderSpec {
    ProviderSpec::new(
        name,
        format!("{}{}", server.uri(), route),
        ResponseFormat::Wrapped,
    )
}

#[tokio::test]
async fn test_first_success_stops_the_chain() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/one"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/two"))
        .and(query_param("domainName", "example.com"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(wrapped_body("example.com", "RESERVED-IANA")),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/three"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(wrapped_body("example.com", "Other")),
        )
        .expect(0)
        .mount(&server)
        .await;

    let registry = ProviderRegistry::new(vec![
        direct("One", &server, "/one"),
        direct("Two", &server, "/two"),
        direct("Three", &server, "/three"),
        ProviderSpec::offline(),
    ])
    .unwrap();
    let checker = WhoisChecker::with_config(test_config(), registry).unwrap();

    let outcome = checker.lookup_with_source("example.com").await.unwrap();

    assert_eq!(outcome.provider, "Two");
    assert!(!outcome.offline);
    assert_eq!(outcome.record.registrar_name.as_deref(), Some("RESERVED-IANA"));
    assert_eq!(outcome.record.registrar_id.as_deref(), Some("376"));
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].provider, "One");
    assert_eq!(outcome.failures[0].reason, FailureReason::HttpStatus);
    assert_eq!(outcome.failures[0].status_code, Some(500));
}

#[tokio::test]
async fn test_slow_provider_times_out_and_falls_back() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(wrapped_body("example.com", "Too Late"))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fast"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(wrapped_body("example.com", "On Time")),
        )
        .mount(&server)
        .await;

    let registry = ProviderRegistry::new(vec![
        direct("Slow", &server, "/slow"),
        direct("Fast", &server, "/fast"),
    ])
    .unwrap();
    let config = test_config().with_timeout(Duration::from_millis(300));
    let checker = WhoisChecker::with_config(config, registry).unwrap();

    let start = Instant::now();
    let outcome = checker.lookup_with_source("example.com").await.unwrap();

    assert!(start.elapsed() < Duration::from_secs(3));
    assert_eq!(outcome.provider, "Fast");
    assert_eq!(outcome.record.registrar_name.as_deref(), Some("On Time"));
    assert_eq!(outcome.failures[0].reason, FailureReason::Timeout);
}

#[tokio::test]
async fn test_unrecognized_and_malformed_bodies_fall_through() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/failed-flag"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "error", "message": "quota"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>rate limited</html>"))
        .mount(&server)
        .await;

    let registry = ProviderRegistry::new(vec![
        direct("Flagged", &server, "/failed-flag"),
        direct("Html", &server, "/html"),
        ProviderSpec::offline(),
    ])
    .unwrap();
    let checker = WhoisChecker::with_config(test_config(), registry).unwrap();

    let outcome = checker.lookup_with_source("google.com").await.unwrap();

    assert!(outcome.offline);
    assert_eq!(outcome.record.registrar_name.as_deref(), Some("MarkMonitor Inc."));
    let reasons: Vec<FailureReason> = outcome.failures.iter().map(|f| f.reason).collect();
    assert_eq!(
        reasons,
        vec![FailureReason::UnrecognizedFormat, FailureReason::MalformedBody]
    );
}

#[tokio::test]
async fn test_proxy_envelope_end_to_end() {
    let server = MockServer::start().await;
    let upstream_body = wrapped_body("example.org", "Public Interest Registry").to_string();

    Mock::given(method("GET"))
        .and(path("/get"))
        .and(query_param(
            "url",
            "https://whois.freeapi.app/api/whois?domainName=example.org",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "contents": upstream_body,
            "status": {"http_code": 200}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let registry = ProviderRegistry::new(vec![ProviderSpec::new(
        "Envelope",
        format!("{}/get?url=", server.uri()),
        ResponseFormat::ProxyEnvelope,
    )
    .via(UPSTREAM, ResponseFormat::Wrapped)])
    .unwrap();
    let checker = WhoisChecker::with_config(test_config(), registry).unwrap();

    let record = checker.lookup("example.org").await.unwrap();
    assert_eq!(record.domain_name, "example.org");
    assert_eq!(record.registrar_name.as_deref(), Some("Public Interest Registry"));
    assert_eq!(record.name_servers, vec!["a.iana-servers.net", "b.iana-servers.net"]);
}

#[tokio::test]
async fn test_proxy_passthrough_end_to_end() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(wrapped_body("example.net", "VeriSign")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let registry = ProviderRegistry::new(vec![ProviderSpec::new(
        "Passthrough",
        format!("{}/?", server.uri()),
        ResponseFormat::ProxyPassthrough,
    )
    .via(UPSTREAM, ResponseFormat::Wrapped)])
    .unwrap();
    let checker = WhoisChecker::with_config(test_config(), registry).unwrap();

    let record = checker.lookup("example.net").await.unwrap();
    assert_eq!(record.registrar_name.as_deref(), Some("VeriSign"));
}

#[tokio::test]
async fn test_key_renaming_end_to_end() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/whois"))
        .and(query_param("domain", "rust-lang.org"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "domainName": "rust-lang.org",
            "status": "clientTransferProhibited",
            "createdDate": "2010-03-08T18:19:45Z",
            "expiresDate": "2031-03-08T18:19:45Z",
            "registrarName": "Gandi SAS"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let registry = ProviderRegistry::new(vec![ProviderSpec::new(
        "Renaming",
        format!("{}/whois", server.uri()),
        ResponseFormat::KeyRenaming,
    )])
    .unwrap();
    let checker = WhoisChecker::with_config(test_config(), registry).unwrap();

    let record = checker.lookup("rust-lang.org").await.unwrap();
    assert_eq!(record.creation_date.as_deref(), Some("2010-03-08T18:19:45Z"));
    assert_eq!(record.expiration_date.as_deref(), Some("2031-03-08T18:19:45Z"));
    assert_eq!(record.status, vec!["clientTransferProhibited"]);
}

#[tokio::test]
async fn test_all_providers_exhausted() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let registry = ProviderRegistry::new(vec![
        direct("Down", &server, "/whois"),
        ProviderSpec::offline(),
    ])
    .unwrap();
    let config = test_config().with_offline_placeholder(false);
    let checker = WhoisChecker::with_config(config, registry).unwrap();

    let err = checker.lookup("unknown-domain.dev").await.unwrap_err();

    assert_eq!(err.reason(), FailureReason::AllFailed);
    assert_eq!(err.last_cause().map(|c| c.reason), Some(FailureReason::NoRecord));
    match err {
        WhoisCheckError::AllProvidersFailed { domain, causes } => {
            assert_eq!(domain, "unknown-domain.dev");
            assert_eq!(causes.len(), 2);
            assert_eq!(causes[0].status_code, Some(503));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_canned_domains_never_fail() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let registry = ProviderRegistry::new(vec![
        direct("Broken", &server, "/whois"),
        ProviderSpec::offline(),
    ])
    .unwrap();
    let config = test_config().with_offline_placeholder(false);
    let checker = WhoisChecker::with_config(config, registry).unwrap();

    for domain in canned_domains() {
        let outcome = tokio_test::assert_ok!(checker.lookup_with_source(domain).await);
        assert!(outcome.offline);
        assert_eq!(outcome.record.domain_name, domain);
    }
}

#[tokio::test]
async fn test_unknown_domain_gets_placeholder_offline() {
    let checker =
        WhoisChecker::with_config(test_config(), ProviderRegistry::offline_only()).unwrap();

    let record = checker.lookup("nothing-here.io").await.unwrap();
    assert_eq!(record.domain_name, "nothing-here.io");
    assert_eq!(record.registrar_name.as_deref(), Some("Demo Registrar"));
    assert_eq!(record.name_servers, vec!["ns1.demo.com", "ns2.demo.com"]);
}
