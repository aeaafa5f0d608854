//! End-to-end session tests using wiremock.

use std::sync::Arc;

use farcast::fallback::Substitute;
use farcast::{ClientConfig, Error, Outcome, Session};
use farcast_backend::MemoryBackend;
use farcast_core::{ApiRequest, ApiResponse, PreparedRequest};
use http::{HeaderMap, Method, StatusCode};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer, dir: &tempfile::TempDir) -> ClientConfig {
    let mut config = ClientConfig::new(
        server.uri(),
        format!("{}/status.json", server.uri()),
    );
    config.status_path = dir.path().join("status.json");
    config
}

async fn mount_status(server: &MockServer, route: &str, status: &str) {
    Mock::given(method("GET"))
        .and(path("/status.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"route": route, "status": status}])),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn single_expansion_yields_single_outcome() {
    let server = MockServer::start().await;
    mount_status(&server, "/orders/", "green").await;
    Mock::given(method("GET"))
        .and(path("/orders/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("payload"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let session = Session::builder(config(&server, &dir)).build();

    let outcome = session.get("/orders/").await.unwrap();
    let response = outcome.single().expect("one concrete request");
    assert_eq!(response.text(), "payload");
}

#[tokio::test]
async fn prepare_injects_conditional_header() {
    let server = MockServer::start().await;
    mount_status(&server, "/orders/", "green").await;

    let dir = tempfile::tempdir().unwrap();
    let session = Session::builder(config(&server, &dir)).build();

    // No cache entry yet: the header carries the no-prior-version signal.
    let request = ApiRequest::new(Method::GET, "/orders/");
    let prepared = session.prepare(&request).await.unwrap();
    assert_eq!(
        prepared[0].headers().get("If-None-Match").unwrap(),
        &"".parse::<http::HeaderValue>().unwrap()
    );
}

#[tokio::test]
async fn not_modified_serves_cached_body() {
    let server = MockServer::start().await;
    mount_status(&server, "/orders/", "green").await;
    // First exchange: full body with an entity tag.
    Mock::given(method("GET"))
        .and(path("/orders/"))
        .and(header("If-None-Match", ""))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("payload")
                .insert_header("ETag", "\"abc123\""),
        )
        .expect(1)
        .mount(&server)
        .await;
    // Second exchange: the stored tag comes back, the body does not.
    Mock::given(method("GET"))
        .and(path("/orders/"))
        .and(header("If-None-Match", "\"abc123\""))
        .respond_with(ResponseTemplate::new(304))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let session = Session::builder(config(&server, &dir)).build();

    let first = session.get("/orders/").await.unwrap().single().unwrap();
    assert_eq!(first.text(), "payload");
    assert_eq!(first.status(), StatusCode::OK);

    let second = session.get("/orders/").await.unwrap().single().unwrap();
    assert_eq!(second.text(), "payload");
    assert_eq!(second.status(), StatusCode::OK);
    // Recovered from cache: no producing request.
    assert!(second.request().is_none());
}

struct CannedSubstitute;

impl Substitute for CannedSubstitute {
    fn ready(&self, _request: &PreparedRequest) -> bool {
        true
    }

    fn synthesize(&self, request: &PreparedRequest) -> ApiResponse {
        ApiResponse::new(
            StatusCode::OK,
            HeaderMap::new(),
            Some("OK".into()),
            request.url(),
            "synthetic",
            None,
        )
    }
}

#[tokio::test]
async fn ready_fallback_substitutes_blocked_request() {
    let server = MockServer::start().await;
    mount_status(&server, "/orders/", "red").await;
    Mock::given(method("GET"))
        .and(path("/orders/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let backend = Arc::new(MemoryBackend::new());
    let dir = tempfile::tempdir().unwrap();
    let session = Session::builder(config(&server, &dir))
        .backend(backend.clone())
        .fallback(Arc::new(CannedSubstitute))
        .build();

    let response = session.get("/orders/").await.unwrap().single().unwrap();
    assert_eq!(response.text(), "synthetic");
    // Synthesized responses never enter the conditional cache.
    assert!(backend.is_empty());
}

#[tokio::test]
async fn unready_fallback_lets_blocked_request_proceed() {
    let server = MockServer::start().await;
    mount_status(&server, "/orders/", "red").await;
    Mock::given(method("GET"))
        .and(path("/orders/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("served anyway"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let session = Session::builder(config(&server, &dir)).build();

    // Default hook is never ready: the invalid request still goes out.
    let response = session.get("/orders/").await.unwrap().single().unwrap();
    assert_eq!(response.text(), "served anyway");
}

#[tokio::test]
async fn strict_mode_surfaces_endpoint_down() {
    let server = MockServer::start().await;
    mount_status(&server, "/orders/", "red").await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = config(&server, &dir);
    config.strict = true;
    let session = Session::builder(config).build();

    let error = session.get("/orders/").await.unwrap_err();
    assert!(matches!(error, Error::EndpointDown { route } if route == "/orders/"));
}

#[tokio::test]
async fn entity_check_blocks_before_any_exchange() {
    let server = MockServer::start().await;
    mount_status(&server, "/universe/types/{type_id}/", "green").await;
    Mock::given(method("GET"))
        .and(path("/universe/types/999/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = config(&server, &dir);
    config.strict = true;
    let session = Session::builder(config)
        .reference(Arc::new(
            farcast::reference::StaticReferenceData::from_entries([(34, true)]),
        ))
        .catalog(Arc::new(
            farcast::catalog::StaticCatalog::new()
                .with_endpoint("/universe/types/{type_id}/", [("type_id", true)]),
        ))
        .entity_check(
            "type_id",
            format!("{}/universe/types/{{id}}/", server.uri()),
        )
        .build();

    let request = ApiRequest::new(Method::GET, "/universe/types/{type_id}/").param("type_id", 999);
    let error = session.request(request).await.unwrap_err();
    assert!(matches!(error, Error::InvalidParameter { name, .. } if name == "type_id"));
}

#[tokio::test]
async fn multiple_prepared_requests_yield_many() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/items/0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("zero"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/items/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("one"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = config(&server, &dir);
    config.checks_enabled = false;
    let session = Session::builder(config).build();

    let requests = vec![
        PreparedRequest::build(Method::GET, format!("{}/items/0", server.uri()), "/items/0")
            .mark_prepared(),
        PreparedRequest::build(Method::GET, format!("{}/items/1", server.uri()), "/items/1")
            .mark_prepared(),
    ];
    let responses = session.issue(requests).await.unwrap();
    assert_eq!(responses[0].text(), "zero");
    assert_eq!(responses[1].text(), "one");

    let outcome = Outcome::Many(responses);
    assert_eq!(outcome.into_vec().len(), 2);
}
