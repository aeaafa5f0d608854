//! Integration tests for the endpoint-health cache using wiremock.

use std::sync::Arc;
use std::time::Duration;

use farcast::status::EndpointStatusCache;
use farcast::transport::HttpTransport;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn status_body() -> serde_json::Value {
    json!([
        {"route": "/orders/", "status": "green"},
        {"route": "/contracts/", "status": "red"}
    ])
}

fn cache(server: &MockServer, dir: &tempfile::TempDir, interval: Duration) -> EndpointStatusCache {
    EndpointStatusCache::new(
        Arc::new(HttpTransport::new("farcast-tests")),
        format!("{}/status.json", server.uri()),
        dir.path().join("status.json"),
        interval,
    )
}

#[tokio::test]
async fn at_most_one_fetch_per_interval() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let cache = cache(&server, &dir, Duration::from_secs(60));

    assert!(cache.is_healthy("/orders/").await);
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(cache.is_healthy("/orders/").await);
}

#[tokio::test]
async fn non_green_and_unknown_routes_are_unhealthy() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let cache = cache(&server, &dir, Duration::from_secs(60));

    assert!(!cache.is_healthy("/contracts/").await);
    assert!(!cache.is_healthy("/never-heard-of-it/").await);
}

#[tokio::test]
async fn failed_refresh_serves_previous_map() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/status.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let cache = cache(&server, &dir, Duration::from_millis(10));

    assert!(cache.is_healthy("/orders/").await);
    tokio::time::sleep(Duration::from_millis(50)).await;
    // The second refresh hits a 500; the stale-but-valid map answers.
    assert!(cache.is_healthy("/orders/").await);
}

#[tokio::test]
async fn persisted_map_survives_restart_without_refetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    {
        let first = cache(&server, &dir, Duration::from_secs(60));
        assert!(first.is_healthy("/orders/").await);
    }

    // A fresh instance on the same path must not need the remote at all.
    let offline = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&offline)
        .await;

    let second = EndpointStatusCache::new(
        Arc::new(HttpTransport::new("farcast-tests")),
        format!("{}/status.json", offline.uri()),
        dir.path().join("status.json"),
        Duration::from_secs(60),
    );
    assert!(second.is_healthy("/orders/").await);
    assert!(!second.is_healthy("/contracts/").await);
}
