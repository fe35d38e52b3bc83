#![allow(clippy::unwrap_used)]
// Integration tests for `RestClient` using wiremock.

use std::time::Duration;

use serde_json::json;
use url::Url;
use wiremock::matchers::{basic_auth, body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tiksync_api::{BasicAuth, Error, RecordExt, RestClient, RouterApi};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, RestClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let auth = BasicAuth {
        username: "admin".into(),
        password: "hunter2".to_string().into(),
    };
    let client = RestClient::with_client(
        reqwest::Client::new(),
        base_url,
        auth,
        Duration::from_secs(5),
    );
    (server, client)
}

// ── Fetch ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_interfaces() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/interface"))
        .and(basic_auth("admin", "hunter2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { ".id": "*1", "default-name": "ether1", "name": "wan", "running": "true" },
            { ".id": "*2", "default-name": "ether2", "name": "ether2", "running": "false" }
        ])))
        .mount(&server)
        .await;

    assert!(!client.is_connected());
    let records = client.fetch("/interface").await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].text("name").as_deref(), Some("wan"));
    assert_eq!(records[1].truthy("running"), Some(false));
    assert!(client.is_connected());
}

#[tokio::test]
async fn test_fetch_empty_list() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/ip/firewall/nat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let records = client.fetch("/ip/firewall/nat").await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_fetch_singleton_object() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/system/resource"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total-memory": "1000",
            "free-memory": "250"
        })))
        .mount(&server)
        .await;

    let records = client.fetch("/system/resource").await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].text("free-memory").as_deref(), Some("250"));
}

#[tokio::test]
async fn test_fetch_unauthorized() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/interface"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": 401,
            "message": "Unauthorized"
        })))
        .mount(&server)
        .await;

    let result = client.fetch("/interface").await;
    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_router_error_uses_detail() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/queue/simple"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": 400,
            "message": "Bad Request",
            "detail": "no such command or directory"
        })))
        .mount(&server)
        .await;

    match client.fetch("/queue/simple").await {
        Err(Error::Router { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "no such command or directory");
        }
        other => panic!("expected Router error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error_is_transient() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/ip/arp"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .mount(&server)
        .await;

    let err = client.fetch("/ip/arp").await.unwrap_err();
    assert!(err.is_transient());
}

// ── Mutate ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_mutate_locates_id_then_patches() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/interface"))
        .and(query_param("default-name", "ether3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { ".id": "*3", "default-name": "ether3", "name": "lan3" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/interface/*3"))
        .and(body_json(json!({ "disabled": "true" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    client
        .mutate("/interface", "default-name", "ether3", "disabled", json!("true"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_mutate_unknown_entry() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/queue/simple"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let err = client
        .mutate("/queue/simple", "name", "guest", "disabled", json!("false"))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(matches!(err, Error::NotFound { ref value, .. } if value == "guest"));
}

// ── Invoke ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_invoke_script_run() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/system/script"))
        .and(query_param("name", "backup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { ".id": "*A", "name": "backup" }
        ])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/system/script/run"))
        .and(body_json(json!({ ".id": "*A" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    client
        .invoke("/system/script", "run", "name", "backup")
        .await
        .unwrap();
}

// ── Probe ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_probe_reachable() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/rest/ping"))
        .and(body_json(json!({
            "address": "192.168.88.10",
            "interface": "bridge",
            "arp-ping": "yes",
            "count": "1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "host": "192.168.88.10", "sent": "1", "received": "1", "packet-loss": "0" }
        ])))
        .mount(&server)
        .await;

    assert!(client.probe("192.168.88.10", "bridge").await.unwrap());
}

#[tokio::test]
async fn test_probe_no_reply() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/rest/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "host": "192.168.88.11", "sent": "1", "received": "0", "packet-loss": "100" }
        ])))
        .mount(&server)
        .await;

    assert!(!client.probe("192.168.88.11", "bridge").await.unwrap());
}

// ── Connectivity ────────────────────────────────────────────────────

#[tokio::test]
async fn test_unreachable_router_marks_disconnected() {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    drop(server);

    let client = RestClient::with_client(
        reqwest::Client::new(),
        base_url,
        BasicAuth {
            username: "admin".into(),
            password: String::new().into(),
        },
        Duration::from_secs(1),
    );

    let result = client.fetch("/interface").await;
    assert!(result.is_err());
    assert!(!client.is_connected());
}
