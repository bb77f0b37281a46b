#![allow(clippy::unwrap_used)]
// Integration tests for `ControllerClient` using wiremock.

use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{basic_auth, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use netpulse_api::{ControllerClient, ControllerPlatform, Credentials, Error, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

const TOKEN: &str = "eyJhbGciOiJSUzI1NiJ9.test";

async fn setup_with(password: &str) -> (MockServer, ControllerClient) {
    let server = MockServer::start().await;
    let creds = Credentials::new(
        Url::parse(&server.uri()).unwrap(),
        "devnetuser",
        SecretString::from(password.to_string()),
    );
    let client = ControllerClient::with_client(
        reqwest::Client::new(),
        creds,
        ControllerPlatform::Generic,
    );
    (server, client)
}

async fn setup() -> (MockServer, ControllerClient) {
    setup_with("Cisco123!").await
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/token"))
        .and(basic_auth("devnetuser", "Cisco123!"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Token": TOKEN })))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .with_priority(10)
        .mount(server)
        .await;
}

fn sample_devices() -> serde_json::Value {
    json!({
        "response": [
            {
                "id": "6a49c827-9b28-490b-8df0-8b6c3b582d8a",
                "hostname": "HQ-Router",
                "type": "Cisco CSR1000v",
                "managementIpAddress": "203.0.113.2",
                "reachabilityStatus": "Reachable",
                "softwareVersion": "16.12.04",
                "macAddress": "00:50:56:12:34:56"
            },
            {
                "hostname": "Branch-Switch",
                "type": "Cisco vIOS-L2",
                "managementIpAddress": "192.168.2.1",
                "reachabilityStatus": "Unreachable",
                "softwareVersion": "15.2(4)S"
            }
        ],
        "version": "1.0"
    })
}

// ── Authentication tests ────────────────────────────────────────────

#[tokio::test]
async fn test_authenticate_success_attaches_token() {
    let (server, client) = setup().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/network-device"))
        .and(header("X-Auth-Token", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_devices()))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client.authenticate().await);
    assert!(client.has_session());

    let devices = client.list_devices().await.unwrap();
    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0].hostname.as_deref(), Some("HQ-Router"));
    assert_eq!(devices[1].id, None);
}

#[tokio::test]
async fn test_authenticate_wrong_password_leaves_no_session() {
    let (server, client) = setup_with("wrong-password").await;
    mount_token(&server).await;

    assert!(!client.authenticate().await);
    assert!(!client.has_session());

    let result = client.list_devices().await;
    assert!(
        matches!(result, Err(Error::AuthRequired)),
        "expected AuthRequired, got: {result:?}"
    );
}

#[tokio::test]
async fn test_failed_reauthentication_clears_stale_token() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/auth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Token": TOKEN })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/token"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assert!(client.authenticate().await);
    assert!(!client.authenticate().await);
    assert!(!client.has_session());
}

#[tokio::test]
async fn test_login_reports_malformed_token_payload() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/auth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "lowercase" })))
        .mount(&server)
        .await;

    let result = client.login().await;
    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
    assert!(!client.has_session());
}

#[tokio::test]
async fn test_authenticate_unreachable_controller() {
    let creds = Credentials::new(
        Url::parse("http://127.0.0.1:9").unwrap(),
        "devnetuser",
        SecretString::from("Cisco123!".to_string()),
    );
    let transport = TransportConfig::default().with_timeout(Duration::from_secs(2));
    let client = ControllerClient::new(creds, ControllerPlatform::Generic, &transport).unwrap();

    assert!(!client.authenticate().await);
    assert!(!client.has_session());
}

#[tokio::test]
async fn test_dnac_layout_paths() {
    let server = MockServer::start().await;
    let creds = Credentials::new(
        Url::parse(&server.uri()).unwrap(),
        "devnetuser",
        SecretString::from("Cisco123!".to_string()),
    );
    let client = ControllerClient::with_client(
        reqwest::Client::new(),
        creds,
        ControllerPlatform::DnaCenter,
    );

    Mock::given(method("POST"))
        .and(path("/dna/system/api/v1/auth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Token": TOKEN })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/dna/intent/api/v1/network-device"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": [] })))
        .mount(&server)
        .await;

    assert!(client.authenticate().await);
    assert!(client.list_devices().await.unwrap().is_empty());
}

// ── Query tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_device() {
    let (server, client) = setup().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/network-device/6a49c827"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": {
                "id": "6a49c827",
                "hostname": "HQ-Router",
                "managementIpAddress": "203.0.113.2"
            }
        })))
        .mount(&server)
        .await;

    assert!(client.authenticate().await);
    let device = client.get_device("6a49c827").await.unwrap();
    assert_eq!(device.id.as_deref(), Some("6a49c827"));
}

#[tokio::test]
async fn test_get_device_not_found() {
    let (server, client) = setup().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/network-device/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such device"))
        .mount(&server)
        .await;

    assert!(client.authenticate().await);
    let err = client.get_device("missing").await.unwrap_err();
    assert!(
        matches!(err, Error::Api { status: 404, .. }),
        "expected 404, got: {err:?}"
    );
}

#[tokio::test]
async fn test_network_health_is_idempotent() {
    let (server, client) = setup().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/network-health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": {
                "overallHealthScore": 98.5,
                "connectivity": 98.5,
                "performance": 95.2,
                "security": 99.1,
                "availability": 99.8
            }
        })))
        .mount(&server)
        .await;

    assert!(client.authenticate().await);
    let first = client.get_network_health().await.unwrap();
    let second = client.get_network_health().await.unwrap();

    assert_eq!(first.overall_health_score, Some(98.5));
    assert_eq!(first.performance, second.performance);
    assert_eq!(first.security, second.security);
    assert_eq!(first.availability, second.availability);
}

#[tokio::test]
async fn test_client_health_time_series_takes_latest() {
    let (server, client) = setup().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/client-health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": [
                { "totalClients": 10, "healthyClients": 9, "unhealthyClients": 1, "healthScore": 90.0 },
                { "totalClients": 15, "healthyClients": 14, "unhealthyClients": 1, "healthScore": 93.3 }
            ]
        })))
        .mount(&server)
        .await;

    assert!(client.authenticate().await);
    let health = client.get_client_health().await.unwrap();
    assert_eq!(health.total_clients, Some(15));
    assert_eq!(health.health_score, Some(93.3));
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized_invalidates_session() {
    let (server, client) = setup().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/network-device"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    assert!(client.authenticate().await);
    let result = client.list_devices().await;
    assert!(
        matches!(result, Err(Error::SessionExpired)),
        "expected SessionExpired, got: {result:?}"
    );
    assert!(!client.has_session());

    let result = client.list_devices().await;
    assert!(matches!(result, Err(Error::AuthRequired)));
}

#[tokio::test]
async fn test_server_error_maps_to_api_error() {
    let (server, client) = setup().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/network-health"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    assert!(client.authenticate().await);
    match client.get_network_health().await {
        Err(Error::Api { status, ref message }) => {
            assert_eq!(status, 503);
            assert!(message.contains("maintenance"));
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_unexpected_payload_shape() {
    let (server, client) = setup().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/network-device"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "devices": [] })))
        .mount(&server)
        .await;

    assert!(client.authenticate().await);
    let result = client.list_devices().await;
    assert!(
        matches!(result, Err(Error::Deserialization { .. })),
        "expected Deserialization error, got: {result:?}"
    );
}
