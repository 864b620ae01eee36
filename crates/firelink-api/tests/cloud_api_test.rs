#![allow(clippy::unwrap_used)]
// Integration tests for `CloudApi` using wiremock.

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_string, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use firelink_api::{CloudApi, CloudCookies, Error, FireplaceApi, FireplaceCommand, TransportConfig};

const SERIAL: &str = "SN-CLOUD-1";

// ── Helpers ─────────────────────────────────────────────────────────

fn cookies() -> CloudCookies {
    CloudCookies {
        user_id: "U1".into(),
        auth_cookie: "CK1".into(),
        web_client_id: "W1".into(),
    }
}

async fn setup() -> (MockServer, CloudApi) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let api = CloudApi::new(base_url, SERIAL, &cookies(), &TransportConfig::default()).unwrap();
    (server, api)
}

fn serial_path(suffix: &str) -> String {
    format!("/a/{SERIAL}//{suffix}")
}

// ── Poll tests ──────────────────────────────────────────────────────

#[tokio::test]
async fn poll_parses_string_encoded_body() {
    let (server, api) = setup().await;

    // The cloud encodes scalars as strings.
    let body = json!({
        "name": "living room",
        "temperature": "22",
        "battery": "0",
        "pilot": "0",
        "light": "3",
        "height": "4",
        "fanspeed": "0",
        "hot": "0",
        "power": "1",
        "thermostat": "0",
        "setpoint": "0",
        "timer": "0",
        "timeremaining": "0",
        "prepurge": "0",
        "feature_light": "1",
        "feature_thermostat": "1",
        "power_vent": "0",
        "feature_fan": "1",
        "errors": [],
        "firmware_version": "0x01000000",
        "brand": "H&G"
    });

    Mock::given(method("GET"))
        .and(path(serial_path("apppoll")))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let data = api.poll().await.unwrap();
    assert_eq!(data.name, "living room");
    assert_eq!(data.temperature_c, 22);
    assert_eq!(data.flameheight, 4);
    assert!(data.is_on);
    assert_eq!(data.brand, "H&G");
}

#[tokio::test]
async fn poll_sends_account_cookies() {
    let (server, api) = setup().await;

    Mock::given(method("GET"))
        .and(path(serial_path("apppoll")))
        .and(header_regex("cookie", "auth_cookie=CK1"))
        .and(header_regex("cookie", "user=U1"))
        .and(header_regex("cookie", "web_client_id=W1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    api.poll().await.unwrap();
}

#[tokio::test]
async fn poll_maps_not_authorized() {
    let (server, api) = setup().await;

    Mock::given(method("GET"))
        .and(path(serial_path("apppoll")))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let result = api.poll().await;
    assert!(
        matches!(result, Err(Error::NotAuthorized)),
        "expected NotAuthorized, got: {result:?}"
    );
}

#[tokio::test]
async fn poll_maps_bad_serial_to_not_found() {
    let (server, api) = setup().await;

    Mock::given(method("GET"))
        .and(path(serial_path("apppoll")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = api.poll().await;
    assert!(
        matches!(result, Err(Error::FireplaceNotFound)),
        "expected FireplaceNotFound, got: {result:?}"
    );
}

// ── Long-poll tests ─────────────────────────────────────────────────

#[tokio::test]
async fn long_poll_reports_change_and_timeout() {
    let (server, api) = setup().await;

    Mock::given(method("GET"))
        .and(path(serial_path("applongpoll")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    assert!(api.long_poll().await.unwrap());

    Mock::given(method("GET"))
        .and(path(serial_path("applongpoll")))
        .respond_with(ResponseTemplate::new(408))
        .mount(&server)
        .await;

    assert!(!api.long_poll().await.unwrap());
}

// ── Command tests ───────────────────────────────────────────────────

#[tokio::test]
async fn send_command_posts_wire_pair() {
    let (server, api) = setup().await;

    Mock::given(method("POST"))
        .and(path(serial_path("applongpoll")))
        .and(body_string("height=4"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    api.send_command(FireplaceCommand::FlameHeight, 4)
        .await
        .unwrap();
}

#[tokio::test]
async fn send_command_maps_invalid_parameter() {
    let (server, api) = setup().await;

    Mock::given(method("POST"))
        .and(path(serial_path("applongpoll")))
        .respond_with(ResponseTemplate::new(422))
        .mount(&server)
        .await;

    let result = api.send_command(FireplaceCommand::Power, 1).await;
    assert!(
        matches!(result, Err(Error::InvalidParameter(_))),
        "expected InvalidParameter, got: {result:?}"
    );
}
