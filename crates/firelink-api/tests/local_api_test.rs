#![allow(clippy::unwrap_used)]
// Integration tests for `LocalApi` using wiremock.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use firelink_api::{Error, FireplaceApi, FireplaceCommand, LocalApi, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, LocalApi) {
    let server = MockServer::start().await;
    let ip = server.address().to_string();
    // API key must be hex: it is decoded for command signing.
    let api = LocalApi::new(&ip, "user-1", "deadbeef00112233", &TransportConfig::default())
        .unwrap()
        .with_poll_interval(Duration::from_millis(50));
    (server, api)
}

fn poll_body() -> serde_json::Value {
    json!({
        "name": "",
        "serial": "SN-LOCAL-1",
        "temperature": 19,
        "battery": 0,
        "pilot": 1,
        "light": 2,
        "height": 3,
        "fanspeed": 0,
        "hot": 0,
        "power": 1,
        "thermostat": 0,
        "setpoint": 0,
        "timer": 0,
        "timeremaining": 0,
        "prepurge": 0,
        "feature_light": 1,
        "feature_thermostat": 1,
        "power_vent": 0,
        "feature_fan": 1,
        "errors": [],
        "fw_version": "0x01000000",
        "ipv4_address": "192.168.1.80"
    })
}

// ── Poll tests ──────────────────────────────────────────────────────

#[tokio::test]
async fn poll_parses_and_stores_snapshot() {
    let (server, api) = setup().await;

    Mock::given(method("GET"))
        .and(path("/poll"))
        .respond_with(ResponseTemplate::new(200).set_body_json(poll_body()))
        .mount(&server)
        .await;

    let data = api.poll().await.unwrap();
    assert_eq!(data.serial, "SN-LOCAL-1");
    assert_eq!(data.temperature_c, 19);
    assert!(data.is_on);
    assert!(data.pilot_on);

    // data() reflects the stored snapshot without another request.
    assert_eq!(api.data(), data);
}

#[tokio::test]
async fn poll_maps_not_found() {
    let (server, api) = setup().await;

    Mock::given(method("GET"))
        .and(path("/poll"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = api.poll().await;
    assert!(
        matches!(result, Err(Error::FireplaceNotFound)),
        "expected FireplaceNotFound, got: {result:?}"
    );
}

#[tokio::test]
async fn poll_surfaces_unexpected_status() {
    let (server, api) = setup().await;

    Mock::given(method("GET"))
        .and(path("/poll"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    match api.poll().await {
        Err(Error::LocalApi { status, ref message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "boom");
        }
        other => panic!("expected LocalApi error, got: {other:?}"),
    }
}

#[tokio::test]
async fn poll_truncates_multibyte_error_body_without_panicking() {
    let (server, api) = setup().await;

    // 300 bytes of three-byte chars: a raw byte-200 cut would split one.
    let body = "\u{20ac}".repeat(100);
    Mock::given(method("GET"))
        .and(path("/poll"))
        .respond_with(ResponseTemplate::new(500).set_body_string(body))
        .mount(&server)
        .await;

    match api.poll().await {
        Err(Error::LocalApi { status, ref message }) => {
            assert_eq!(status, 500);
            assert!(message.len() <= 200);
            assert!(message.starts_with('\u{20ac}'));
        }
        other => panic!("expected LocalApi error, got: {other:?}"),
    }
}

// ── Background polling ──────────────────────────────────────────────

#[tokio::test]
async fn background_polling_refreshes_and_stops() {
    let (server, api) = setup().await;

    Mock::given(method("GET"))
        .and(path("/poll"))
        .respond_with(ResponseTemplate::new(200).set_body_json(poll_body()))
        .mount(&server)
        .await;

    api.start_background_polling().await.unwrap();
    // Second start is a no-op, not a second loop.
    api.start_background_polling().await.unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;
    api.stop_background_polling().await.unwrap();

    assert_eq!(api.data().serial, "SN-LOCAL-1");
}

#[tokio::test]
async fn stop_when_idle_is_a_noop() {
    let (_server, api) = setup().await;
    api.stop_background_polling().await.unwrap();
}

// ── Snapshot overwrite ──────────────────────────────────────────────

#[tokio::test]
async fn overwrite_data_replaces_snapshot() {
    let (_server, api) = setup().await;

    let seeded = firelink_api::FireplacePollData {
        serial: "SEEDED".into(),
        temperature_c: 25,
        ..firelink_api::FireplacePollData::default()
    };

    api.overwrite_data(seeded.clone());
    assert_eq!(api.data(), seeded);
}

// ── Command tests ───────────────────────────────────────────────────

#[tokio::test]
async fn send_command_signs_and_posts() {
    let (server, api) = setup().await;

    Mock::given(method("GET"))
        .and(path("/get_challenge"))
        .respond_with(ResponseTemplate::new(200).set_body_string("0123456789abcdef"))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/post"))
        .and(body_string_contains("command=power"))
        .and(body_string_contains("value=1"))
        .and(body_string_contains("user=user-1"))
        .and(body_string_contains("response="))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    api.send_command(FireplaceCommand::Power, 1).await.unwrap();
}

#[tokio::test]
async fn send_command_range_checks_before_network() {
    let (server, api) = setup().await;
    // No mocks mounted: an out-of-range value must never reach the wire.
    drop(server);

    let result = api.send_command(FireplaceCommand::FlameHeight, 9).await;
    assert!(
        matches!(result, Err(Error::InvalidParameter(_))),
        "expected InvalidParameter, got: {result:?}"
    );
}

#[tokio::test]
async fn send_command_maps_not_authorized() {
    let (server, api) = setup().await;

    Mock::given(method("GET"))
        .and(path("/get_challenge"))
        .respond_with(ResponseTemplate::new(200).set_body_string("0123456789abcdef"))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/post"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let result = api.send_command(FireplaceCommand::Pilot, 1).await;
    assert!(
        matches!(result, Err(Error::NotAuthorized)),
        "expected NotAuthorized, got: {result:?}"
    );
}
