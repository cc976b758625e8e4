#![allow(clippy::unwrap_used)]
// Integration tests for the `Hue` facade against a wiremock bridge.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{any, body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use huely_core::{
    CoreError, Hue, HueConfig, MemoryStore, NavigationError, Navigator, RecordingNavigator, Screen,
    SettingKey, SettingsStore, StatePatch, TransportConfig,
};

// ── Helpers ─────────────────────────────────────────────────────────

const USERNAME: &str = "test-user";

struct Harness {
    server: MockServer,
    hue: Hue,
    store: Arc<MemoryStore>,
    nav: Arc<RecordingNavigator>,
}

fn config_for(server: &MockServer) -> HueConfig {
    HueConfig {
        transport: TransportConfig::default().with_timeout(Duration::from_secs(2)),
        discovery_url: Some(Url::parse(&format!("{}/", server.uri())).unwrap()),
        port: Some(server.address().port()),
        ..HueConfig::default()
    }
}

async fn setup_with(store: MemoryStore) -> Harness {
    let server = MockServer::start().await;
    let store = Arc::new(store);
    let nav = Arc::new(RecordingNavigator::new());
    let hue = Hue::new(config_for(&server), store.clone(), nav.clone()).unwrap();
    Harness {
        server,
        hue,
        store,
        nav,
    }
}

/// A bridge on the mock server's loopback address, already paired.
async fn setup() -> Harness {
    setup_with(MemoryStore::with_bridge("127.0.0.1", USERNAME)).await
}

fn user_path(suffix: &str) -> String {
    format!("/api/{USERNAME}/{suffix}")
}

fn light_json(name: &str, on: bool) -> Value {
    json!({
        "state": { "on": on, "bri": 254, "reachable": true },
        "type": "Extended color light",
        "name": name
    })
}

fn group_json(name: &str, lights: &[&str], any_on: bool) -> Value {
    json!({
        "name": name,
        "lights": lights,
        "type": "Room",
        "state": { "all_on": any_on, "any_on": any_on },
        "action": { "on": any_on }
    })
}

fn success(address: &str, value: Value) -> Value {
    json!([{ "success": { address: value } }])
}

// ── Not configured ──────────────────────────────────────────────────

#[tokio::test]
async fn test_unconfigured_lights_navigate_to_connect() {
    let h = setup_with(MemoryStore::new()).await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&h.server)
        .await;

    let err = h.hue.lights().await.unwrap_err();

    assert!(matches!(err, CoreError::NotConfigured));
    assert_eq!(
        err.to_string(),
        "Bridge not configured. Please connect to a Hue Bridge first."
    );
    assert_eq!(h.nav.visited(), vec![Screen::ConnectBridge]);
}

#[tokio::test]
async fn test_unconfigured_toggle_group_is_a_no_op() {
    let h = setup_with(MemoryStore::new()).await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&h.server)
        .await;

    let outcome = h.hue.toggle_group("1").await.unwrap();

    assert!(outcome.is_none());
    assert_eq!(h.nav.visited(), vec![Screen::ConnectBridge]);
}

#[tokio::test]
async fn test_corrupt_stored_address_navigates() {
    let h = setup_with(MemoryStore::with_bridge("300.1.1.1", USERNAME)).await;

    let err = h.hue.groups().await.unwrap_err();

    assert!(matches!(err, CoreError::InvalidConfiguration { .. }));
    assert_eq!(h.nav.visited(), vec![Screen::ConnectBridge]);
}

#[tokio::test]
async fn test_unreachable_bridge_error_hides_username() {
    // Nothing listens on port 1.
    let config = HueConfig {
        transport: TransportConfig::default().with_timeout(Duration::from_secs(2)),
        port: Some(1),
        ..HueConfig::default()
    };
    let store = Arc::new(MemoryStore::with_bridge("127.0.0.1", "s3cretuser"));
    let nav = Arc::new(RecordingNavigator::new());
    let hue = Hue::new(config, store, nav).unwrap();

    let err = hue.lights().await.unwrap_err();

    assert!(matches!(err, CoreError::Connection { .. } | CoreError::Timeout { .. }), "{err:?}");
    assert!(!err.to_string().contains("s3cretuser"), "leaked in: {err}");
    assert!(!format!("{err:?}").contains("s3cretuser"), "leaked in: {err:?}");
}

#[tokio::test]
async fn test_json_encoded_settings_are_accepted() {
    let h = setup_with(MemoryStore::with_bridge("\"127.0.0.1\"", "\"test-user\"")).await;
    Mock::given(method("GET"))
        .and(path(user_path("lights")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&h.server)
        .await;

    assert!(h.hue.lights().await.unwrap().is_empty());
}

// ── Lights ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_lights_are_ordered_by_numeric_id() {
    let h = setup().await;
    Mock::given(method("GET"))
        .and(path(user_path("lights")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "10": light_json("Desk", false),
            "2": light_json("Hall", true),
            "1": light_json("Porch", true)
        })))
        .mount(&h.server)
        .await;

    let lights = h.hue.lights().await.unwrap();

    let ids: Vec<&str> = lights.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, ["1", "2", "10"]);
    assert_eq!(lights[2].item.name, "Desk");
    assert!(h.nav.visited().is_empty());
}

#[tokio::test]
async fn test_toggle_light_flips_power() {
    let h = setup().await;
    Mock::given(method("GET"))
        .and(path(user_path("lights/4")))
        .respond_with(ResponseTemplate::new(200).set_body_json(light_json("Lamp", true)))
        .mount(&h.server)
        .await;
    Mock::given(method("PUT"))
        .and(path(user_path("lights/4/state")))
        .and(body_json(json!({ "on": false })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(success("/lights/4/state/on", json!(false))),
        )
        .expect(1)
        .mount(&h.server)
        .await;

    let toggle = h.hue.toggle_light("4").await.unwrap();

    assert_eq!(toggle.name, "Lamp");
    assert!(!toggle.on);
    assert_eq!(toggle.applied.len(), 1);
}

#[tokio::test]
async fn test_set_light_state_sends_only_present_fields() {
    let h = setup().await;
    Mock::given(method("PUT"))
        .and(path(user_path("lights/1/state")))
        .and(body_json(json!({ "on": true, "bri": 127 })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([
                { "success": { "/lights/1/state/on": true } },
                { "success": { "/lights/1/state/bri": 127 } }
            ])),
        )
        .expect(1)
        .mount(&h.server)
        .await;

    let patch = StatePatch {
        on: Some(true),
        bri: Some(127),
        ..StatePatch::default()
    };
    let applied = h.hue.set_light_state("1", &patch).await.unwrap();

    assert_eq!(applied.len(), 2);
}

// ── Groups ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_groups_hide_single_light_groups() {
    let h = setup().await;
    Mock::given(method("GET"))
        .and(path(user_path("groups")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "1": group_json("Kitchen", &["1", "2"], true),
            "2": group_json("Lamp", &["3"], false),
            "3": group_json("Empty", &[], false)
        })))
        .mount(&h.server)
        .await;

    let shown = h.hue.groups().await.unwrap();
    let all = h.hue.all_groups().await.unwrap();

    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].id, "1");
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn test_toggle_group_uses_any_on() {
    let h = setup().await;
    Mock::given(method("GET"))
        .and(path(user_path("groups/1")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({
                "name": "Kitchen",
                "lights": ["1", "2"],
                "type": "Room",
                "state": { "all_on": false, "any_on": true }
            })),
        )
        .mount(&h.server)
        .await;
    Mock::given(method("PUT"))
        .and(path(user_path("groups/1/action")))
        .and(body_json(json!({ "on": false })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(success("/groups/1/action/on", json!(false))),
        )
        .expect(1)
        .mount(&h.server)
        .await;

    let toggle = h.hue.toggle_group("1").await.unwrap().unwrap();

    assert!(!toggle.on);
    assert_eq!(toggle.next_action(), "Turn Kitchen on");
}

// ── Error routing ───────────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized_user_navigates() {
    let h = setup().await;
    Mock::given(method("GET"))
        .and(path(user_path("groups")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "error": { "type": 1, "address": "/groups", "description": "unauthorized user" } }
        ])))
        .mount(&h.server)
        .await;

    let err = h.hue.groups().await.unwrap_err();

    assert!(matches!(err, CoreError::Bridge { code: Some(1), .. }));
    assert_eq!(h.nav.visited(), vec![Screen::ConnectBridge]);
}

#[tokio::test]
async fn test_unknown_resource_does_not_navigate() {
    let h = setup().await;
    Mock::given(method("GET"))
        .and(path(user_path("lights/99")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "error": { "type": 3, "address": "/lights/99", "description": "resource, /lights/99, not available" } }
        ])))
        .mount(&h.server)
        .await;

    let err = h.hue.light("99").await.unwrap_err();

    assert_eq!(err.to_string(), "resource, /lights/99, not available");
    assert!(h.nav.visited().is_empty());
}

#[tokio::test]
async fn test_server_error_is_connection_error() {
    let h = setup().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(503))
        .mount(&h.server)
        .await;

    let err = h.hue.lights().await.unwrap_err();

    assert!(matches!(err, CoreError::Connection { status: Some(503), .. }));
    assert_eq!(h.nav.visited(), vec![Screen::ConnectBridge]);
}

struct FailingNavigator;

impl Navigator for FailingNavigator {
    fn navigate(&self, _screen: Screen) -> Result<(), NavigationError> {
        Err("already on that screen".into())
    }
}

#[tokio::test]
async fn test_navigation_failure_does_not_mask_error() {
    let server = MockServer::start().await;
    let hue = Hue::new(
        config_for(&server),
        Arc::new(MemoryStore::new()),
        Arc::new(FailingNavigator),
    )
    .unwrap();

    let err = hue.light("1").await.unwrap_err();

    assert!(matches!(err, CoreError::NotConfigured));
}

// ── Connect / disconnect ────────────────────────────────────────────

#[tokio::test]
async fn test_connect_stores_address_and_username() {
    let h = setup_with(MemoryStore::new()).await;
    Mock::given(method("POST"))
        .and(path("/api/"))
        .and(body_json(json!({ "devicetype": "huely#cli" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "success": { "username": "issued-user" } }])),
        )
        .expect(1)
        .mount(&h.server)
        .await;

    let pairing = h.hue.connect("127.0.0.1").await.unwrap();

    assert_eq!(pairing.address.to_string(), "127.0.0.1");
    assert_eq!(
        h.store.get(SettingKey::BridgeUsername).unwrap().as_deref(),
        Some("issued-user")
    );
    assert!(h.hue.status().unwrap().configured);
}

#[tokio::test]
async fn test_connect_without_link_button_stores_nothing() {
    let h = setup_with(MemoryStore::new()).await;
    Mock::given(method("POST"))
        .and(path("/api/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "error": { "type": 101, "address": "", "description": "link button not pressed" } }
        ])))
        .mount(&h.server)
        .await;

    let err = h.hue.connect("127.0.0.1").await.unwrap_err();

    assert_eq!(err.to_string(), "link button not pressed");
    assert_eq!(h.store.get(SettingKey::BridgeAddress).unwrap(), None);
    assert!(!h.hue.status().unwrap().configured);
}

#[tokio::test]
async fn test_connect_rejects_bad_address_before_io() {
    let h = setup_with(MemoryStore::new()).await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&h.server)
        .await;

    let err = h.hue.connect("192.168.1.256").await.unwrap_err();

    assert_eq!(err.to_string(), "IP address numbers must be between 0 and 255");
}

#[tokio::test]
async fn test_disconnect_keeps_primary_group() {
    let h = setup().await;
    h.store.set(SettingKey::PrimaryGroup, "1").unwrap();

    h.hue.disconnect().unwrap();

    let status = h.hue.status().unwrap();
    assert!(!status.configured);
    assert_eq!(status.primary_group.as_deref(), Some("1"));
}

#[tokio::test]
async fn test_discover_uses_configured_endpoint() {
    let h = setup().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "internalipaddress": "192.168.1.20", "port": 443 }])),
        )
        .mount(&h.server)
        .await;

    let bridges = h.hue.discover().await.unwrap();

    assert_eq!(bridges.len(), 1);
    assert_eq!(bridges[0].address.to_string(), "192.168.1.20");
}

// ── Primary group ───────────────────────────────────────────────────

#[tokio::test]
async fn test_toggle_primary_without_selection() {
    let h = setup().await;

    let err = h.hue.toggle_primary_group().await.unwrap_err();

    assert!(matches!(err, CoreError::NoPrimaryGroup));
    assert_eq!(h.nav.visited(), vec![Screen::SelectPrimaryGroup]);
}

#[tokio::test]
async fn test_select_primary_rejects_single_light_group() {
    let h = setup().await;
    Mock::given(method("GET"))
        .and(path(user_path("groups/5")))
        .respond_with(ResponseTemplate::new(200).set_body_json(group_json("Lamp", &["3"], false)))
        .mount(&h.server)
        .await;

    let err = h.hue.select_primary_group("5").await.unwrap_err();

    assert!(matches!(err, CoreError::NotFound { .. }));
    assert_eq!(h.hue.primary_group().unwrap(), None);
}

#[tokio::test]
async fn test_select_then_toggle_primary() {
    let h = setup().await;
    Mock::given(method("GET"))
        .and(path(user_path("groups/1")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(group_json("Kitchen", &["1", "2"], false)),
        )
        .mount(&h.server)
        .await;
    Mock::given(method("PUT"))
        .and(path(user_path("groups/1/action")))
        .and(body_json(json!({ "on": true })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(success("/groups/1/action/on", json!(true))),
        )
        .expect(1)
        .mount(&h.server)
        .await;

    h.hue.select_primary_group("1").await.unwrap();
    let toggle = h.hue.toggle_primary_group().await.unwrap().unwrap();

    assert_eq!(h.hue.primary_group().unwrap().as_deref(), Some("1"));
    assert!(toggle.on);
    assert!(h.nav.visited().is_empty());
}
