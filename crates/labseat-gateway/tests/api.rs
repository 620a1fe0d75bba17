//! Router tests against a mocked DNS provider, a temporary proxy config
//! directory and a temporary store.

use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use labseat_control::{
    AddressSource, ControlPlaneService, NoAddressSource, ProxyConfigSettings, ProxyConfigStore,
    ProxyError, Reloader, SeatConfig, StaticAddressSource,
};
use labseat_dns::{CloudflareClient, DnsConfig};
use labseat_gateway::{create_router, GatewayConfig, GatewayState};
use labseat_store::RocksStore;

const RECORDS_PATH: &str = "/zones/zone-1/dns_records";

#[derive(Default)]
struct CountingReloader {
    reloads: AtomicUsize,
}

#[async_trait]
impl Reloader for CountingReloader {
    async fn reload(&self) -> Result<(), ProxyError> {
        self.reloads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct TestApp {
    server: TestServer,
    provider: MockServer,
    reloader: Arc<CountingReloader>,
    conf_dir: TempDir,
    _db_dir: TempDir,
}

impl TestApp {
    async fn start() -> Self {
        let vm: IpAddr = "10.0.0.7".parse().unwrap();
        Self::start_with(Arc::new(StaticAddressSource::new(vm)), seat_config()).await
    }

    async fn start_with(addresses: Arc<dyn AddressSource>, seat_config: SeatConfig) -> Self {
        let provider = MockServer::start().await;
        let db_dir = TempDir::new().unwrap();
        let conf_dir = TempDir::new().unwrap();

        let store = Arc::new(RocksStore::open(db_dir.path()).unwrap());
        let dns = Arc::new(
            CloudflareClient::new(DnsConfig {
                base_url: provider.uri(),
                zone_id: "zone-1".to_string(),
                api_token: "test-token".to_string(),
                ..DnsConfig::default()
            })
            .unwrap(),
        );
        let reloader = Arc::new(CountingReloader::default());
        let proxy = Arc::new(ProxyConfigStore::new(
            ProxyConfigSettings {
                config_dir: conf_dir.path().to_path_buf(),
                ..ProxyConfigSettings::default()
            },
            Arc::clone(&reloader) as Arc<dyn Reloader>,
        ));

        let control = Arc::new(ControlPlaneService::new(
            store,
            dns,
            proxy,
            addresses,
            seat_config,
        ));
        let state = GatewayState::new(control, GatewayConfig::default());
        let server = TestServer::new(create_router(state)).unwrap();

        Self {
            server,
            provider,
            reloader,
            conf_dir,
            _db_dir: db_dir,
        }
    }

    fn conf_path(&self, server_name: &str) -> PathBuf {
        self.conf_dir.path().join(format!("{server_name}.conf"))
    }

    fn reloads(&self) -> usize {
        self.reloader.reloads.load(Ordering::SeqCst)
    }
}

fn seat_config() -> SeatConfig {
    SeatConfig {
        seat_domain: "lab.io".to_string(),
        ip_wait_timeout_seconds: 2,
        poll_interval: Duration::from_millis(10),
        ..SeatConfig::default()
    }
}

fn record(id: &str, name: &str, record_type: &str) -> Value {
    json!({
        "id": id,
        "type": record_type,
        "name": name,
        "content": "10.0.0.7",
        "ttl": 3600
    })
}

fn list_page(records: Vec<Value>) -> Value {
    json!({
        "success": true,
        "errors": [],
        "result": records,
        "result_info": { "page": 1, "per_page": 100, "total_pages": 1 }
    })
}

fn created(record: Value) -> Value {
    json!({ "success": true, "errors": [], "result": record })
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn health_is_ok() {
    let app = TestApp::start().await;

    let response = app.server.get("/health").await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "ok");
}

// =============================================================================
// Seats
// =============================================================================

#[tokio::test]
async fn create_seat_routes_and_publishes() {
    let app = TestApp::start().await;

    Mock::given(method("POST"))
        .and(path(RECORDS_PATH))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(created(record("rec-1", "doe-sfb.lab.io", "A"))),
        )
        .expect(1)
        .mount(&app.provider)
        .await;

    let response = app
        .server
        .post("/seat")
        .json(&json!({ "last_name": "Doe", "training_name": "SFB" }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body = response.json::<Value>();
    assert_eq!(body["server_name"], "doe-sfb.lab.io");
    assert_eq!(body["address"], "10.0.0.7");
    assert_eq!(body["proxy_pass"], "http://10.0.0.7:8080");
    assert_eq!(body["dns_record_id"], "rec-1");

    let conf = std::fs::read_to_string(app.conf_path("doe-sfb.lab.io")).unwrap();
    assert!(conf.contains("proxy_pass http://10.0.0.7:8080;"));
    assert_eq!(app.reloads(), 1);
}

#[tokio::test]
async fn create_seat_times_out_with_504() {
    let app = TestApp::start_with(Arc::new(NoAddressSource), seat_config()).await;

    let response = app
        .server
        .post("/seat")
        .json(&json!({ "last_name": "doe", "training_name": "sfb" }))
        .await;

    response.assert_status(StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(response.json::<Value>()["code"], "timeout");
    assert!(!app.conf_path("doe-sfb.lab.io").exists());
    assert_eq!(app.reloads(), 0);
}

#[tokio::test]
async fn create_seat_rejects_blank_parts() {
    let app = TestApp::start().await;

    let response = app
        .server
        .post("/seat")
        .json(&json!({ "last_name": "", "training_name": "sfb" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "bad_request");
}

#[tokio::test]
async fn delete_seat_removes_both() {
    let app = TestApp::start().await;

    Mock::given(method("GET"))
        .and(path(RECORDS_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(list_page(vec![record("rec-1", "doe-sfb.lab.io", "A")])),
        )
        .mount(&app.provider)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("{RECORDS_PATH}/rec-1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(created(json!({ "id": "rec-1" }))))
        .expect(1)
        .mount(&app.provider)
        .await;

    app.server
        .post("/proxy-config")
        .json(&json!({ "server_name": "doe-sfb.lab.io", "proxy_pass": "http://10.0.0.7:8080" }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = app
        .server
        .delete("/seat")
        .json(&json!({ "last_name": "doe", "training_name": "sfb" }))
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["dns"]["status"], "deleted");
    assert_eq!(body["proxy"]["status"], "deleted");
    assert!(!app.conf_path("doe-sfb.lab.io").exists());
    assert_eq!(app.reloads(), 2);
}

#[tokio::test]
async fn delete_seat_reports_partial_failure() {
    let app = TestApp::start().await;

    Mock::given(method("GET"))
        .and(path(RECORDS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_page(Vec::new())))
        .mount(&app.provider)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.provider)
        .await;

    app.server
        .post("/proxy-config")
        .json(&json!({ "server_name": "doe-sfb.lab.io", "proxy_pass": "http://10.0.0.7:8080" }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = app
        .server
        .delete("/seat")
        .json(&json!({ "last_name": "doe", "training_name": "sfb" }))
        .await;

    response.assert_status(StatusCode::MULTI_STATUS);
    let body = response.json::<Value>();
    assert_eq!(body["server_name"], "doe-sfb.lab.io");
    assert_eq!(body["dns"]["status"], "failed");
    assert_eq!(body["proxy"]["status"], "deleted");
    assert!(!app.conf_path("doe-sfb.lab.io").exists());
}

#[tokio::test]
async fn wait_ip_returns_address() {
    let app = TestApp::start().await;

    let response = app.server.get("/wait-ip").await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({ "ip": "10.0.0.7" }));
}

// =============================================================================
// DNS
// =============================================================================

#[tokio::test]
async fn list_records_preserves_provider_order() {
    let app = TestApp::start().await;

    Mock::given(method("GET"))
        .and(path(RECORDS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_page(vec![
            record("2", "b.lab.io", "A"),
            record("1", "a.lab.io", "TXT"),
        ])))
        .mount(&app.provider)
        .await;

    let response = app.server.get("/dns-records").await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["records"][0]["id"], "2");
    assert_eq!(body["records"][1]["type"], "TXT");
}

#[tokio::test]
async fn provider_failure_is_bad_gateway() {
    let app = TestApp::start().await;

    Mock::given(method("GET"))
        .and(path(RECORDS_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "success": false,
            "errors": [{ "code": 10000, "message": "Authentication error" }]
        })))
        .mount(&app.provider)
        .await;

    let response = app.server.get("/dns-records").await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    let body = response.json::<Value>();
    assert_eq!(body["code"], "upstream_error");
    assert!(body["error"].as_str().unwrap().contains("Authentication error"));
}

#[tokio::test]
async fn create_record_defaults_ttl() {
    let app = TestApp::start().await;

    Mock::given(method("POST"))
        .and(path(RECORDS_PATH))
        .and(wiremock::matchers::body_json(json!({
            "type": "A",
            "name": "a.lab.io",
            "content": "10.0.0.1",
            "ttl": 3600
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(created(record("rec-9", "a.lab.io", "A"))))
        .expect(1)
        .mount(&app.provider)
        .await;

    let response = app
        .server
        .post("/dns-record")
        .json(&json!({ "name": "a.lab.io", "content": "10.0.0.1" }))
        .await;

    response.assert_status(StatusCode::CREATED);
    assert_eq!(response.json::<Value>()["id"], "rec-9");
}

#[tokio::test]
async fn create_record_rejects_non_ipv4_content() {
    let app = TestApp::start().await;

    let response = app
        .server
        .post("/dns-record")
        .json(&json!({ "name": "a.lab.io", "content": "somewhere" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_by_name_deletes_first_match_only() {
    let app = TestApp::start().await;

    Mock::given(method("GET"))
        .and(path(RECORDS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_page(vec![
            record("1", "x.lab.io", "A"),
            record("2", "x.lab.io", "A"),
        ])))
        .mount(&app.provider)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("{RECORDS_PATH}/1")))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.provider)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("{RECORDS_PATH}/2")))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.provider)
        .await;

    let response = app
        .server
        .delete("/dns-record/by-name")
        .json(&json!({ "record_name": "x.lab.io" }))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({ "record_id": "1" }));
}

#[tokio::test]
async fn delete_by_name_without_match_is_404() {
    let app = TestApp::start().await;

    Mock::given(method("GET"))
        .and(path(RECORDS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_page(vec![record(
            "1", "x.lab.io", "TXT",
        )])))
        .mount(&app.provider)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.provider)
        .await;

    let response = app
        .server
        .delete("/dns-record/by-name")
        .json(&json!({ "record_name": "x.lab.io", "record_type": "A" }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["code"], "not_found");
}

#[tokio::test]
async fn delete_record_by_unknown_id_is_404() {
    let app = TestApp::start().await;

    Mock::given(method("DELETE"))
        .and(path(format!("{RECORDS_PATH}/gone")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&app.provider)
        .await;

    let response = app
        .server
        .delete("/dns-record")
        .json(&json!({ "record_id": "gone" }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

// =============================================================================
// Proxy
// =============================================================================

#[tokio::test]
async fn proxy_config_lifecycle() {
    let app = TestApp::start().await;

    app.server
        .post("/proxy-config")
        .json(&json!({ "server_name": "b.lab.io", "proxy_pass": "http://10.0.0.2:8080" }))
        .await
        .assert_status(StatusCode::CREATED);
    app.server
        .post("/proxy-config")
        .json(&json!({ "server_name": "a.lab.io", "proxy_pass": "http://10.0.0.1:8080" }))
        .await
        .assert_status(StatusCode::CREATED);

    let listed = app.server.get("/proxy-configs").await;
    listed.assert_status_ok();
    assert_eq!(
        listed.json::<Value>(),
        json!({ "server_names": ["a.lab.io", "b.lab.io"] })
    );

    app.server
        .delete("/proxy-config")
        .json(&json!({ "server_name": "a.lab.io" }))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    assert!(!app.conf_path("a.lab.io").exists());
    assert_eq!(app.reloads(), 3);
}

#[tokio::test]
async fn delete_missing_proxy_config_is_404() {
    let app = TestApp::start().await;

    let response = app
        .server
        .delete("/proxy-config")
        .json(&json!({ "server_name": "missing.lab.io" }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(app.reloads(), 0);
}

#[tokio::test]
async fn proxy_config_rejects_path_traversal() {
    let app = TestApp::start().await;

    let response = app
        .server
        .post("/proxy-config")
        .json(&json!({ "server_name": "../../etc/passwd", "proxy_pass": "http://10.0.0.1:8080" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

// =============================================================================
// Users
// =============================================================================

fn jane() -> Value {
    json!({
        "first_name": "Jane",
        "last_name": "Doe",
        "mail": "jane.doe@example.com",
        "gender": "female",
        "roles": ["student"]
    })
}

#[tokio::test]
async fn user_lifecycle() {
    let app = TestApp::start().await;

    let created = app.server.post("/users").json(&jane()).await;
    created.assert_status(StatusCode::CREATED);
    let user = created.json::<Value>();
    let id = user["id"].as_str().unwrap().to_string();
    assert_eq!(user["roles"], json!(["student"]));

    let fetched = app.server.get(&format!("/users/{id}")).await;
    fetched.assert_status_ok();
    assert_eq!(fetched.json::<Value>(), user);

    let listed = app.server.get("/users").await;
    listed.assert_status_ok();
    assert_eq!(listed.json::<Value>()["users"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn users_without_id_get_distinct_ids() {
    let app = TestApp::start().await;

    let first = app.server.post("/users").json(&jane()).await.json::<Value>();
    let second = app.server.post("/users").json(&jane()).await.json::<Value>();

    assert_ne!(first["id"], second["id"]);
}

#[tokio::test]
async fn duplicate_user_id_conflicts() {
    let app = TestApp::start().await;
    let mut body = jane();
    body["id"] = json!("6f1c3c7e-2f57-4d8e-9a43-0d5b2b7c9e11");

    app.server
        .post("/users")
        .json(&body)
        .await
        .assert_status(StatusCode::CREATED);
    let response = app.server.post("/users").json(&body).await;

    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["code"], "conflict");
}

#[tokio::test]
async fn get_user_errors() {
    let app = TestApp::start().await;

    app.server
        .get("/users/not-a-uuid")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    app.server
        .get("/users/6f1c3c7e-2f57-4d8e-9a43-0d5b2b7c9e11")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_body_is_json_400() {
    let app = TestApp::start().await;

    let response = app
        .server
        .post("/users")
        .json(&json!({ "first_name": "Jane" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "bad_request");
}
