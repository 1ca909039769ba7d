// crates/booking-server/src/server/tests.rs
// ============================================================================
// Module: Booking Server Unit Tests
// Description: Handler tests for transition, health, and fallback routes.
// Purpose: Validate status codes, bodies, and audit events end to end.
// Dependencies: booking-server
// ============================================================================

//! ## Overview
//! Calls axum handlers directly with in-memory stores and bearer sessions.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only handler assertions."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Mutex;

use axum::body::Bytes;
use axum::body::to_bytes;
use axum::extract::ConnectInfo;
use axum::extract::OriginalUri;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::http::Uri;
use axum::http::header::AUTHORIZATION;
use axum::response::IntoResponse;
use axum::response::Response;
use booking_config::BookingGateConfig;
use booking_config::SessionConfig;
use booking_config::SessionMode;
use booking_core::InMemoryRecordStore;
use booking_core::Record;
use booking_core::RecordId;
use booking_core::RecordStore;
use booking_core::Role;
use booking_core::Session;
use booking_core::SharedRecordStore;
use booking_core::Status;
use booking_core::TransitionTable;
use booking_core::default_transition_rules;
use serde_json::Value;
use serde_json::json;

use super::BookingServer;
use super::ServerError;
use super::ServerState;
use super::handle_health;
use super::handle_not_found;
use super::handle_transition;
use super::parse_transition_path;
use super::split_route;
use crate::audit::AuditDecision;
use crate::audit::AuditOutcome;
use crate::audit::TransitionAuditEvent;
use crate::audit::TransitionAuditSink;
use crate::auth::BearerTokenResolver;
use crate::auth::SESSION_HEADER;
use crate::auth::resolver_from_config;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

#[derive(Default)]
struct TestAudit {
    events: Mutex<Vec<TransitionAuditEvent>>,
}

impl TransitionAuditSink for TestAudit {
    fn record(&self, event: &TransitionAuditEvent) {
        self.events.lock().expect("events lock").push(event.clone());
    }
}

struct Fixture {
    state: Arc<ServerState>,
    store: InMemoryRecordStore,
    audit: Arc<TestAudit>,
}

fn fixture() -> Fixture {
    let store = InMemoryRecordStore::new();
    store.register(&Record::pending("u123", Role::CategoryManager)).expect("register u123");
    store
        .register(&Record::pending("s42", Role::Supplier).with_category("food").with_inn("7701"))
        .expect("register s42");
    let resolver = BearerTokenResolver::new([
        ("manager-token".to_string(), Session::for_role("m1", Role::DmpManager)),
        ("cm-token".to_string(), Session::for_role("c1", Role::CategoryManager)),
    ]);
    let audit = Arc::new(TestAudit::default());
    let table = TransitionTable::new(default_transition_rules()).expect("default table");
    let state = Arc::new(ServerState::new(
        SharedRecordStore::from_store(store.clone()),
        table,
        Arc::new(resolver),
        Arc::clone(&audit) as Arc<dyn TransitionAuditSink>,
    ));
    Fixture {
        state,
        store,
        audit,
    }
}

fn peer() -> ConnectInfo<SocketAddr> {
    ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 40000)))
}

fn bearer(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}")).unwrap());
    headers
}

async fn post(state: &Arc<ServerState>, route: &str, headers: HeaderMap) -> Response {
    handle_transition(
        State(Arc::clone(state)),
        peer(),
        OriginalUri(format!("/api/{route}").parse::<Uri>().expect("request uri")),
        headers,
        Bytes::new(),
    )
    .await
}

async fn json_body(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("response body bytes");
    (status, serde_json::from_slice(&bytes).expect("response body json"))
}

fn status_of(store: &InMemoryRecordStore, id: &str) -> Status {
    store.load(&RecordId::from(id)).expect("load").expect("record present").status
}

// ============================================================================
// SECTION: Transitions
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn manager_rejects_category_manager() {
    let fixture = fixture();
    let response =
        post(&fixture.state, "category-managers/u123/reject", bearer("manager-token")).await;
    let (status, body) = json_body(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Category Manager rejected successfully"}));
    assert_eq!(status_of(&fixture.store, "u123"), Status::Rejected);

    let events = fixture.audit.events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].decision, AuditDecision::Allow);
    assert_eq!(events[0].outcome, AuditOutcome::Success);
    assert_eq!(events[0].actor_id.as_deref(), Some("m1"));
    assert_eq!(events[0].peer_ip.as_deref(), Some("127.0.0.1"));
    assert!(events[0].token_fingerprint.is_some());
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_session_is_unauthorized() {
    let fixture = fixture();
    let response = post(&fixture.state, "suppliers/s42/approve", HeaderMap::new()).await;
    let (status, body) = json_body(response).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"error": "Unauthorized"}));
    assert_eq!(fixture.store.update_count(), 0);

    let events = fixture.audit.events.lock().unwrap();
    assert_eq!(events[0].decision, AuditDecision::Deny);
    assert_eq!(events[0].outcome, AuditOutcome::Unauthorized);
    assert!(events[0].actor_id.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn wrong_role_and_unknown_token_look_identical() {
    let fixture = fixture();
    let wrong_role =
        json_body(post(&fixture.state, "suppliers/s42/approve", bearer("cm-token")).await).await;
    let unknown =
        json_body(post(&fixture.state, "suppliers/s42/approve", bearer("guess")).await).await;
    assert_eq!(wrong_role, unknown);
    assert_eq!(wrong_role.0, StatusCode::UNAUTHORIZED);
    assert_eq!(status_of(&fixture.store, "s42"), Status::Pending);

    let events = fixture.audit.events.lock().unwrap();
    assert_eq!(events[0].error.as_deref(), Some("role CATEGORY_MANAGER not permitted"));
    assert_eq!(events[1].error.as_deref(), Some("invalid session: unknown bearer token"));
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_record_is_internal_error() {
    let fixture = fixture();
    let response = post(&fixture.state, "suppliers/nope/approve", bearer("manager-token")).await;
    let (status, body) = json_body(response).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "record not found: nope"}));
    assert_eq!(fixture.audit.events.lock().unwrap()[0].outcome, AuditOutcome::Failed);
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_id_is_internal_error_without_store_write() {
    let fixture = fixture();
    let response = post(&fixture.state, "suppliers//approve", bearer("manager-token")).await;
    let (status, body) = json_body(response).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "record id must be non-empty"}));
    assert_eq!(fixture.store.update_count(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn encoded_slash_stays_inside_the_id() {
    let fixture = fixture();
    fixture.store.register(&Record::pending("a/b", Role::Supplier)).unwrap();
    let response = post(&fixture.state, "suppliers/a%2Fb/approve", bearer("manager-token")).await;
    let (status, body) = json_body(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Supplier approved successfully"}));
    assert_eq!(status_of(&fixture.store, "a/b"), Status::Approved);
    assert_eq!(fixture.audit.events.lock().unwrap()[0].record_id, "a/b");
}

#[tokio::test]
async fn current_thread_runtime_runs_inline() {
    let fixture = fixture();
    let response = post(&fixture.state, "suppliers/s42/approve", bearer("manager-token")).await;
    let (status, body) = json_body(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Supplier approved successfully"}));
}

#[tokio::test(flavor = "multi_thread")]
async fn request_id_header_reaches_audit() {
    let fixture = fixture();
    let mut headers = bearer("manager-token");
    headers.insert("x-request-id", HeaderValue::from_static("req-7"));
    let _ = post(&fixture.state, "suppliers/s42/reject", headers).await;
    let events = fixture.audit.events.lock().unwrap();
    assert_eq!(events[0].request_id.as_deref(), Some("req-7"));
    assert_eq!(events[0].record_id, "s42");
}

// ============================================================================
// SECTION: Routing
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn unknown_routes_are_not_found() {
    let fixture = fixture();
    for route in ["suppliers/s42/delete", "bookings/b1/approve", "suppliers/s42", "a/b/c/d"] {
        let (status, body) =
            json_body(post(&fixture.state, route, bearer("manager-token")).await).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "route {route}");
        assert_eq!(body, json!({"error": "Not Found"}));
    }
    assert!(fixture.audit.events.lock().unwrap().is_empty());
    assert_eq!(fixture.store.update_count(), 0);
}

#[tokio::test]
async fn fallback_is_not_found() {
    let (status, body) = json_body(handle_not_found().await).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Not Found"}));
}

#[tokio::test]
async fn health_endpoint_ok() {
    let (status, body) = json_body(handle_health().await.into_response()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[test]
fn transition_path_decodes_each_segment() {
    assert_eq!(
        parse_transition_path("/api/suppliers/a%2Fb%20c/approve"),
        Some(("suppliers".to_string(), "a/b c".to_string(), "approve".to_string()))
    );
    assert_eq!(
        parse_transition_path("/api/suppliers//approve"),
        Some(("suppliers".to_string(), String::new(), "approve".to_string()))
    );
    assert_eq!(parse_transition_path("/api/suppliers/a/b/approve"), None);
    assert_eq!(parse_transition_path("/api/suppliers/%FF/approve"), None);
    assert_eq!(parse_transition_path("/other/suppliers/s1/approve"), None);
}

#[test]
fn split_route_keeps_empty_id() {
    assert_eq!(split_route("suppliers//approve"), Some(("suppliers", "", "approve")));
    assert_eq!(split_route("suppliers/s1/approve"), Some(("suppliers", "s1", "approve")));
    assert_eq!(split_route("/s1/approve"), None);
    assert_eq!(split_route("suppliers/s1/"), None);
}

// ============================================================================
// SECTION: Construction
// ============================================================================

#[test]
fn from_config_defaults_to_memory_store() {
    let server = BookingServer::from_config(BookingGateConfig::default()).expect("server");
    assert_eq!(server.state.table.len(), 4);
    let _router = server.router();
}

#[test]
fn from_config_rejects_invalid_config() {
    let mut config = BookingGateConfig::default();
    config.server.bind = "nowhere".to_string();
    let err = BookingServer::from_config(config).err().expect("invalid config");
    assert!(matches!(err, ServerError::Config(_)));
}

#[test]
fn from_config_opens_sqlite_store_and_audit_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let toml = format!(
        "[server.audit]\npath = \"{}\"\n\n[store]\ntype = \"sqlite\"\npath = \"{}\"\n",
        dir.path().join("audit.jsonl").display(),
        dir.path().join("records.db").display()
    );
    let config: BookingGateConfig = toml::from_str(&toml).unwrap();
    let _server = BookingServer::from_config(config).expect("server");
    assert!(dir.path().join("records.db").exists());
    assert!(dir.path().join("audit.jsonl").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn trusted_header_sessions_drive_the_gate() {
    let store = InMemoryRecordStore::new();
    store.register(&Record::pending("s42", Role::Supplier)).unwrap();
    let session_config = SessionConfig {
        mode: SessionMode::TrustedHeader,
        ..SessionConfig::default()
    };
    let state = Arc::new(ServerState::new(
        SharedRecordStore::from_store(store.clone()),
        TransitionTable::default(),
        resolver_from_config(&session_config),
        Arc::new(TestAudit::default()),
    ));
    let mut headers = HeaderMap::new();
    let session = json!({"user": {"id": "m1", "role": "DMP_MANAGER", "status": "APPROVED"}});
    headers.insert(SESSION_HEADER, HeaderValue::from_str(&session.to_string()).unwrap());
    let (status, _) = json_body(post(&state, "suppliers/s42/approve", headers).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(status_of(&store, "s42"), Status::Approved);
}
