// crates/booking-server/src/server.rs
// ============================================================================
// Module: Booking Gate HTTP Server
// Description: Axum server exposing transition and health endpoints.
// Purpose: Route requests through session resolution, gate, and executor.
// Dependencies: booking-core, booking-config, booking-store-sqlite, axum, tokio
// ============================================================================

//! ## Overview
//! Routes:
//! - `POST /api/{collection}/{id}/{action}`: run the transition configured
//!   for `(collection, action)`. Unknown routes return `404`.
//! - `GET /health`: liveness check.
//!
//! Path segments are split on the raw URI and percent-decoded individually,
//! so record ids may contain an encoded `/`. The request body is ignored
//! beyond the configured size limit. Store calls are synchronous and run
//! under `block_in_place` on the multi-thread runtime.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::borrow::Cow;
use std::io::Write;
use std::net::SocketAddr;
use std::path::Path as FsPath;
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::ConnectInfo;
use axum::extract::DefaultBodyLimit;
use axum::extract::OriginalUri;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use booking_config::BookingGateConfig;
use booking_config::ServerAuditConfig;
use booking_config::SessionMode;
use booking_config::StoreConfig;
use booking_config::StoreType;
use booking_core::GateError;
use booking_core::InMemoryRecordStore;
use booking_core::SharedRecordStore;
use booking_core::TransitionError;
use booking_core::TransitionExecutor;
use booking_core::TransitionResponse;
use booking_core::TransitionRule;
use booking_core::TransitionSuccess;
use booking_core::TransitionTable;
use booking_store_sqlite::SqliteRecordStore;
use serde_json::json;

use crate::audit::AuditDecision;
use crate::audit::AuditOutcome;
use crate::audit::FileAuditSink;
use crate::audit::NoopAuditSink;
use crate::audit::StderrAuditSink;
use crate::audit::TransitionAuditEvent;
use crate::audit::TransitionAuditSink;
use crate::auth::REQUEST_ID_HEADER;
use crate::auth::RequestContext;
use crate::auth::SESSION_HEADER;
use crate::auth::SessionResolver;
use crate::auth::resolver_from_config;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum accepted request identifier length; longer values are dropped.
const MAX_REQUEST_ID_LENGTH: usize = 128;
/// Raw path prefix shared by every transition route.
const TRANSITION_PATH_PREFIX: &str = "/api/";

// ============================================================================
// SECTION: Booking Server
// ============================================================================

/// Booking Gate HTTP server instance.
pub struct BookingServer {
    /// Server configuration.
    config: BookingGateConfig,
    /// Shared handler state.
    state: Arc<ServerState>,
}

impl BookingServer {
    /// Builds a server from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when configuration is invalid or the store or
    /// audit sink cannot be initialized.
    pub fn from_config(config: BookingGateConfig) -> Result<Self, ServerError> {
        config.validate().map_err(|err| ServerError::Config(err.to_string()))?;
        let table =
            config.transition_table().map_err(|err| ServerError::Config(err.to_string()))?;
        let store = build_record_store(&config.store)?;
        let resolver = resolver_from_config(&config.server.session);
        let audit = build_audit_sink(&config.server.audit)?;
        emit_trusted_header_warning(&config);
        let state = Arc::new(ServerState::new(store, table, resolver, audit));
        Ok(Self {
            config,
            state,
        })
    }

    /// Returns the axum router for this server.
    #[must_use]
    pub fn router(&self) -> Router {
        build_router(Arc::clone(&self.state), self.config.server.max_body_bytes)
    }

    /// Binds the configured address and serves requests until shutdown.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when binding or serving fails.
    pub async fn serve(self) -> Result<(), ServerError> {
        let addr =
            self.config.server.bind_addr().map_err(|err| ServerError::Config(err.to_string()))?;
        let app = self.router();
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|err| ServerError::Transport(format!("http bind failed: {err}")))?;
        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .await
            .map_err(|err| ServerError::Transport(format!("http server failed: {err}")))
    }
}

/// Builds the record store from configuration.
fn build_record_store(config: &StoreConfig) -> Result<SharedRecordStore, ServerError> {
    let store = match config.store_type {
        StoreType::Memory => SharedRecordStore::from_store(InMemoryRecordStore::new()),
        StoreType::Sqlite => {
            let sqlite_config = config.sqlite_config().ok_or_else(|| {
                ServerError::Config("sqlite store requires path".to_string())
            })?;
            let store = SqliteRecordStore::new(&sqlite_config)
                .map_err(|err| ServerError::Init(err.to_string()))?;
            SharedRecordStore::from_store(store)
        }
    };
    Ok(store)
}

/// Builds the audit sink from configuration.
fn build_audit_sink(
    config: &ServerAuditConfig,
) -> Result<Arc<dyn TransitionAuditSink>, ServerError> {
    if !config.enabled {
        return Ok(Arc::new(NoopAuditSink));
    }
    match &config.path {
        Some(path) => {
            let sink = FileAuditSink::new(FsPath::new(path.trim()))
                .map_err(|err| ServerError::Init(format!("audit log open failed: {err}")))?;
            Ok(Arc::new(sink))
        }
        None => Ok(Arc::new(StderrAuditSink)),
    }
}

/// Warns when forwarded sessions are accepted on a non-loopback address.
fn emit_trusted_header_warning(config: &BookingGateConfig) {
    if config.server.session.mode != SessionMode::TrustedHeader {
        return;
    }
    if let Ok(addr) = config.server.bind_addr()
        && !addr.ip().is_loopback()
    {
        let _ = writeln!(
            std::io::stderr(),
            "booking-gate: WARNING: trusted_header sessions on non-loopback bind {addr}; the \
             upstream proxy must strip client-supplied {SESSION_HEADER} headers"
        );
    }
}

// ============================================================================
// SECTION: Server State
// ============================================================================

/// Shared state for HTTP handlers.
struct ServerState {
    /// Transition executor over the configured store.
    executor: TransitionExecutor<SharedRecordStore>,
    /// Routes and their rules.
    table: TransitionTable,
    /// Session resolver.
    resolver: Arc<dyn SessionResolver>,
    /// Audit sink.
    audit: Arc<dyn TransitionAuditSink>,
}

impl ServerState {
    /// Builds handler state.
    fn new(
        store: SharedRecordStore,
        table: TransitionTable,
        resolver: Arc<dyn SessionResolver>,
        audit: Arc<dyn TransitionAuditSink>,
    ) -> Self {
        Self {
            executor: TransitionExecutor::new(store),
            table,
            resolver,
            audit,
        }
    }
}

/// Builds the axum router over shared state.
fn build_router(state: Arc<ServerState>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/api/{*route}", post(handle_transition))
        .route("/health", get(handle_health))
        .fallback(handle_not_found)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// Handles `POST /api/{collection}/{id}/{action}`.
async fn handle_transition(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    _body: Bytes,
) -> Response {
    let context = http_request_context(peer, &headers);
    let Some((collection, id, action)) = parse_transition_path(uri.path()) else {
        return into_http_response(&TransitionResponse::not_found());
    };
    let Some(rule) = state.table.lookup(&collection, &action) else {
        return into_http_response(&TransitionResponse::not_found());
    };
    let response = process_transition(&state, &context, rule, &id);
    into_http_response(&response)
}

/// Handles `GET /health`.
async fn handle_health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

/// Handles unmatched routes.
async fn handle_not_found() -> Response {
    into_http_response(&TransitionResponse::not_found())
}

// ============================================================================
// SECTION: Transition Processing
// ============================================================================

/// Resolves the session, runs the gate and executor, and audits the result.
fn process_transition(
    state: &ServerState,
    context: &RequestContext,
    rule: &TransitionRule,
    id: &str,
) -> TransitionResponse {
    let resolved = state.resolver.resolve(context);
    let session = resolved.as_ref().ok().map(|resolved| &resolved.session);
    let outcome = run_with_blocking(|| state.executor.run(session, rule, id));

    let (decision, audit_outcome, error) = match &outcome {
        Ok(_) => (AuditDecision::Allow, AuditOutcome::Success, None),
        Err(TransitionError::Gate(GateError::Unauthorized)) => {
            let reason = match &resolved {
                Err(err) => err.to_string(),
                Ok(resolved) => format!("role {} not permitted", resolved.session.role()),
            };
            (AuditDecision::Deny, AuditOutcome::Unauthorized, Some(reason))
        }
        Err(TransitionError::Execution(err)) => {
            (AuditDecision::Allow, AuditOutcome::Failed, Some(err.to_string()))
        }
    };
    let mut event = TransitionAuditEvent::new(
        rule.collection.as_str(),
        rule.action.as_str(),
        id,
        decision,
        audit_outcome,
    );
    event.request_id.clone_from(&context.request_id);
    event.peer_ip = context.peer_ip.map(|ip| ip.to_string());
    if let Ok(resolved) = &resolved {
        event.actor_id = Some(resolved.session.user.id.to_string());
        event.actor_role = Some(resolved.session.role());
        event.token_fingerprint.clone_from(&resolved.token_fingerprint);
    }
    event.error = error;
    state.audit.record(&event);

    TransitionResponse::from_outcome(&outcome)
}

/// Runs a store-bound closure, shifting to a blocking context when available.
fn run_with_blocking(
    call: impl FnOnce() -> Result<TransitionSuccess, TransitionError>,
) -> Result<TransitionSuccess, TransitionError> {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == tokio::runtime::RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(call)
        }
        _ => call(),
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses `/api/{collection}/{id}/{action}` from a raw request path.
fn parse_transition_path(path: &str) -> Option<(String, String, String)> {
    let route = path.strip_prefix(TRANSITION_PATH_PREFIX)?;
    let (collection, id, action) = split_route(route)?;
    Some((decode_segment(collection)?, decode_segment(id)?, decode_segment(action)?))
}

/// Percent-decodes one path segment. Invalid UTF-8 yields `None`.
fn decode_segment(segment: &str) -> Option<String> {
    urlencoding::decode(segment).ok().map(Cow::into_owned)
}

/// Splits a raw `collection/id/action` route. The id may be empty.
fn split_route(route: &str) -> Option<(&str, &str, &str)> {
    let mut parts = route.split('/');
    let collection = parts.next()?;
    let id = parts.next()?;
    let action = parts.next()?;
    if parts.next().is_some() || collection.is_empty() || action.is_empty() {
        return None;
    }
    Some((collection, id, action))
}

/// Builds the request context from connection info and headers.
fn http_request_context(peer: SocketAddr, headers: &HeaderMap) -> RequestContext {
    let header_text = |name: &str| {
        headers.get(name).and_then(|value| value.to_str().ok()).map(str::to_string)
    };
    let auth_header =
        headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok()).map(str::to_string);
    let context = RequestContext::http(Some(peer.ip()), auth_header, header_text(SESSION_HEADER));
    match header_text(REQUEST_ID_HEADER) {
        Some(request_id) if !request_id.is_empty() && request_id.len() <= MAX_REQUEST_ID_LENGTH => {
            context.with_request_id(request_id)
        }
        _ => context,
    }
}

/// Converts a transport-neutral response into an axum response.
fn into_http_response(response: &TransitionResponse) -> Response {
    let status =
        StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(response.body.clone())).into_response()
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Booking Gate server errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
