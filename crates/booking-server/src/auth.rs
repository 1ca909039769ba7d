// crates/booking-server/src/auth.rs
// ============================================================================
// Module: Session Resolution
// Description: Maps inbound request headers to an optional session.
// Purpose: Supply the gate with the caller's session without trusting input.
// Dependencies: booking-core, booking-config, serde_json
// ============================================================================

//! ## Overview
//! A [`SessionResolver`] turns a [`RequestContext`] into a
//! [`ResolvedSession`] or a [`SessionError`]. The server treats every error
//! as "no session" and lets the gate reject the request, so resolution
//! failures and role failures look the same to callers. Resolution reasons
//! only reach the audit log.
//!
//! Two resolvers are provided:
//! - [`BearerTokenResolver`]: static token table, constant-time lookup.
//! - [`TrustedHeaderResolver`]: session JSON forwarded by an upstream proxy.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::IpAddr;
use std::sync::Arc;

use booking_config::SessionConfig;
use booking_config::SessionMode;
use booking_core::Session;
use thiserror::Error;

use crate::security::constant_time_eq_str;
use crate::security::token_fingerprint;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum accepted size of any session-bearing header.
pub const MAX_SESSION_HEADER_BYTES: usize = 8 * 1024;
/// Header carrying a forwarded session in `trusted_header` mode.
pub const SESSION_HEADER: &str = "x-booking-session";
/// Header carrying a caller-supplied request identifier.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

// ============================================================================
// SECTION: Request Context
// ============================================================================

/// Per-request inputs used for session resolution and auditing.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Peer IP address when available.
    pub peer_ip: Option<IpAddr>,
    /// `Authorization` header value.
    pub auth_header: Option<String>,
    /// Forwarded session header value.
    pub session_header: Option<String>,
    /// Optional request identifier for auditing.
    pub request_id: Option<String>,
}

impl RequestContext {
    /// Builds an HTTP request context.
    #[must_use]
    pub const fn http(
        peer_ip: Option<IpAddr>,
        auth_header: Option<String>,
        session_header: Option<String>,
    ) -> Self {
        Self {
            peer_ip,
            auth_header,
            session_header,
            request_id: None,
        }
    }

    /// Returns a copy with the request identifier set.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

// ============================================================================
// SECTION: Resolved Session
// ============================================================================

/// Session produced by a resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSession {
    /// Caller session.
    pub session: Session,
    /// Bearer token fingerprint (sha256), when a token was used.
    pub token_fingerprint: Option<String>,
}

/// Session resolution failures. Never surfaced to callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// No credential was presented.
    #[error("missing session: {0}")]
    Missing(String),
    /// A credential was presented but rejected.
    #[error("invalid session: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Traits
// ============================================================================

/// Resolves the caller's session from request inputs.
pub trait SessionResolver: Send + Sync {
    /// Resolves a session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when no valid session is present.
    fn resolve(&self, ctx: &RequestContext) -> Result<ResolvedSession, SessionError>;
}

/// Builds the resolver selected by configuration.
#[must_use]
pub fn resolver_from_config(config: &SessionConfig) -> Arc<dyn SessionResolver> {
    match config.mode {
        SessionMode::BearerToken => Arc::new(BearerTokenResolver::from_config(config)),
        SessionMode::TrustedHeader => Arc::new(TrustedHeaderResolver),
    }
}

// ============================================================================
// SECTION: Bearer Tokens
// ============================================================================

/// Resolves sessions from a static bearer token table.
pub struct BearerTokenResolver {
    /// Token and session pairs.
    entries: Vec<(String, Session)>,
}

impl BearerTokenResolver {
    /// Builds a resolver from session configuration.
    #[must_use]
    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.tokens.iter().map(|entry| (entry.token.clone(), entry.session())))
    }

    /// Builds a resolver from token and session pairs.
    #[must_use]
    pub fn new(entries: impl IntoIterator<Item = (String, Session)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }
}

impl SessionResolver for BearerTokenResolver {
    fn resolve(&self, ctx: &RequestContext) -> Result<ResolvedSession, SessionError> {
        let token = parse_bearer_token(ctx.auth_header.as_deref())?;
        // Compare against every entry so timing does not reveal the match index.
        let mut matched = None;
        for (candidate, session) in &self.entries {
            if constant_time_eq_str(candidate, token) && matched.is_none() {
                matched = Some(session);
            }
        }
        let session =
            matched.ok_or_else(|| SessionError::Invalid("unknown bearer token".to_string()))?;
        Ok(ResolvedSession {
            session: session.clone(),
            token_fingerprint: Some(token_fingerprint(token)),
        })
    }
}

// ============================================================================
// SECTION: Trusted Header
// ============================================================================

/// Resolves sessions forwarded as JSON by a trusted upstream proxy.
pub struct TrustedHeaderResolver;

impl SessionResolver for TrustedHeaderResolver {
    fn resolve(&self, ctx: &RequestContext) -> Result<ResolvedSession, SessionError> {
        let header = ctx
            .session_header
            .as_deref()
            .ok_or_else(|| SessionError::Missing(format!("missing {SESSION_HEADER} header")))?;
        if header.len() > MAX_SESSION_HEADER_BYTES {
            return Err(SessionError::Invalid("session header too large".to_string()));
        }
        let session: Session = serde_json::from_str(header)
            .map_err(|_| SessionError::Invalid("malformed session header".to_string()))?;
        if session.user.id.is_blank() {
            return Err(SessionError::Invalid("session user id must be non-empty".to_string()));
        }
        Ok(ResolvedSession {
            session,
            token_fingerprint: None,
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Extracts the token from an `Authorization: Bearer <token>` header.
fn parse_bearer_token(auth_header: Option<&str>) -> Result<&str, SessionError> {
    let header =
        auth_header.ok_or_else(|| SessionError::Missing("missing authorization".to_string()))?;
    if header.len() > MAX_SESSION_HEADER_BYTES {
        return Err(SessionError::Invalid("authorization header too large".to_string()));
    }
    let mut parts = header.trim().splitn(2, ' ');
    let scheme = parts.next().unwrap_or_default();
    let token = parts.next().unwrap_or_default().trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(SessionError::Invalid("invalid authorization header".to_string()));
    }
    Ok(token)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
