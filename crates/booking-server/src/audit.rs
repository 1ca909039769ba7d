// crates/booking-server/src/audit.rs
// ============================================================================
// Module: Transition Audit Logging
// Description: Structured audit events for transition decisions.
// Purpose: Emit one JSON line per gate decision without a logging framework.
// Dependencies: booking-core, serde, serde_json
// ============================================================================

//! ## Overview
//! Every transition request that matches a route yields exactly one
//! [`TransitionAuditEvent`]. Events carry the acting user and, for bearer
//! tokens, a sha256 fingerprint; raw tokens and session payloads are never
//! logged. Sinks write JSON lines to stderr or an append-only file.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use booking_core::Role;
use booking_core::unix_millis;
use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Gate decision label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditDecision {
    /// The gate admitted the session.
    Allow,
    /// The gate rejected the session.
    Deny,
}

/// Request outcome label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    /// The status was written.
    Success,
    /// The gate rejected the request.
    Unauthorized,
    /// The executor or store failed.
    Failed,
}

/// Transition audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct TransitionAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: i64,
    /// Request identifier when provided.
    pub request_id: Option<String>,
    /// Peer IP address when available.
    pub peer_ip: Option<String>,
    /// Collection path segment.
    pub collection: String,
    /// Action path segment.
    pub action: String,
    /// Targeted record identifier.
    pub record_id: String,
    /// Acting user identifier when a session resolved.
    pub actor_id: Option<String>,
    /// Acting user role when a session resolved.
    pub actor_role: Option<Role>,
    /// Bearer token fingerprint (sha256) when a token was used.
    pub token_fingerprint: Option<String>,
    /// Gate decision.
    pub decision: AuditDecision,
    /// Request outcome.
    pub outcome: AuditOutcome,
    /// Failure detail. For denials this is the session resolution reason.
    pub error: Option<String>,
}

impl TransitionAuditEvent {
    /// Builds an event stamped with the current time.
    #[must_use]
    pub fn new(
        collection: impl Into<String>,
        action: impl Into<String>,
        record_id: impl Into<String>,
        decision: AuditDecision,
        outcome: AuditOutcome,
    ) -> Self {
        Self {
            event: "booking_transition",
            timestamp_ms: unix_millis(),
            request_id: None,
            peer_ip: None,
            collection: collection.into(),
            action: action.into(),
            record_id: record_id.into(),
            actor_id: None,
            actor_role: None,
            token_fingerprint: None,
            decision,
            outcome,
            error: None,
        }
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink for transition events.
pub trait TransitionAuditSink: Send + Sync {
    /// Records a transition audit event.
    fn record(&self, event: &TransitionAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl TransitionAuditSink for StderrAuditSink {
    fn record(&self, event: &TransitionAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that appends JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl TransitionAuditSink for FileAuditSink {
    fn record(&self, event: &TransitionAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl TransitionAuditSink for NoopAuditSink {
    fn record(&self, _event: &TransitionAuditEvent) {}
}

// ============================================================================
// SECTION: Tests
// ============================================================================
