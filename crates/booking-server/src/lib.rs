// crates/booking-server/src/lib.rs
// ============================================================================
// Module: Booking Gate Server
// Description: HTTP server exposing role-gated record status transitions.
// Purpose: Resolve sessions, run the gate and executor, and audit decisions.
// Dependencies: booking-core, booking-config, booking-store-sqlite, axum, tokio
// ============================================================================

//! ## Overview
//! The server maps `POST /api/{collection}/{id}/{action}` onto the configured
//! transition table. Each request resolves an optional session, passes it
//! through [`booking_core::authorize`], applies the update through
//! [`booking_core::TransitionExecutor`], and records one audit event.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod auth;
pub mod security;
pub mod server;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use audit::TransitionAuditEvent;
pub use audit::TransitionAuditSink;
pub use auth::BearerTokenResolver;
pub use auth::RequestContext;
pub use auth::ResolvedSession;
pub use auth::SessionError;
pub use auth::SessionResolver;
pub use auth::TrustedHeaderResolver;
pub use server::BookingServer;
pub use server::ServerError;
