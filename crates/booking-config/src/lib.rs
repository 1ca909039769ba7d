// crates/booking-config/src/lib.rs
// ============================================================================
// Module: Booking Gate Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for booking-gate.toml semantics.
// Dependencies: booking-core, booking-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `booking-config` defines the configuration model for the Booking Gate
//! server: bind address, session resolution, audit output, record store, and
//! the transition table. Validation is strict and fails closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
