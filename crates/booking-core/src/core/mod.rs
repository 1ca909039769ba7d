// crates/booking-core/src/core/mod.rs
// ============================================================================
// Module: Booking Gate Core Types
// Description: Canonical record, session, and transition rule structures.
// Purpose: Provide stable, serializable types shared by every surface.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Core types define records, sessions, and the transition table. These types
//! are the canonical source of truth for the HTTP server, config, and stores.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod identifiers;
pub mod record;
pub mod session;
pub mod time;
pub mod transition;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use identifiers::ActionName;
pub use identifiers::CollectionName;
pub use identifiers::RecordId;
pub use record::ParseEnumError;
pub use record::Record;
pub use record::Role;
pub use record::Status;
pub use session::Session;
pub use session::SessionUser;
pub use time::unix_millis;
pub use transition::TransitionRule;
pub use transition::TransitionTable;
pub use transition::TransitionTableError;
pub use transition::default_transition_rules;
